use image::{ImageBuffer, Rgb, RgbImage};
use protrace_dna::test_utils::flip_bits;
use protrace_registry::{Outcome, RegisterOptions, Registry};
use protrace_tree::HashAlgorithm;

fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb(rgb));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
    bytes
}

fn four_quadrant_png(size: u32) -> Vec<u8> {
    let half = size / 2;
    let mut img: RgbImage = ImageBuffer::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let pixel = match (x < half, y < half) {
                (true, true) => Rgb([255, 0, 0]),
                (false, true) => Rgb([0, 255, 0]),
                (true, false) => Rgb([0, 0, 255]),
                (false, false) => Rgb([255, 255, 0]),
            };
            img.put_pixel(x, y, pixel);
        }
    }
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
    bytes
}

#[test]
fn s1_solid_red_has_all_zero_gradient() {
    let bytes = solid_png(256, 256, [255, 0, 0]);
    let dna = protrace_dna::extract(&bytes).unwrap();
    assert_eq!(&dna.to_hex()[..16], "0000000000000000");
}

#[test]
fn s2_four_quadrant_extraction_is_deterministic() {
    let bytes = four_quadrant_png(256);
    let a = protrace_dna::extract(&bytes).unwrap();
    let b = protrace_dna::extract(&bytes).unwrap();
    assert_eq!(a, b);
}

#[test]
fn s3_empty_registry_first_registration() {
    let registry = Registry::new(HashAlgorithm::Blake3);
    let bytes = four_quadrant_png(256);
    let options = RegisterOptions::new().with_timestamp_override(1000);

    let outcome = registry.register(&bytes, "p1", "test", options, None);
    let leaf_index = match outcome {
        Outcome::Accepted { leaf_index, .. } => leaf_index,
        other => panic!("expected Accepted, got {other:?}"),
    };
    assert_eq!(leaf_index, 0);
    assert!(registry.root().is_some());

    let proof = registry.proof_for(0).unwrap();
    assert_eq!(proof.len(), 0);
}

#[test]
fn s4_duplicate_image_is_rejected_and_registry_unchanged() {
    let registry = Registry::new(HashAlgorithm::Blake3);
    let bytes = four_quadrant_png(256);
    let options_s3 = RegisterOptions::new().with_timestamp_override(1000);
    registry.register(&bytes, "p1", "test", options_s3, None);

    let root_before = registry.root();
    let options_s4 = RegisterOptions::new().with_timestamp_override(1001);
    let outcome = registry.register(&bytes, "p2", "test", options_s4, None);

    match outcome {
        Outcome::Rejected { matched_index, distance, .. } => {
            assert_eq!(matched_index, 0);
            assert_eq!(distance, 0);
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.root(), root_before);
}

#[test]
fn s5_near_duplicate_threshold_boundary() {
    let registry = Registry::new(HashAlgorithm::Blake3);
    let bytes = four_quadrant_png(256);
    let base_dna = protrace_dna::extract(&bytes).unwrap();
    registry.register(&bytes, "p1", "test", RegisterOptions::new().with_timestamp_override(1000), None);

    let at_threshold = flip_bits(base_dna, 26, 1);
    let outcome = registry.register_dna(at_threshold, "p2", "test", RegisterOptions::default(), None);
    match outcome {
        Outcome::Rejected { distance, .. } => assert_eq!(distance, 26),
        other => panic!("expected Rejected at distance 26, got {other:?}"),
    }

    let past_threshold = flip_bits(base_dna, 27, 1);
    let outcome = registry.register_dna(past_threshold, "p3", "test", RegisterOptions::default(), None);
    assert!(matches!(outcome, Outcome::Accepted { .. }));
}

#[test]
fn s6_five_distinct_images_proof_length_and_tamper_detection() {
    let registry = Registry::new(HashAlgorithm::Blake3);
    let colors = [[10, 10, 10], [20, 20, 20], [30, 30, 30], [40, 40, 40], [50, 50, 50]];
    for (i, color) in colors.iter().enumerate() {
        let bytes = solid_png(64, 64, *color);
        let outcome = registry.register(&bytes, format!("p{i}"), "test", RegisterOptions::default(), None);
        assert!(matches!(outcome, Outcome::Accepted { .. }), "registration {i} must be accepted");
    }

    let mut proof = registry.proof_for(2).unwrap();
    assert_eq!(proof.len(), 3, "ceil(log2(5)) == 3");

    let root = registry.root().unwrap();

    assert!(protrace_tree::verify(
        &registered_leaf(&registry, 2),
        &proof,
        root,
        HashAlgorithm::Blake3
    ));

    proof[0].sibling[0] ^= 0xFF;
    assert!(!protrace_tree::verify(&registered_leaf(&registry, 2), &proof, root, HashAlgorithm::Blake3));
}

fn registered_leaf(registry: &Registry, index: usize) -> protrace_tree::Leaf {
    let manifest = registry.export_manifest().unwrap();
    let entry = &manifest.leaves[index];
    let dna = protrace_dna::Dna::from_hex(&entry.dna_hex).unwrap();
    protrace_tree::Leaf::new(dna, entry.pointer.clone(), entry.platform_id.clone(), entry.timestamp)
}

#[test]
fn duplicate_symmetry_across_fresh_registries() {
    let a_bytes = solid_png(128, 128, [5, 6, 7]);
    let b_bytes = solid_png(128, 128, [5, 6, 7]);

    let forward = Registry::new(HashAlgorithm::Blake3);
    forward.register(&a_bytes, "a", "test", RegisterOptions::default(), None);
    let forward_outcome = forward.register(&b_bytes, "b", "test", RegisterOptions::default(), None);

    let reverse = Registry::new(HashAlgorithm::Blake3);
    reverse.register(&b_bytes, "b", "test", RegisterOptions::default(), None);
    let reverse_outcome = reverse.register(&a_bytes, "a", "test", RegisterOptions::default(), None);

    assert!(matches!(forward_outcome, Outcome::Rejected { .. }));
    assert!(matches!(reverse_outcome, Outcome::Rejected { .. }));
}
