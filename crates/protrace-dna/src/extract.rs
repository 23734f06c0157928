//! Deterministic extraction of a [`Dna`] fingerprint from image bytes.
//!
//! The pipeline has two independent halves that both start from the same
//! decoded RGB image and never influence each other:
//!
//! - [`gradient_component`]: a 64-bit horizontal-gradient hash (dHash-style)
//!   computed from a blurred, 512x512 center-cropped view.
//! - [`structural_component`]: a 192-bit concatenation of three coarse
//!   block-average hashes, computed from a zero-padded, 1024x1024
//!   center-cropped view.
//!
//! Floating point work is done in `f32` throughout. Reduction order is
//! fixed (row-major within a block, blocks in row-major order, blur
//! left-to-right then top-to-bottom) because `f32` addition is not
//! associative; deviating from this order changes output bits on the
//! margin between two luminance buckets.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::dna::{Dna, GRADIENT_BITS, STRUCTURAL_BITS};
use crate::error::{DnaError, Result};

const GRADIENT_CROP: u32 = 512;
const BLOCK_SIZE_GRADIENT: usize = 4;
const GRADIENT_RESIZE_W: usize = 9;
const GRADIENT_RESIZE_H: usize = 8;

const STRUCTURAL_CANVAS: u32 = 2048;
const STRUCTURAL_CROP: u32 = 1024;
const STRUCTURAL_SCALES: [usize; 3] = [128, 85, 64];
const STRUCTURAL_OUT: usize = 8;

/// Extracts a 256-bit DNA fingerprint from encoded image bytes.
///
/// Accepts any format the `image` crate can decode (PNG, JPEG, BMP, GIF,
/// WebP, TIFF per the default feature set). Returns
/// [`DnaError::UnsupportedFormat`] if the bytes are in a format this
/// deployment has no decoder for, [`DnaError::InvalidImage`] if the
/// format is recognized but the bytes are malformed, or
/// [`DnaError::ImageTooSmall`] if either dimension is below 8 pixels.
pub fn extract(bytes: &[u8]) -> Result<Dna> {
    let decoded = image::load_from_memory(bytes).map_err(image_decode_error)?;
    let rgb = decoded.to_rgb8();
    extract_from_rgb(&rgb)
}

/// Maps the `image` crate's error kinds onto the spec's decode-failure
/// taxonomy: an unrecognized or unimplemented format is
/// [`DnaError::UnsupportedFormat`], everything else (truncated data,
/// malformed headers, a decoder that started but failed) is
/// [`DnaError::InvalidImage`].
fn image_decode_error(err: image::ImageError) -> DnaError {
    match err {
        image::ImageError::Unsupported(_) => DnaError::UnsupportedFormat(err.to_string()),
        other => DnaError::InvalidImage(other.to_string()),
    }
}

/// Extracts a DNA fingerprint directly from an already-decoded RGB image.
///
/// Exposed so callers that decode through their own pipeline (or tests
/// that build synthetic images) can skip the `image` crate's format
/// sniffing.
pub fn extract_from_rgb(rgb: &RgbImage) -> Result<Dna> {
    let (width, height) = rgb.dimensions();
    if width < 8 || height < 8 {
        return Err(DnaError::ImageTooSmall { width, height });
    }

    let gradient_bits = gradient_component(rgb);
    let structural_bits = structural_component(rgb);

    Ok(Dna::from_bits(&gradient_bits, &structural_bits))
}

/// A row-major grid of `f32` samples. Used for luminance planes and every
/// intermediate reduction (blur, block average, resize).
#[derive(Clone)]
struct Grid {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Grid {
    fn new(width: usize, height: usize) -> Self {
        Self { width, height, data: vec![0.0; width * height] }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, v: f32) {
        self.data[y * self.width + x] = v;
    }

    /// Clamped sample, for nearest-edge padding at grid boundaries.
    #[inline]
    fn get_clamped(&self, x: i64, y: i64) -> f32 {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.get(cx, cy)
    }
}

/// Step 2.1 / 3.1-3.2: center-crop, clamped to the available extent (no
/// upscaling when the source is smaller than the target).
fn center_crop(img: &RgbImage, target_w: u32, target_h: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let cw = target_w.min(w);
    let ch = target_h.min(h);
    let x0 = (w - cw) / 2;
    let y0 = (h - ch) / 2;
    ImageBuffer::from_fn(cw, ch, |x, y| *img.get_pixel(x0 + x, y0 + y))
}

/// Step 3.1: zero-pad (never resize) to a `size x size` canvas, centered.
/// If either input dimension exceeds `size`, the excess is center-cropped
/// away first so the canvas is always exactly `size x size`.
fn zero_pad_centered(img: &RgbImage, size: u32) -> RgbImage {
    let cropped = center_crop(img, size, size);
    let (cw, ch) = cropped.dimensions();
    let x0 = (size - cw) / 2;
    let y0 = (size - ch) / 2;

    let mut canvas: RgbImage = ImageBuffer::from_pixel(size, size, Rgb([0, 0, 0]));
    for y in 0..ch {
        for x in 0..cw {
            canvas.put_pixel(x0 + x, y0 + y, *cropped.get_pixel(x, y));
        }
    }
    canvas
}

/// Step 2.2 / 3.3: BT.601 luminance, `Y = 0.299R + 0.587G + 0.114B`, in f32.
fn rgb_to_luma(img: &RgbImage) -> Grid {
    let (w, h) = img.dimensions();
    let mut grid = Grid::new(w as usize, h as usize);
    for y in 0..h {
        for x in 0..w {
            let p = img.get_pixel(x, y);
            let luma = 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32;
            grid.set(x as usize, y as usize, luma);
        }
    }
    grid
}

/// Step 2.3: separable 3x3 box blur, nearest-edge padding. Horizontal pass
/// first, then vertical, each row-major.
fn box_blur_3x3(grid: &Grid) -> Grid {
    let (w, h) = (grid.width, grid.height);
    let mut horizontal = Grid::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let xi = x as i64;
            let sum = grid.get_clamped(xi - 1, y as i64)
                + grid.get_clamped(xi, y as i64)
                + grid.get_clamped(xi + 1, y as i64);
            horizontal.set(x, y, sum / 3.0);
        }
    }

    let mut vertical = Grid::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let yi = y as i64;
            let sum = horizontal.get_clamped(x as i64, yi - 1)
                + horizontal.get_clamped(x as i64, yi)
                + horizontal.get_clamped(x as i64, yi + 1);
            vertical.set(x, y, sum / 3.0);
        }
    }
    vertical
}

/// Step 2.4 / 3.4: non-overlapping `block x block` averaging. Residue rows
/// and columns that don't fill a full block are discarded. Reduction order
/// within each block, and across blocks, is row-major.
fn block_average(grid: &Grid, block: usize) -> Grid {
    let out_w = grid.width / block;
    let out_h = grid.height / block;
    let mut out = Grid::new(out_w.max(0), out_h.max(0));

    for by in 0..out_h {
        for bx in 0..out_w {
            let mut sum = 0.0f32;
            for dy in 0..block {
                for dx in 0..block {
                    sum += grid.get(bx * block + dx, by * block + dy);
                }
            }
            out.set(bx, by, sum / (block * block) as f32);
        }
    }
    out
}

/// Step 2.5: bilinear resize to an exact target size. Output pixel centers
/// map into input space via `(dst + 0.5) * src_size / dst_size - 0.5`.
fn resize_bilinear(grid: &Grid, out_w: usize, out_h: usize) -> Grid {
    let mut out = Grid::new(out_w, out_h);
    let scale_x = grid.width as f32 / out_w as f32;
    let scale_y = grid.height as f32 / out_h as f32;

    for dy in 0..out_h {
        let sy = ((dy as f32 + 0.5) * scale_y - 0.5).max(0.0);
        let y0 = sy.floor() as usize;
        let y1 = (y0 + 1).min(grid.height - 1);
        let fy = sy - y0 as f32;

        for dx in 0..out_w {
            let sx = ((dx as f32 + 0.5) * scale_x - 0.5).max(0.0);
            let x0 = sx.floor() as usize;
            let x1 = (x0 + 1).min(grid.width - 1);
            let fx = sx - x0 as f32;

            let top = grid.get(x0, y0) * (1.0 - fx) + grid.get(x1, y0) * fx;
            let bottom = grid.get(x0, y1) * (1.0 - fx) + grid.get(x1, y1) * fx;
            out.set(dx, dy, top * (1.0 - fy) + bottom * fy);
        }
    }
    out
}

/// 50th-percentile, nearest-rank interpolation: sort the samples and take
/// the element at rank `ceil(0.5 * n)` (1-indexed).
fn median_nearest_rank(grid: &Grid) -> f32 {
    let mut sorted = grid.data.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("luminance samples are never NaN"));
    let n = sorted.len();
    let rank = ((0.5 * n as f64).ceil() as usize).max(1);
    sorted[rank - 1]
}

/// Binarizes a grid against its own nearest-rank median: `pixel > median`.
/// Ties (pixel == median) resolve to `false`.
fn binarize(grid: &Grid) -> Vec<bool> {
    let median = median_nearest_rank(grid);
    grid.data.iter().map(|&v| v > median).collect()
}

/// Nearest-neighbor resize of a row-major boolean grid.
fn resize_nearest_bool(bits: &[bool], w: usize, h: usize, out_w: usize, out_h: usize) -> Vec<bool> {
    let mut out = Vec::with_capacity(out_w * out_h);
    for dy in 0..out_h {
        let sy = (dy * h / out_h).min(h - 1);
        for dx in 0..out_w {
            let sx = (dx * w / out_w).min(w - 1);
            out.push(bits[sy * w + sx]);
        }
    }
    out
}

/// Step 2: the 64-bit horizontal-gradient (dHash) component.
fn gradient_component(rgb: &RgbImage) -> [bool; GRADIENT_BITS] {
    let cropped = center_crop(rgb, GRADIENT_CROP, GRADIENT_CROP);
    let luma = rgb_to_luma(&cropped);
    let blurred = box_blur_3x3(&luma);
    let blocked = block_average(&blurred, BLOCK_SIZE_GRADIENT);
    let resized = resize_bilinear(&blocked, GRADIENT_RESIZE_W, GRADIENT_RESIZE_H);

    let mut bits = [false; GRADIENT_BITS];
    for r in 0..GRADIENT_RESIZE_H {
        for c in 0..(GRADIENT_RESIZE_W - 1) {
            bits[r * (GRADIENT_RESIZE_W - 1) + c] = resized.get(c + 1, r) > resized.get(c, r);
        }
    }
    bits
}

/// Step 3: the 192-bit structural (multi-scale Grid) component. Each scale
/// is an independent pure function over the same 1024x1024 luminance
/// plane; with the `parallel` feature enabled they run concurrently via
/// rayon, with bit-identical output to the sequential path.
fn structural_component(rgb: &RgbImage) -> [bool; STRUCTURAL_BITS] {
    let padded = zero_pad_centered(rgb, STRUCTURAL_CANVAS);
    let cropped = center_crop(&padded, STRUCTURAL_CROP, STRUCTURAL_CROP);
    let luma = rgb_to_luma(&cropped);

    let scales: Vec<Vec<bool>> = compute_scales(&luma);

    let mut bits = [false; STRUCTURAL_BITS];
    for (i, scale_bits) in scales.into_iter().enumerate() {
        let offset = i * STRUCTURAL_OUT * STRUCTURAL_OUT;
        bits[offset..offset + scale_bits.len()].copy_from_slice(&scale_bits);
    }
    bits
}

fn structural_scale(luma: &Grid, block: usize) -> Vec<bool> {
    let averaged = block_average(luma, block);
    if averaged.width == STRUCTURAL_OUT && averaged.height == STRUCTURAL_OUT {
        return binarize(&averaged);
    }
    let bits = binarize(&averaged);
    resize_nearest_bool(&bits, averaged.width, averaged.height, STRUCTURAL_OUT, STRUCTURAL_OUT)
}

#[cfg(not(feature = "parallel"))]
fn compute_scales(luma: &Grid) -> Vec<Vec<bool>> {
    STRUCTURAL_SCALES.iter().map(|&block| structural_scale(luma, block)).collect()
}

#[cfg(feature = "parallel")]
fn compute_scales(luma: &Grid) -> Vec<Vec<bool>> {
    use rayon::prelude::*;
    STRUCTURAL_SCALES.par_iter().map(|&block| structural_scale(luma, block)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        ImageBuffer::from_pixel(width, height, Rgb(rgb))
    }

    #[test]
    fn solid_color_has_zero_gradient() {
        let img = solid_image(512, 512, [200, 10, 10]);
        let bits = gradient_component(&img);
        assert!(bits.iter().all(|&b| !b), "uniform luminance must never show a gradient edge");
    }

    #[test]
    fn undecodable_bytes_are_invalid_image() {
        let err = extract(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DnaError::InvalidImage(_)));
    }

    #[test]
    fn too_small_image_is_rejected() {
        let img = solid_image(4, 4, [0, 0, 0]);
        let err = extract_from_rgb(&img).unwrap_err();
        assert_eq!(err, DnaError::ImageTooSmall { width: 4, height: 4 });
    }

    #[test]
    fn identical_images_produce_identical_dna() {
        let img = solid_image(640, 480, [30, 120, 200]);
        let a = extract_from_rgb(&img).unwrap();
        let b = extract_from_rgb(&img).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn center_crop_clamps_when_source_is_smaller() {
        let img = solid_image(16, 16, [1, 2, 3]);
        let cropped = center_crop(&img, 512, 512);
        assert_eq!(cropped.dimensions(), (16, 16));
    }

    #[test]
    fn zero_pad_produces_exact_canvas_size() {
        let img = solid_image(300, 600, [9, 9, 9]);
        let padded = zero_pad_centered(&img, 2048);
        assert_eq!(padded.dimensions(), (2048, 2048));
    }

    #[test]
    fn zero_pad_crops_oversized_input_before_padding() {
        let img = solid_image(3000, 100, [5, 5, 5]);
        let padded = zero_pad_centered(&img, 2048);
        assert_eq!(padded.dimensions(), (2048, 2048));
    }

    #[test]
    fn median_nearest_rank_matches_hand_computed_values() {
        let mut grid = Grid::new(4, 1);
        for (i, v) in [1.0, 2.0, 3.0, 4.0].iter().enumerate() {
            grid.set(i, 0, *v);
        }
        // rank = ceil(0.5 * 4) = 2 -> sorted[1] = 2.0
        assert_eq!(median_nearest_rank(&grid), 2.0);
    }

    #[test]
    fn binarize_resolves_ties_to_false() {
        let mut grid = Grid::new(2, 1);
        grid.set(0, 0, 5.0);
        grid.set(1, 0, 5.0);
        let bits = binarize(&grid);
        assert_eq!(bits, vec![false, false]);
    }
}
