//! The [`Dna`] type: a 256-bit perceptual fingerprint.
//!
//! This module provides a fixed-size container for DNA fingerprints with
//! zero-copy semantics, mirroring the stack-allocated, `Copy`-friendly
//! hash types common in this domain.

use std::fmt;

/// Size of a DNA fingerprint in bytes (256 bits).
pub const DNA_SIZE: usize = 32;

/// Size of the gradient (dHash) component in bytes (64 bits).
pub const GRADIENT_BYTES: usize = 8;

/// Size of the structural (Grid) component in bytes (192 bits).
pub const STRUCTURAL_BYTES: usize = DNA_SIZE - GRADIENT_BYTES;

/// Number of bits in the gradient component.
pub const GRADIENT_BITS: usize = GRADIENT_BYTES * 8;

/// Number of bits in the structural component.
pub const STRUCTURAL_BITS: usize = STRUCTURAL_BYTES * 8;

/// A 256-bit perceptual DNA fingerprint.
///
/// The fingerprint is two concatenated, independently-computed components
/// (see [`crate::extract`]):
///
/// - bytes `0..8`: the 64-bit gradient (dHash) component.
/// - bytes `8..32`: the 192-bit structural (Grid) component, itself three
///   concatenated 64-bit coarse-structure hashes.
///
/// `Dna` is `Copy` and stack-allocated; comparisons and hex conversions do
/// not allocate beyond the returned `String`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Dna {
    bytes: [u8; DNA_SIZE],
}

impl Dna {
    /// Builds a DNA fingerprint from its raw 32-byte binary form.
    ///
    /// The byte order follows the wire format in spec §6: gradient bits
    /// first, then structural bits, packed MSB-first within each byte.
    #[inline]
    pub const fn from_bytes(bytes: [u8; DNA_SIZE]) -> Self {
        Self { bytes }
    }

    /// Builds a DNA fingerprint from its two components, each given as an
    /// MSB-first bit sequence in extraction order.
    ///
    /// # Panics
    ///
    /// Panics if `gradient_bits.len() != 64` or `structural_bits.len() != 192`.
    pub fn from_bits(gradient_bits: &[bool], structural_bits: &[bool]) -> Self {
        assert_eq!(gradient_bits.len(), GRADIENT_BITS, "gradient component must be 64 bits");
        assert_eq!(
            structural_bits.len(),
            STRUCTURAL_BITS,
            "structural component must be 192 bits"
        );

        let mut bytes = [0u8; DNA_SIZE];
        pack_bits_msb_into(gradient_bits, &mut bytes[..GRADIENT_BYTES]);
        pack_bits_msb_into(structural_bits, &mut bytes[GRADIENT_BYTES..]);
        Self { bytes }
    }

    /// Returns the raw 32-byte binary form.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; DNA_SIZE] {
        &self.bytes
    }

    /// Returns the 8-byte gradient (dHash) component.
    #[inline]
    pub fn gradient(&self) -> [u8; GRADIENT_BYTES] {
        let mut out = [0u8; GRADIENT_BYTES];
        out.copy_from_slice(&self.bytes[..GRADIENT_BYTES]);
        out
    }

    /// Returns the 24-byte structural (Grid) component.
    #[inline]
    pub fn structural(&self) -> [u8; STRUCTURAL_BYTES] {
        let mut out = [0u8; STRUCTURAL_BYTES];
        out.copy_from_slice(&self.bytes[GRADIENT_BYTES..]);
        out
    }

    /// Formats the fingerprint as 64 lowercase hex characters: 16 for the
    /// gradient component followed by 48 for the structural component.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(DNA_SIZE * 2);
        for byte in &self.bytes {
            use std::fmt::Write;
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }

    /// Parses a fingerprint from a 64-character hex string (case-insensitive).
    ///
    /// Returns `None` if the string is not exactly 64 hex characters.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != DNA_SIZE * 2 || !hex.is_ascii() {
            return None;
        }

        let mut bytes = [0u8; DNA_SIZE];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let high = hex_digit_value(chunk[0])?;
            let low = hex_digit_value(chunk[1])?;
            bytes[i] = (high << 4) | low;
        }
        Some(Self { bytes })
    }

    /// Computes the Hamming distance (number of differing bits) between
    /// two fingerprints, over the full 256-bit binary form.
    ///
    /// Range: `0..=256`.
    pub fn hamming_distance(&self, other: &Dna) -> u32 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

impl fmt::Debug for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dna({})", self.to_hex())
    }
}

impl fmt::Display for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Dna {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<[u8; DNA_SIZE]> for Dna {
    fn from(bytes: [u8; DNA_SIZE]) -> Self {
        Self::from_bytes(bytes)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Dna {
    /// Serializes as the canonical 64-character hex string (spec §6), not
    /// the raw byte array, so a `Dna` round-trips through JSON the same
    /// way it's quoted in manifests and logs.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Dna {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Dna::from_hex(&hex).ok_or_else(|| serde::de::Error::custom("invalid 64-character DNA hex string"))
    }
}

/// Packs an MSB-first bit sequence into `out`, 8 bits per byte.
///
/// `bits.len()` must equal `out.len() * 8`.
fn pack_bits_msb_into(bits: &[bool], out: &mut [u8]) {
    debug_assert_eq!(bits.len(), out.len() * 8);
    for (byte, chunk) in out.iter_mut().zip(bits.chunks(8)) {
        let mut b = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit {
                b |= 1 << (7 - i);
            }
        }
        *byte = b;
    }
}

#[inline]
fn hex_digit_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dna_size_is_256_bits() {
        assert_eq!(DNA_SIZE, 32);
        assert_eq!(GRADIENT_BYTES + STRUCTURAL_BYTES, DNA_SIZE);
    }

    #[test]
    fn hex_round_trip() {
        let bytes: [u8; DNA_SIZE] = std::array::from_fn(|i| i as u8);
        let dna = Dna::from_bytes(bytes);
        let hex = dna.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Dna::from_hex(&hex).unwrap(), dna);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(Dna::from_hex("abcd").is_none());
        assert!(Dna::from_hex(&"a".repeat(65)).is_none());
    }

    #[test]
    fn from_hex_rejects_invalid_chars() {
        assert!(Dna::from_hex(&"g".repeat(64)).is_none());
    }

    #[test]
    fn hamming_distance_zero_for_identical() {
        let dna = Dna::from_bytes([0xAB; DNA_SIZE]);
        assert_eq!(dna.hamming_distance(&dna), 0);
    }

    #[test]
    fn hamming_distance_full_for_complement() {
        let a = Dna::from_bytes([0x00; DNA_SIZE]);
        let b = Dna::from_bytes([0xFF; DNA_SIZE]);
        assert_eq!(a.hamming_distance(&b), 256);
    }

    #[test]
    fn from_bits_packs_msb_first() {
        let mut gradient = [false; GRADIENT_BITS];
        gradient[0] = true; // should become bit 7 (MSB) of byte 0
        let structural = [false; STRUCTURAL_BITS];
        let dna = Dna::from_bits(&gradient, &structural);
        assert_eq!(dna.gradient()[0], 0b1000_0000);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_round_trips_through_hex_string() {
        let dna = Dna::from_bytes([0x5A; DNA_SIZE]);
        let json = serde_json::to_string(&dna).unwrap();
        assert_eq!(json, format!("\"{}\"", dna.to_hex()));
        assert_eq!(serde_json::from_str::<Dna>(&json).unwrap(), dna);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_rejects_malformed_hex() {
        let err = serde_json::from_str::<Dna>("\"not-hex\"").unwrap_err();
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn gradient_and_structural_round_trip_through_bytes() {
        let bytes: [u8; DNA_SIZE] = std::array::from_fn(|i| (i * 7) as u8);
        let dna = Dna::from_bytes(bytes);
        let mut rebuilt = [0u8; DNA_SIZE];
        rebuilt[..GRADIENT_BYTES].copy_from_slice(&dna.gradient());
        rebuilt[GRADIENT_BYTES..].copy_from_slice(&dna.structural());
        assert_eq!(rebuilt, bytes);
    }
}
