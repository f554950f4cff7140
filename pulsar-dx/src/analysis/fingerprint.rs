//! Content fingerprint: SHA-256 of the raw upload, read as a 256-bit integer
//!
//! The fingerprint is the only source of pseudo-randomness in the pipeline.
//! Downstream formulas need just two operations on it, remainder by a
//! small modulus and right shift, so it stays a byte array instead of
//! pulling in a bignum type.

use sha2::{Digest, Sha256};
use std::fmt;

/// Big-endian 256-bit digest of the unmodified input bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash raw bytes (not the decoded raster)
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// `self mod modulus`
    ///
    /// # Panics
    ///
    /// Panics if `modulus` is zero.
    pub fn rem(&self, modulus: u64) -> u64 {
        assert!(modulus > 0, "fingerprint modulus must be non-zero");
        let modulus = u128::from(modulus);
        let rem = self
            .0
            .iter()
            .fold(0u128, |acc, &byte| ((acc << 8) | u128::from(byte)) % modulus);
        rem as u64
    }

    /// `self >> bits`
    pub fn shr(&self, bits: u32) -> Self {
        if bits >= 256 {
            return Self([0; 32]);
        }
        let byte_shift = (bits / 8) as usize;
        let bit_shift = bits % 8;

        let mut out = [0u8; 32];
        for i in (byte_shift..32).rev() {
            let src = i - byte_shift;
            let low = self.0[src] >> bit_shift;
            let carry = if bit_shift > 0 && src > 0 {
                self.0[src - 1] << (8 - bit_shift)
            } else {
                0
            };
            out[i] = low | carry;
        }
        Self(out)
    }

    /// Lowercase hex digest
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_u64(value: u64) -> Fingerprint {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Fingerprint::from_digest(bytes)
    }

    #[test]
    fn test_rem_matches_native_arithmetic() {
        let value = 0x0123_4567_89ab_cdefu64;
        let fp = from_u64(value);
        for modulus in [1, 3, 7, 50, 75, 100, 170, 10_000] {
            assert_eq!(fp.rem(modulus), value % modulus, "modulus {}", modulus);
        }
    }

    #[test]
    fn test_rem_uses_high_bytes() {
        // 2^248 mod 7 == 2^(248 mod 3) mod 7 == 2^2 mod 7 == 4
        let mut bytes = [0u8; 32];
        bytes[0] = 1;
        assert_eq!(Fingerprint::from_digest(bytes).rem(7), 4);
    }

    #[test]
    fn test_shr_by_bytes_and_bits() {
        let value = 0xfedc_ba98_7654_3210u64;
        let fp = from_u64(value);
        assert_eq!(fp.shr(0), fp);
        assert_eq!(fp.shr(8), from_u64(value >> 8));
        assert_eq!(fp.shr(16), from_u64(value >> 16));
        assert_eq!(fp.shr(3), from_u64(value >> 3));
        assert_eq!(fp.shr(256), from_u64(0));
    }

    #[test]
    fn test_sha256_of_empty_input() {
        assert_eq!(
            Fingerprint::of(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_byte_difference_changes_fingerprint() {
        assert_ne!(Fingerprint::of(b"scan-a"), Fingerprint::of(b"scan-b"));
        assert_eq!(Fingerprint::of(b"scan-a"), Fingerprint::of(b"scan-a"));
    }
}
