//! Domain-separated hashing for the Carrot protocol.
//!
//! Every derivation is Keccak-256 over `label || args...` where the label is
//! literal ASCII with no trailing NUL and no length prefix, and integer
//! arguments are little-endian. Scalars come from the same digest reduced
//! mod the group order. Symmetric encryption is keystream XOR against a
//! `hash32` prefix.

use curve25519_dalek::scalar::Scalar;
use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 (the CryptoNote `cn_fast_hash` variant, not SHA3).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    let mut output = [0u8; 32];
    keccak.update(data);
    keccak.finalize(&mut output);
    output
}

/// `hash32(label, args...)`: Keccak-256 of the label followed by each
/// argument in order.
pub fn hash32(label: &str, args: &[&[u8]]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    let mut output = [0u8; 32];
    keccak.update(label.as_bytes());
    for arg in args {
        keccak.update(arg);
    }
    keccak.finalize(&mut output);
    output
}

/// `hash_scalar(label, args...)`: `hash32` reduced mod the group order.
pub fn hash_scalar(label: &str, args: &[&[u8]]) -> Scalar {
    Scalar::from_bytes_mod_order(hash32(label, args))
}

/// Keystream XOR against the first `N` bytes of `hash32(label, args...)`.
/// Encryption and decryption are the same operation.
pub fn xor_keystream<const N: usize>(data: &[u8; N], label: &str, args: &[&[u8]]) -> [u8; N] {
    debug_assert!(N <= 32);
    let pad = hash32(label, args);
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = data[i] ^ pad[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_prefix_not_suffix() {
        // hash32("ab", "c") must differ from hash32("a", "bc") only if the
        // label actually leads the transcript; both equal keccak256("abc").
        assert_eq!(hash32("ab", &[b"c"]), keccak256(b"abc"));
        assert_eq!(hash32("a", &[b"b", b"c"]), keccak256(b"abc"));
    }

    #[test]
    fn hash_scalar_is_reduced() {
        let s = hash_scalar("test", &[&[0xFFu8; 32]]);
        assert_eq!(Scalar::from_bytes_mod_order(s.to_bytes()), s);
    }

    #[test]
    fn keystream_round_trips() {
        let plain = [0x5Au8; 16];
        let enc = xor_keystream(&plain, "enc", &[b"context"]);
        assert_ne!(enc, plain);
        assert_eq!(xor_keystream(&enc, "enc", &[b"context"]), plain);
    }

    #[test]
    fn keystream_depends_on_context() {
        let plain = [0u8; 8];
        assert_ne!(
            xor_keystream(&plain, "enc", &[b"one"]),
            xor_keystream(&plain, "enc", &[b"two"])
        );
    }
}
