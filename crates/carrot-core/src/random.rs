//! Thread-safe randomness for anchors, fresh ephemerals, and proof nonces.

use curve25519_dalek::scalar::Scalar;
use rand::RngCore;

pub(crate) fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Uniform scalar from 64 bytes of entropy.
pub(crate) fn random_scalar() -> Scalar {
    Scalar::from_bytes_mod_order_wide(&random_bytes::<64>())
}
