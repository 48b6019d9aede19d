//! Fixed group elements: the Ed25519 basepoint `G`, the Pedersen amount
//! generator `H`, and the auxiliary generator `T` used by one-time addresses.
//!
//! `H` and `T` are carried as compressed constants; conformance tests
//! reproduce both through the CryptoNote hash-to-point map:
//! `H = 8 * to_point(keccak256(G))` and
//! `T = 8 * to_point(keccak256("Monero Generator T"))`.

use std::sync::LazyLock;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};

/// Compressed Pedersen amount generator `H`.
pub const H_BYTES: [u8; 32] = [
    0x8b, 0x65, 0x59, 0x70, 0x15, 0x37, 0x99, 0xaf, 0x2a, 0xea, 0xdc, 0x9f, 0xf1, 0xad, 0xd0,
    0xea, 0x6c, 0x72, 0x51, 0xd5, 0x41, 0x54, 0xcf, 0xa9, 0x2c, 0x17, 0x3a, 0x0d, 0xd3, 0x9c,
    0x1f, 0x94,
];

/// Compressed auxiliary generator `T`. Nothing-up-my-sleeve: hashed from the
/// ASCII string `"Monero Generator T"`.
pub const T_BYTES: [u8; 32] = [
    0x96, 0x6f, 0xc6, 0x6b, 0x82, 0xcd, 0x56, 0xcf, 0x85, 0xea, 0xec, 0x80, 0x1c, 0x42, 0x84,
    0x5f, 0x5f, 0x40, 0x88, 0x78, 0xd1, 0x56, 0x1e, 0x00, 0xd3, 0xd7, 0xde, 0xd2, 0x79, 0x4d,
    0x09, 0x4f,
];

// Decompression is not free, so both generators are decompressed once.
static H_POINT: LazyLock<EdwardsPoint> = LazyLock::new(|| {
    CompressedEdwardsY(H_BYTES).decompress().expect("H decompresses")
});

static T_POINT: LazyLock<EdwardsPoint> = LazyLock::new(|| {
    CompressedEdwardsY(T_BYTES).decompress().expect("T decompresses")
});

/// The Pedersen amount generator `H`.
pub fn h_point() -> EdwardsPoint {
    *H_POINT
}

/// The auxiliary one-time-address generator `T`.
pub fn t_point() -> EdwardsPoint {
    *T_POINT
}
