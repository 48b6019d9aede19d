//! Signed big-integer serialization helpers used by the test harness.
//!
//! `Int256` and `Int512` are sign-magnitude integers serialized little-endian
//! at a fixed 32/64-byte width with the sign carried in the high bit of the
//! final byte. They exist to exercise serialization round trips in tests and
//! never touch the crypto path.

use core::fmt;

/// A signed integer of `N` bytes, sign-magnitude with the top bit of the
/// last byte reserved for the sign. Representable magnitudes are below
/// `2^(8*N - 1)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SignedBig<const N: usize> {
    negative: bool,
    /// Little-endian magnitude; the top bit of `magnitude[N-1]` is clear.
    magnitude: [u8; N],
}

pub type Int256 = SignedBig<32>;
pub type Int512 = SignedBig<64>;

impl<const N: usize> SignedBig<N> {
    pub const ZERO: Self = SignedBig { negative: false, magnitude: [0u8; N] };

    /// Build from parts. Fails when the magnitude's sign bit is occupied.
    /// Negative zero normalizes to zero.
    pub fn new(negative: bool, magnitude: [u8; N]) -> Option<Self> {
        if magnitude[N - 1] & 0x80 != 0 {
            return None;
        }
        let negative = negative && magnitude != [0u8; N];
        Some(SignedBig { negative, magnitude })
    }

    pub fn from_i128(value: i128) -> Self {
        let negative = value < 0;
        let mag = value.unsigned_abs();
        let mut magnitude = [0u8; N];
        magnitude[..16].copy_from_slice(&mag.to_le_bytes());
        SignedBig { negative: negative && mag != 0, magnitude }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude == [0u8; N]
    }

    pub fn magnitude(&self) -> &[u8; N] {
        &self.magnitude
    }

    pub fn neg(&self) -> Self {
        if self.is_zero() {
            *self
        } else {
            SignedBig { negative: !self.negative, magnitude: self.magnitude }
        }
    }

    /// Fixed-width little-endian encoding, sign in the high bit.
    pub fn to_le_bytes(&self) -> [u8; N] {
        let mut out = self.magnitude;
        if self.negative {
            out[N - 1] |= 0x80;
        }
        out
    }

    /// Inverse of [`Self::to_le_bytes`]. Total: every byte pattern decodes,
    /// with negative zero normalizing to zero.
    pub fn from_le_bytes(mut bytes: [u8; N]) -> Self {
        let negative = bytes[N - 1] & 0x80 != 0;
        bytes[N - 1] &= 0x7F;
        let negative = negative && bytes != [0u8; N];
        SignedBig { negative, magnitude: bytes }
    }
}

impl<const N: usize> fmt::Debug for SignedBig<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SignedBig<{}>({}0x{})",
            N,
            if self.negative { "-" } else { "" },
            hex::encode(self.magnitude)
        )
    }
}
