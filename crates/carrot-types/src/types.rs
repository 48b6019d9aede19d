//! Fixed-width byte newtypes shared by enote construction and scanning.

use core::fmt;

use zeroize::Zeroize;

/// 8-byte payment identifier carried by integrated addresses.
///
/// The all-zero value means "no payment id".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Zeroize)]
pub struct PaymentId(pub [u8; 8]);

impl PaymentId {
    pub const ZERO: PaymentId = PaymentId([0u8; 8]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 8]
    }
}

impl fmt::Debug for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PaymentId({})", hex::encode(self.0))
    }
}

/// 16 bytes of sender-chosen randomness, the secret behind Janus protection.
///
/// A normal payment derives its ephemeral key from this value; a scanner
/// re-derives the key from the decrypted anchor and rejects enotes whose
/// ephemeral pubkey does not match.
#[derive(Clone, Copy, PartialEq, Eq, Default, Zeroize)]
pub struct JanusAnchor(pub [u8; 16]);

impl JanusAnchor {
    pub const ZERO: JanusAnchor = JanusAnchor([0u8; 16]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 16]
    }
}

impl fmt::Debug for JanusAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JanusAnchor({})", hex::encode(self.0))
    }
}

/// XOR-encrypted 8-byte amount.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EncryptedAmount(pub [u8; 8]);

/// XOR-encrypted 8-byte payment id, published once per transaction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EncryptedPaymentId(pub [u8; 8]);

/// XOR-encrypted 16-byte Janus anchor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EncryptedJanusAnchor(pub [u8; 16]);

/// 3-byte fast-rejection filter computed from the uncontextualized shared
/// secret. A mismatch lets the scanner skip an enote after one hash.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ViewTag(pub [u8; 3]);

/// Opaque 32-byte key image. Carrot only ever copies it into transcripts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyImage(pub [u8; 32]);

impl fmt::Debug for KeyImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyImage({})", hex::encode(self.0))
    }
}

/// Flavor of a constructed output, one byte in the commitment-mask transcript.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CarrotEnoteType {
    Payment,
    Change,
}

impl CarrotEnoteType {
    pub fn as_byte(self) -> u8 {
        match self {
            CarrotEnoteType::Payment => 0,
            CarrotEnoteType::Change => 1,
        }
    }
}

/// Transaction-unique byte string binding every enote to its transaction.
///
/// RingCT transactions are identified by their first key image, coinbase
/// transactions by block index. Both serialize to 33 bytes so transcripts
/// have a fixed shape.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputContext {
    Rct { first_key_image: KeyImage },
    Coinbase { block_index: u64 },
}

impl InputContext {
    pub const SERIALIZED_LEN: usize = 33;

    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_LEN] {
        let mut out = [0u8; Self::SERIALIZED_LEN];
        match self {
            InputContext::Rct { first_key_image } => {
                out[0] = b'R';
                out[1..33].copy_from_slice(&first_key_image.0);
            }
            InputContext::Coinbase { block_index } => {
                out[0] = b'C';
                out[1..9].copy_from_slice(&block_index.to_le_bytes());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_id_zero_sentinel() {
        assert!(PaymentId::ZERO.is_zero());
        assert!(!PaymentId([1, 0, 0, 0, 0, 0, 0, 0]).is_zero());
    }

    #[test]
    fn input_context_rct_layout() {
        let ki = KeyImage([0xAA; 32]);
        let ctx = InputContext::Rct { first_key_image: ki }.to_bytes();
        assert_eq!(ctx[0], b'R');
        assert_eq!(&ctx[1..33], &[0xAA; 32]);
    }

    #[test]
    fn input_context_coinbase_layout() {
        let ctx = InputContext::Coinbase { block_index: 12345 }.to_bytes();
        assert_eq!(ctx[0], b'C');
        assert_eq!(u64::from_le_bytes(ctx[1..9].try_into().unwrap()), 12345);
        assert_eq!(&ctx[9..33], &[0u8; 24]);
    }

    #[test]
    fn input_contexts_never_collide_across_kinds() {
        let rct = InputContext::Rct { first_key_image: KeyImage([0u8; 32]) }.to_bytes();
        let cb = InputContext::Coinbase { block_index: 0 }.to_bytes();
        assert_ne!(rct, cb);
    }

    #[test]
    fn enote_type_bytes() {
        assert_eq!(CarrotEnoteType::Payment.as_byte(), 0);
        assert_eq!(CarrotEnoteType::Change.as_byte(), 1);
    }
}
