//! On-chain enote records and their fixed-width wire layouts.
//!
//! Layouts (little-endian integers):
//!
//! `CarrotEnoteV1`:
//!   Ko(32) | C_a(32) | amount_enc(8) | anchor_enc(16) | view_tag(3) |
//!   D_e(32) | tx_first_key_image(32)                          = 155 bytes
//!
//! `CarrotCoinbaseEnoteV1`:
//!   Ko(32) | amount(8) | anchor_enc(16) | view_tag(3) |
//!   D_e(32) | block_index(8)                                  = 99 bytes

use crate::types::{EncryptedAmount, EncryptedJanusAnchor, KeyImage, ViewTag};
use crate::WireError;

/// A RingCT output record: one-time address, hidden amount, and the
/// encrypted fields only the recipient can open.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CarrotEnoteV1 {
    /// One-time address `Ko`.
    pub onetime_address: [u8; 32],
    /// Pedersen amount commitment `C_a`.
    pub amount_commitment: [u8; 32],
    pub encrypted_amount: EncryptedAmount,
    pub encrypted_anchor: EncryptedJanusAnchor,
    pub view_tag: ViewTag,
    /// X25519 ephemeral pubkey `D_e`.
    pub enote_ephemeral_pubkey: [u8; 32],
    /// First key image of the transaction spending into this enote.
    pub tx_first_key_image: KeyImage,
}

impl CarrotEnoteV1 {
    pub const WIRE_LEN: usize = 155;

    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[0..32].copy_from_slice(&self.onetime_address);
        out[32..64].copy_from_slice(&self.amount_commitment);
        out[64..72].copy_from_slice(&self.encrypted_amount.0);
        out[72..88].copy_from_slice(&self.encrypted_anchor.0);
        out[88..91].copy_from_slice(&self.view_tag.0);
        out[91..123].copy_from_slice(&self.enote_ephemeral_pubkey);
        out[123..155].copy_from_slice(&self.tx_first_key_image.0);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        check_len(bytes, Self::WIRE_LEN)?;
        Ok(CarrotEnoteV1 {
            onetime_address: take32(bytes, 0),
            amount_commitment: take32(bytes, 32),
            encrypted_amount: EncryptedAmount(take8(bytes, 64)),
            encrypted_anchor: EncryptedJanusAnchor(take16(bytes, 72)),
            view_tag: ViewTag([bytes[88], bytes[89], bytes[90]]),
            enote_ephemeral_pubkey: take32(bytes, 91),
            tx_first_key_image: KeyImage(take32(bytes, 123)),
        })
    }
}

/// A coinbase output record. The amount is cleartext and the commitment is
/// implied as `G + amount*H`, so neither an encrypted amount nor the
/// commitment itself is stored.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CarrotCoinbaseEnoteV1 {
    pub onetime_address: [u8; 32],
    pub amount: u64,
    pub encrypted_anchor: EncryptedJanusAnchor,
    pub view_tag: ViewTag,
    pub enote_ephemeral_pubkey: [u8; 32],
    pub block_index: u64,
}

impl CarrotCoinbaseEnoteV1 {
    pub const WIRE_LEN: usize = 99;

    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[0..32].copy_from_slice(&self.onetime_address);
        out[32..40].copy_from_slice(&self.amount.to_le_bytes());
        out[40..56].copy_from_slice(&self.encrypted_anchor.0);
        out[56..59].copy_from_slice(&self.view_tag.0);
        out[59..91].copy_from_slice(&self.enote_ephemeral_pubkey);
        out[91..99].copy_from_slice(&self.block_index.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        check_len(bytes, Self::WIRE_LEN)?;
        Ok(CarrotCoinbaseEnoteV1 {
            onetime_address: take32(bytes, 0),
            amount: u64::from_le_bytes(take8(bytes, 32)),
            encrypted_anchor: EncryptedJanusAnchor(take16(bytes, 40)),
            view_tag: ViewTag([bytes[56], bytes[57], bytes[58]]),
            enote_ephemeral_pubkey: take32(bytes, 59),
            block_index: u64::from_le_bytes(take8(bytes, 91)),
        })
    }
}

fn check_len(bytes: &[u8], expect: usize) -> Result<(), WireError> {
    if bytes.len() < expect {
        return Err(WireError::Truncated { need: expect, have: bytes.len() });
    }
    if bytes.len() > expect {
        return Err(WireError::TrailingBytes { expect, have: bytes.len() });
    }
    Ok(())
}

fn take8(bytes: &[u8], at: usize) -> [u8; 8] {
    bytes[at..at + 8].try_into().expect("slice length checked")
}

fn take16(bytes: &[u8], at: usize) -> [u8; 16] {
    bytes[at..at + 16].try_into().expect("slice length checked")
}

fn take32(bytes: &[u8], at: usize) -> [u8; 32] {
    bytes[at..at + 32].try_into().expect("slice length checked")
}
