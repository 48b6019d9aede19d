//! Core types and constants for the Carrot addressing protocol.
//!
//! Carrot layers one-time addresses over Ed25519 with an auxiliary generator
//! and scans them back out of a transaction's output set. This crate holds
//! the plain-old-data side of that protocol: fixed-width byte newtypes, the
//! on-chain enote records with their wire layouts, the transaction input
//! context, and protocol limits. All curve and hash work lives in
//! `carrot-core`; everything here is bytes.

pub mod constants;
pub mod enote;
pub mod int_serde;
pub mod types;

pub use constants::{CARROT_MAX_TX_OUTPUTS, CARROT_MIN_TX_OUTPUTS};
pub use enote::{CarrotCoinbaseEnoteV1, CarrotEnoteV1};
pub use types::{
    CarrotEnoteType, EncryptedAmount, EncryptedJanusAnchor, EncryptedPaymentId, InputContext,
    JanusAnchor, KeyImage, PaymentId, ViewTag,
};

use thiserror::Error;

/// Errors from parsing wire-format records.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("record too short: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("record too long: expected {expect} bytes, have {have}")]
    TrailingBytes { expect: usize, have: usize },
}
