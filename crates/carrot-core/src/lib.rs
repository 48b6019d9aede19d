//! Core of the Carrot addressing protocol.
//!
//! Carrot builds one-time output records ("enotes") over Ed25519 with an
//! auxiliary generator `T`, so that a sender who knows a public address can
//! create a spendable output while only the recipient's view/spend secret
//! hierarchy can recognize it, decrypt its amount and payment id, and verify
//! it was not forged by a Janus-style subaddress-mixing probe.
//!
//! The crate is purely computational and stateless per call: key derivation,
//! address derivation, enote construction, enote scanning, output-set
//! finalization, and the spend-authority proof. Storage, transaction
//! assembly, ring signatures, and range proofs live with the surrounding
//! wallet.

pub mod address;
pub mod construct;
pub mod devices;
pub mod ecdh;
pub mod enote_utils;
pub mod finalize;
pub mod generators;
pub mod hash_to_point;
pub mod hashing;
pub mod keys;
pub mod proof;
pub mod proposal;
pub mod scan;

mod random;

pub use address::{
    make_integrated_address, make_main_address, make_subaddress, CarrotDestinationV1,
};
pub use construct::{
    get_coinbase_output_proposal_v1, get_output_proposal_internal_v1,
    get_output_proposal_normal_v1, get_output_proposal_special_v1,
};
pub use devices::{
    ViewBalanceDevice, ViewBalanceSecretRam, ViewIncomingDevice, ViewIncomingKeyRam,
};
pub use finalize::{
    additional_output_type, get_additional_output_proposal, get_output_enote_proposals,
    AdditionalOutputProposal, AdditionalOutputType,
};
pub use keys::{derive_all, derive_view_balance, CarrotAccountSecrets, CarrotViewBalanceSecrets};
pub use proof::{
    make_carrot_spend_authority_proof, verify_carrot_spend_authority_proof, SpendAuthorityProof,
};
pub use proposal::{
    CarrotPaymentProposalSelfSendV1, CarrotPaymentProposalV1, RCTOutputEnoteProposal,
};
pub use scan::{
    try_scan_carrot_coinbase_enote, try_scan_carrot_enote_external,
    try_scan_carrot_enote_internal, IntermediateEnoteRecord, ScanFailure, ScannedEnote,
};

use thiserror::Error;

/// Errors from proposal validation and output-set finalization. Scanning
/// does not use these; its negative outcomes are [`ScanFailure`].
#[derive(Debug, Error)]
pub enum CarrotError {
    /// A proposal or proposal set violates a precondition. Programmer
    /// error, not adversary input.
    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    /// Internal inconsistency; aborts transaction assembly.
    #[error("fatal output-set inconsistency: {0}")]
    Fatal(String),
}
