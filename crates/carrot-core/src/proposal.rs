//! Payment proposals: what a wallet wants to send, before enote construction.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;

use carrot_types::{CarrotEnoteType, CarrotEnoteV1, JanusAnchor};

use crate::address::CarrotDestinationV1;

/// An outgoing payment to someone else's address.
#[derive(Clone, Copy, Debug)]
pub struct CarrotPaymentProposalV1 {
    pub destination: CarrotDestinationV1,
    pub amount: u64,
    /// Janus-protection randomness; must be nonzero. The ephemeral key and
    /// the encrypted anchor both derive from it.
    pub randomness: JanusAnchor,
}

/// A payment back to the wallet's own account (change or self-payment).
#[derive(Clone, Copy, Debug)]
pub struct CarrotPaymentProposalSelfSendV1 {
    /// Spend pubkey of the own address receiving the funds.
    pub destination_address_spend_pubkey: EdwardsPoint,
    pub amount: u64,
    pub enote_type: CarrotEnoteType,
    /// Ephemeral pubkey to reuse, for the 2-out shared-`D_e` rule.
    /// `None` means construction picks a fresh one.
    pub enote_ephemeral_pubkey: Option<MontgomeryPoint>,
}

/// A constructed output: the on-chain enote plus the opening the wallet
/// needs for balance and range proofs.
#[derive(Clone, Copy, Debug)]
pub struct RCTOutputEnoteProposal {
    pub enote: CarrotEnoteV1,
    pub amount: u64,
    pub amount_blinding_factor: Scalar,
}
