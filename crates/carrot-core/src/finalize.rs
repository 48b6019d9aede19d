//! Output-set finalization: deciding extra outputs and sealing the set.
//!
//! A transaction's output set must always contain a self-send, stay within
//! [`CARROT_MIN_TX_OUTPUTS`, `CARROT_MAX_TX_OUTPUTS`], and obey the
//! ephemeral-pubkey rule: a 2-out set shares one `D_e`, a larger set has
//! pairwise-distinct ones. The policy table in [`additional_output_type`]
//! decides which output to append to get there; the pipeline in
//! [`get_output_enote_proposals`] constructs and orders the final records.

use curve25519_dalek::constants::{ED25519_BASEPOINT_TABLE, X25519_BASEPOINT};
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::montgomery::MontgomeryPoint;

use carrot_types::{
    CarrotEnoteType, EncryptedPaymentId, JanusAnchor, KeyImage, PaymentId,
    CARROT_MAX_TX_OUTPUTS, CARROT_MIN_TX_OUTPUTS,
};

use crate::address::CarrotDestinationV1;
use crate::construct::{
    get_output_proposal_internal_v1, get_output_proposal_normal_v1, get_output_proposal_special_v1,
};
use crate::devices::{ViewBalanceDevice, ViewIncomingDevice};
use crate::proposal::{
    CarrotPaymentProposalSelfSendV1, CarrotPaymentProposalV1, RCTOutputEnoteProposal,
};
use crate::random::{random_bytes, random_scalar};
use crate::CarrotError;

/// What kind of output must be appended to complete a set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AdditionalOutputType {
    /// Payment-type self-send sharing the other output's `D_e`.
    PaymentShared,
    /// Change-type self-send sharing the other output's `D_e`.
    ChangeShared,
    /// Change-type self-send with its own fresh `D_e`.
    ChangeUnique,
    /// Zero-amount normal payment to a throwaway address.
    Dummy,
}

/// The additional-output policy. `None` means the set is already complete.
/// `Fatal` marks the two impossible states: an empty set, and a full set
/// that still needs an output.
pub fn additional_output_type(
    num_outgoing: usize,
    num_selfsend: usize,
    remaining_change: bool,
    have_selfsend_payment: bool,
) -> Result<Option<AdditionalOutputType>, CarrotError> {
    let num_outputs = num_outgoing + num_selfsend;
    if num_outputs == 0 {
        return Err(CarrotError::Fatal("output set is empty".into()));
    }
    if num_outputs >= 2 && num_selfsend >= 1 && !remaining_change {
        return Ok(None);
    }
    if num_outputs == 1 {
        if num_selfsend == 0 {
            return Ok(Some(AdditionalOutputType::ChangeShared));
        }
        if !remaining_change {
            return Ok(Some(AdditionalOutputType::Dummy));
        }
        if have_selfsend_payment {
            return Ok(Some(AdditionalOutputType::ChangeShared));
        }
        return Ok(Some(AdditionalOutputType::PaymentShared));
    }
    if num_outputs < CARROT_MAX_TX_OUTPUTS {
        return Ok(Some(AdditionalOutputType::ChangeUnique));
    }
    Err(CarrotError::Fatal(
        "output set is full but still needs an output".into(),
    ))
}

/// A policy decision materialized as a proposal.
#[derive(Clone, Debug)]
pub enum AdditionalOutputProposal {
    Normal(CarrotPaymentProposalV1),
    SelfSend(CarrotPaymentProposalSelfSendV1),
}

/// Turn the policy verdict into an appendable proposal. Shared/unique `D_e`
/// resolution happens later, in the construction pipeline, once the partner
/// output exists.
pub fn get_additional_output_proposal(
    num_outgoing: usize,
    num_selfsend: usize,
    needed_change_amount: u64,
    have_selfsend_payment: bool,
    change_address_spend_pubkey: &EdwardsPoint,
) -> Result<Option<AdditionalOutputProposal>, CarrotError> {
    let decision = additional_output_type(
        num_outgoing,
        num_selfsend,
        needed_change_amount > 0,
        have_selfsend_payment,
    )?;

    let proposal = match decision {
        None => return Ok(None),
        Some(AdditionalOutputType::Dummy) => {
            // Throwaway address from fresh keys; nobody can scan this.
            let dummy_destination = CarrotDestinationV1 {
                address_spend_pubkey: ED25519_BASEPOINT_TABLE * &random_scalar(),
                address_view_pubkey: ED25519_BASEPOINT_TABLE * &random_scalar(),
                is_subaddress: false,
                payment_id: PaymentId::ZERO,
            };
            AdditionalOutputProposal::Normal(CarrotPaymentProposalV1 {
                destination: dummy_destination,
                amount: 0,
                randomness: random_nonzero_anchor(),
            })
        }
        Some(kind) => {
            let enote_type = match kind {
                AdditionalOutputType::PaymentShared => CarrotEnoteType::Payment,
                _ => CarrotEnoteType::Change,
            };
            AdditionalOutputProposal::SelfSend(CarrotPaymentProposalSelfSendV1 {
                destination_address_spend_pubkey: *change_address_spend_pubkey,
                amount: needed_change_amount,
                enote_type,
                enote_ephemeral_pubkey: None,
            })
        }
    };
    Ok(Some(proposal))
}

fn random_nonzero_anchor() -> JanusAnchor {
    loop {
        let anchor = JanusAnchor(random_bytes::<16>());
        if !anchor.is_zero() {
            return anchor;
        }
    }
}

/// Construct, validate, and order a transaction's full output set.
///
/// Self-sends are built internally when a view-balance device is available,
/// else as special self-sends through the view-incoming device. The returned
/// encrypted payment id is the integrated output's, or fresh random bytes
/// when no output disambiguates it. Final records are ordered by one-time
/// address.
pub fn get_output_enote_proposals(
    mut normal_payment_proposals: Vec<CarrotPaymentProposalV1>,
    mut selfsend_payment_proposals: Vec<CarrotPaymentProposalSelfSendV1>,
    s_view_balance_dev: Option<&dyn ViewBalanceDevice>,
    k_view_dev: &dyn ViewIncomingDevice,
    account_spend_pubkey: &EdwardsPoint,
    tx_first_key_image: KeyImage,
) -> Result<(Vec<RCTOutputEnoteProposal>, EncryptedPaymentId), CarrotError> {
    let num_outputs = normal_payment_proposals.len() + selfsend_payment_proposals.len();
    if selfsend_payment_proposals.is_empty() {
        return Err(CarrotError::InvalidProposal(
            "output set has no self-send".into(),
        ));
    }
    if num_outputs < CARROT_MIN_TX_OUTPUTS {
        return Err(CarrotError::InvalidProposal("too few outputs".into()));
    }
    if num_outputs > CARROT_MAX_TX_OUTPUTS {
        return Err(CarrotError::InvalidProposal("too many outputs".into()));
    }

    let num_integrated = normal_payment_proposals
        .iter()
        .filter(|p| !p.destination.payment_id.is_zero())
        .count();
    if num_integrated > 1 {
        return Err(CarrotError::InvalidProposal(
            "more than one integrated-address output".into(),
        ));
    }

    // Deterministic order, and a duplicate-randomness check while at it:
    // equal randomness against the same destination would collide `d_e`.
    normal_payment_proposals.sort_by(|a, b| a.randomness.0.cmp(&b.randomness.0));
    if normal_payment_proposals.windows(2).any(|w| w[0].randomness == w[1].randomness) {
        return Err(CarrotError::InvalidProposal(
            "duplicate randomness across normal proposals".into(),
        ));
    }

    let mut outputs = Vec::with_capacity(num_outputs);
    let mut integrated_payment_id_enc = None;
    for proposal in &normal_payment_proposals {
        let (built, payment_id_enc) =
            get_output_proposal_normal_v1(proposal, tx_first_key_image)?;
        if !proposal.destination.payment_id.is_zero() {
            integrated_payment_id_enc = Some(payment_id_enc);
        }
        outputs.push(built);
    }

    // 2-out sets share one ephemeral pubkey: a self-send without an explicit
    // D_e adopts its partner's (the normal output's, or the other
    // self-send's, generating one fresh key if neither pins it).
    if num_outputs == 2 {
        let mut shared = outputs.first().map(|o| MontgomeryPoint(o.enote.enote_ephemeral_pubkey));
        for proposal in &mut selfsend_payment_proposals {
            match (proposal.enote_ephemeral_pubkey, shared) {
                (Some(pinned), _) => shared = Some(pinned),
                (None, Some(partner)) => proposal.enote_ephemeral_pubkey = Some(partner),
                (None, None) => {
                    let fresh = random_scalar() * X25519_BASEPOINT;
                    proposal.enote_ephemeral_pubkey = Some(fresh);
                    shared = Some(fresh);
                }
            }
        }
    }

    for proposal in &selfsend_payment_proposals {
        let built = match s_view_balance_dev {
            Some(balance_dev) => {
                get_output_proposal_internal_v1(proposal, balance_dev, tx_first_key_image)?
            }
            None => get_output_proposal_special_v1(
                proposal,
                k_view_dev,
                account_spend_pubkey,
                tx_first_key_image,
            )?,
        };
        outputs.push(built);
    }

    let encrypted_payment_id = match integrated_payment_id_enc {
        Some(enc) => enc,
        None => EncryptedPaymentId(random_bytes::<8>()),
    };

    // Ephemeral-pubkey rule, checked over the D_e-sorted set.
    outputs.sort_by(|a, b| {
        a.enote.enote_ephemeral_pubkey.cmp(&b.enote.enote_ephemeral_pubkey)
    });
    if num_outputs == 2 {
        if outputs[0].enote.enote_ephemeral_pubkey != outputs[1].enote.enote_ephemeral_pubkey {
            return Err(CarrotError::Fatal(
                "2-out set does not share an ephemeral pubkey".into(),
            ));
        }
    } else if outputs
        .windows(2)
        .any(|w| w[0].enote.enote_ephemeral_pubkey == w[1].enote.enote_ephemeral_pubkey)
    {
        return Err(CarrotError::Fatal(
            "duplicate ephemeral pubkey in a >2-out set".into(),
        ));
    }

    outputs.sort_by(|a, b| a.enote.onetime_address.cmp(&b.enote.onetime_address));
    log::debug!(
        "finalized output set: {} outputs ({} normal, {} self-send)",
        num_outputs,
        normal_payment_proposals.len(),
        selfsend_payment_proposals.len(),
    );

    Ok((outputs, encrypted_payment_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table_is_implemented_exactly() {
        use AdditionalOutputType::*;

        // FATAL rows
        assert!(matches!(
            additional_output_type(0, 0, false, false),
            Err(CarrotError::Fatal(_))
        ));
        assert!(matches!(
            additional_output_type(CARROT_MAX_TX_OUTPUTS, 0, true, false),
            Err(CarrotError::Fatal(_))
        ));
        assert!(matches!(
            additional_output_type(CARROT_MAX_TX_OUTPUTS - 1, 1, true, false),
            Err(CarrotError::Fatal(_))
        ));

        // Complete
        assert_eq!(additional_output_type(1, 1, false, false).unwrap(), None);
        assert_eq!(additional_output_type(5, 2, false, true).unwrap(), None);

        // One-output rows
        assert_eq!(
            additional_output_type(1, 0, false, false).unwrap(),
            Some(ChangeShared)
        );
        assert_eq!(
            additional_output_type(1, 0, true, false).unwrap(),
            Some(ChangeShared)
        );
        assert_eq!(additional_output_type(0, 1, false, false).unwrap(), Some(Dummy));
        assert_eq!(
            additional_output_type(0, 1, true, true).unwrap(),
            Some(ChangeShared)
        );
        assert_eq!(
            additional_output_type(0, 1, true, false).unwrap(),
            Some(PaymentShared)
        );

        // Middle rows
        assert_eq!(
            additional_output_type(2, 0, false, false).unwrap(),
            Some(ChangeUnique)
        );
        assert_eq!(
            additional_output_type(2, 1, true, false).unwrap(),
            Some(ChangeUnique)
        );
        assert_eq!(
            additional_output_type(CARROT_MAX_TX_OUTPUTS - 1, 0, true, false).unwrap(),
            Some(ChangeUnique)
        );
    }

    #[test]
    fn policy_is_total_over_a_sweep_of_the_domain() {
        for outgoing in 0..=CARROT_MAX_TX_OUTPUTS {
            for selfsend in 0..=(CARROT_MAX_TX_OUTPUTS - outgoing) {
                for remaining in [false, true] {
                    for have_payment in [false, true] {
                        let result =
                            additional_output_type(outgoing, selfsend, remaining, have_payment);
                        let n = outgoing + selfsend;
                        let expect_fatal = n == 0
                            || (n >= CARROT_MAX_TX_OUTPUTS
                                && !(n >= 2 && selfsend >= 1 && !remaining));
                        assert_eq!(
                            result.is_err(),
                            expect_fatal,
                            "fatality mismatch at ({outgoing}, {selfsend}, {remaining}, {have_payment})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn dummy_proposal_is_zero_amount_to_a_fresh_main_address() {
        let change_spend = ED25519_BASEPOINT_TABLE * &random_scalar();
        let proposal = get_additional_output_proposal(0, 1, 0, false, &change_spend)
            .unwrap()
            .unwrap();
        match proposal {
            AdditionalOutputProposal::Normal(normal) => {
                assert_eq!(normal.amount, 0);
                assert!(!normal.randomness.is_zero());
                assert!(!normal.destination.is_subaddress);
                assert!(normal.destination.payment_id.is_zero());
                assert_ne!(normal.destination.address_spend_pubkey, change_spend);
            }
            AdditionalOutputProposal::SelfSend(_) => panic!("expected a dummy normal proposal"),
        }
    }

    #[test]
    fn change_proposal_targets_the_change_address() {
        let change_spend = ED25519_BASEPOINT_TABLE * &random_scalar();
        let proposal = get_additional_output_proposal(1, 0, 5000, false, &change_spend)
            .unwrap()
            .unwrap();
        match proposal {
            AdditionalOutputProposal::SelfSend(selfsend) => {
                assert_eq!(selfsend.destination_address_spend_pubkey, change_spend);
                assert_eq!(selfsend.amount, 5000);
                assert_eq!(selfsend.enote_type, CarrotEnoteType::Change);
                assert!(selfsend.enote_ephemeral_pubkey.is_none());
            }
            AdditionalOutputProposal::Normal(_) => panic!("expected a self-send proposal"),
        }
    }
}
