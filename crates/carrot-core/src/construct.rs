//! Enote construction: turns payment proposals into on-chain records.
//!
//! Four modes share one spine (shared secret, commitment, extensions,
//! one-time address, encryptions) and differ in how the shared secret and
//! the anchor are sourced:
//!
//! * normal   — ECDH from proposal randomness; anchor = the randomness
//! * coinbase — like normal, but `k_a = 1` and the amount stays cleartext
//! * special  — ECDH with the receiver's own `k_v`; anchor = `"anchor_sp"` hash
//! * internal — no ECDH, `s_sr = s_vb`; anchor = fresh random bytes

use curve25519_dalek::constants::X25519_BASEPOINT;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;

use carrot_types::{
    CarrotCoinbaseEnoteV1, CarrotEnoteType, CarrotEnoteV1, EncryptedJanusAnchor,
    EncryptedPaymentId, InputContext, KeyImage,
};

use crate::devices::{ViewBalanceDevice, ViewIncomingDevice};
use crate::ecdh::{
    make_ecdh_shared_secret_sender, make_enote_ephemeral_privkey, make_enote_ephemeral_pubkey,
};
use crate::enote_utils::{
    encrypt_amount, encrypt_janus_anchor, encrypt_payment_id, make_amount_commitment,
    make_commitment_mask, make_onetime_address, make_onetime_address_extensions,
    make_sender_receiver_secret, make_view_tag,
};
use crate::proposal::{CarrotPaymentProposalSelfSendV1, CarrotPaymentProposalV1,
    RCTOutputEnoteProposal};
use crate::random::{random_bytes, random_scalar};
use crate::CarrotError;

fn check_normal_proposal(proposal: &CarrotPaymentProposalV1) -> Result<(), CarrotError> {
    if proposal.randomness.is_zero() {
        return Err(CarrotError::InvalidProposal(
            "normal payment proposal has zero randomness".into(),
        ));
    }
    if proposal.destination.is_subaddress && !proposal.destination.payment_id.is_zero() {
        return Err(CarrotError::InvalidProposal(
            "payment id on a subaddress destination".into(),
        ));
    }
    Ok(())
}

/// Construct a normal outgoing enote. Also returns the encrypted payment id
/// so finalization can publish the integrated output's.
pub fn get_output_proposal_normal_v1(
    proposal: &CarrotPaymentProposalV1,
    tx_first_key_image: KeyImage,
) -> Result<(RCTOutputEnoteProposal, EncryptedPaymentId), CarrotError> {
    check_normal_proposal(proposal)?;
    let destination = &proposal.destination;
    let input_context = InputContext::Rct { first_key_image: tx_first_key_image };

    let d_e = make_enote_ephemeral_privkey(
        &proposal.randomness,
        &input_context,
        &destination.address_spend_pubkey,
        &destination.address_view_pubkey,
        destination.payment_id,
    );
    let enote_ephemeral_pubkey =
        make_enote_ephemeral_pubkey(&d_e, &destination.address_spend_pubkey, destination.is_subaddress);
    let s_sr = make_ecdh_shared_secret_sender(&d_e, &destination.address_view_pubkey);
    let s_ctx_sr = make_sender_receiver_secret(&s_sr, &enote_ephemeral_pubkey, &input_context);

    let amount_blinding_factor = make_commitment_mask(&s_ctx_sr, CarrotEnoteType::Payment);
    let amount_commitment = make_amount_commitment(proposal.amount, &amount_blinding_factor);
    let commitment_bytes = amount_commitment.compress().to_bytes();

    let (ext_g, ext_t) = make_onetime_address_extensions(&s_ctx_sr, &commitment_bytes);
    let onetime_address =
        make_onetime_address(&destination.address_spend_pubkey, &ext_g, &ext_t);
    let onetime_address_bytes = onetime_address.compress().to_bytes();

    let enote = CarrotEnoteV1 {
        onetime_address: onetime_address_bytes,
        amount_commitment: commitment_bytes,
        encrypted_amount: encrypt_amount(proposal.amount, &s_ctx_sr, &onetime_address_bytes),
        encrypted_anchor: encrypt_janus_anchor(
            &proposal.randomness,
            &s_ctx_sr,
            &onetime_address_bytes,
        ),
        view_tag: make_view_tag(&s_sr, &input_context, &onetime_address_bytes),
        enote_ephemeral_pubkey: enote_ephemeral_pubkey.to_bytes(),
        tx_first_key_image,
    };
    let encrypted_payment_id =
        encrypt_payment_id(destination.payment_id, &s_ctx_sr, &onetime_address_bytes);

    Ok((
        RCTOutputEnoteProposal {
            enote,
            amount: proposal.amount,
            amount_blinding_factor: *amount_blinding_factor,
        },
        encrypted_payment_id,
    ))
}

/// Construct a coinbase enote. Coinbase pays main addresses only, with a
/// cleartext amount and the fixed commitment `G + a*H`.
pub fn get_coinbase_output_proposal_v1(
    proposal: &CarrotPaymentProposalV1,
    block_index: u64,
) -> Result<CarrotCoinbaseEnoteV1, CarrotError> {
    if proposal.destination.is_subaddress {
        return Err(CarrotError::InvalidProposal(
            "coinbase cannot pay a subaddress".into(),
        ));
    }
    if !proposal.destination.payment_id.is_zero() {
        return Err(CarrotError::InvalidProposal(
            "coinbase cannot pay an integrated address".into(),
        ));
    }
    check_normal_proposal(proposal)?;
    let destination = &proposal.destination;
    let input_context = InputContext::Coinbase { block_index };

    let d_e = make_enote_ephemeral_privkey(
        &proposal.randomness,
        &input_context,
        &destination.address_spend_pubkey,
        &destination.address_view_pubkey,
        destination.payment_id,
    );
    let enote_ephemeral_pubkey = make_enote_ephemeral_pubkey(&d_e, &destination.address_spend_pubkey, false);
    let s_sr = make_ecdh_shared_secret_sender(&d_e, &destination.address_view_pubkey);
    let s_ctx_sr = make_sender_receiver_secret(&s_sr, &enote_ephemeral_pubkey, &input_context);

    // Implied commitment with blinding factor 1.
    let commitment_bytes =
        make_amount_commitment(proposal.amount, &Scalar::ONE).compress().to_bytes();

    let (ext_g, ext_t) = make_onetime_address_extensions(&s_ctx_sr, &commitment_bytes);
    let onetime_address =
        make_onetime_address(&destination.address_spend_pubkey, &ext_g, &ext_t);
    let onetime_address_bytes = onetime_address.compress().to_bytes();

    Ok(CarrotCoinbaseEnoteV1 {
        onetime_address: onetime_address_bytes,
        amount: proposal.amount,
        encrypted_anchor: encrypt_janus_anchor(
            &proposal.randomness,
            &s_ctx_sr,
            &onetime_address_bytes,
        ),
        view_tag: make_view_tag(&s_sr, &input_context, &onetime_address_bytes),
        enote_ephemeral_pubkey: enote_ephemeral_pubkey.to_bytes(),
        block_index,
    })
}

fn resolve_ephemeral_pubkey(proposal: &CarrotPaymentProposalSelfSendV1) -> MontgomeryPoint {
    match proposal.enote_ephemeral_pubkey {
        Some(shared) => shared,
        None => random_scalar() * X25519_BASEPOINT,
    }
}

/// Self-send enote spine shared by the special and internal paths; the
/// caller supplies the uncontextualized shared secret and the anchor policy.
fn finish_self_send(
    proposal: &CarrotPaymentProposalSelfSendV1,
    s_sr: &[u8; 32],
    enote_ephemeral_pubkey: MontgomeryPoint,
    input_context: InputContext,
    tx_first_key_image: KeyImage,
    anchor: impl FnOnce(&[u8; 32], &[u8; 32], &MontgomeryPoint, &InputContext) -> EncryptedJanusAnchor,
) -> RCTOutputEnoteProposal {
    let s_ctx_sr = make_sender_receiver_secret(s_sr, &enote_ephemeral_pubkey, &input_context);

    let amount_blinding_factor = make_commitment_mask(&s_ctx_sr, proposal.enote_type);
    let commitment_bytes =
        make_amount_commitment(proposal.amount, &amount_blinding_factor).compress().to_bytes();

    let (ext_g, ext_t) = make_onetime_address_extensions(&s_ctx_sr, &commitment_bytes);
    let onetime_address = make_onetime_address(
        &proposal.destination_address_spend_pubkey,
        &ext_g,
        &ext_t,
    );
    let onetime_address_bytes = onetime_address.compress().to_bytes();

    let enote = CarrotEnoteV1 {
        onetime_address: onetime_address_bytes,
        amount_commitment: commitment_bytes,
        encrypted_amount: encrypt_amount(proposal.amount, &s_ctx_sr, &onetime_address_bytes),
        encrypted_anchor: anchor(
            &s_ctx_sr,
            &onetime_address_bytes,
            &enote_ephemeral_pubkey,
            &input_context,
        ),
        view_tag: make_view_tag(s_sr, &input_context, &onetime_address_bytes),
        enote_ephemeral_pubkey: enote_ephemeral_pubkey.to_bytes(),
        tx_first_key_image,
    };

    RCTOutputEnoteProposal {
        enote,
        amount: proposal.amount,
        amount_blinding_factor: *amount_blinding_factor,
    }
}

/// Construct a special self-send enote: scanned with `k_v` like an external
/// enote, and recognized in the Janus check through its `"anchor_sp"` anchor.
pub fn get_output_proposal_special_v1(
    proposal: &CarrotPaymentProposalSelfSendV1,
    k_view_dev: &dyn ViewIncomingDevice,
    account_spend_pubkey: &EdwardsPoint,
    tx_first_key_image: KeyImage,
) -> Result<RCTOutputEnoteProposal, CarrotError> {
    let input_context = InputContext::Rct { first_key_image: tx_first_key_image };
    let enote_ephemeral_pubkey = resolve_ephemeral_pubkey(proposal);
    let s_sr = k_view_dev.view_key_scalar_mult_x25519(&enote_ephemeral_pubkey);

    Ok(finish_self_send(
        proposal,
        &s_sr,
        enote_ephemeral_pubkey,
        input_context,
        tx_first_key_image,
        |s_ctx_sr, onetime_address, d_e_pub, ctx| {
            let special =
                k_view_dev.make_special_janus_anchor(d_e_pub, ctx, onetime_address, account_spend_pubkey);
            encrypt_janus_anchor(&special, s_ctx_sr, onetime_address)
        },
    ))
}

/// Construct an internal self-send enote: no ECDH, `s_vb` is the shared
/// secret, and the anchor field carries plain random bytes.
pub fn get_output_proposal_internal_v1(
    proposal: &CarrotPaymentProposalSelfSendV1,
    s_view_balance_dev: &dyn ViewBalanceDevice,
    tx_first_key_image: KeyImage,
) -> Result<RCTOutputEnoteProposal, CarrotError> {
    let input_context = InputContext::Rct { first_key_image: tx_first_key_image };
    let enote_ephemeral_pubkey = resolve_ephemeral_pubkey(proposal);
    let s_sr = s_view_balance_dev.internal_shared_secret();

    Ok(finish_self_send(
        proposal,
        &s_sr,
        enote_ephemeral_pubkey,
        input_context,
        tx_first_key_image,
        |_, _, _, _| EncryptedJanusAnchor(random_bytes::<16>()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_all;
    use carrot_types::JanusAnchor;

    fn normal_proposal(seed: u8) -> (CarrotPaymentProposalV1, crate::keys::CarrotAccountSecrets) {
        let keys = derive_all(&[seed; 32]);
        let proposal = CarrotPaymentProposalV1 {
            destination: keys.make_main_address(),
            amount: 1_000_000,
            randomness: JanusAnchor([seed.wrapping_add(1); 16]),
        };
        (proposal, keys)
    }

    #[test]
    fn normal_construction_rejects_zero_randomness() {
        let (mut proposal, _) = normal_proposal(0x71);
        proposal.randomness = JanusAnchor::ZERO;
        assert!(matches!(
            get_output_proposal_normal_v1(&proposal, KeyImage([1; 32])),
            Err(CarrotError::InvalidProposal(_))
        ));
    }

    #[test]
    fn normal_construction_is_deterministic() {
        let (proposal, _) = normal_proposal(0x72);
        let ki = KeyImage([2; 32]);
        let (a, pid_a) = get_output_proposal_normal_v1(&proposal, ki).unwrap();
        let (b, pid_b) = get_output_proposal_normal_v1(&proposal, ki).unwrap();
        assert_eq!(a.enote, b.enote);
        assert_eq!(pid_a, pid_b);
    }

    #[test]
    fn key_image_context_separates_enotes() {
        let (proposal, _) = normal_proposal(0x73);
        let (a, _) = get_output_proposal_normal_v1(&proposal, KeyImage([3; 32])).unwrap();
        let (b, _) = get_output_proposal_normal_v1(&proposal, KeyImage([4; 32])).unwrap();
        assert_ne!(a.enote.onetime_address, b.enote.onetime_address);
    }

    #[test]
    fn coinbase_rejects_subaddress_and_integrated() {
        let keys = derive_all(&[0x74u8; 32]);
        let sub = CarrotPaymentProposalV1 {
            destination: keys.make_subaddress(1, 1),
            amount: 50,
            randomness: JanusAnchor([5; 16]),
        };
        assert!(matches!(
            get_coinbase_output_proposal_v1(&sub, 10),
            Err(CarrotError::InvalidProposal(_))
        ));

        let integrated = CarrotPaymentProposalV1 {
            destination: keys
                .make_integrated_address(carrot_types::PaymentId([1; 8]))
                .unwrap(),
            amount: 50,
            randomness: JanusAnchor([5; 16]),
        };
        assert!(matches!(
            get_coinbase_output_proposal_v1(&integrated, 10),
            Err(CarrotError::InvalidProposal(_))
        ));
    }

    #[test]
    fn coinbase_amount_is_cleartext() {
        let (proposal, _) = normal_proposal(0x75);
        let enote = get_coinbase_output_proposal_v1(&proposal, 42).unwrap();
        assert_eq!(enote.amount, proposal.amount);
        assert_eq!(enote.block_index, 42);
    }

    #[test]
    fn self_send_reuses_a_provided_ephemeral_pubkey() {
        let keys = derive_all(&[0x76u8; 32]);
        let shared = random_scalar() * X25519_BASEPOINT;
        let proposal = CarrotPaymentProposalSelfSendV1 {
            destination_address_spend_pubkey: keys.account_spend_pubkey,
            amount: 7,
            enote_type: CarrotEnoteType::Change,
            enote_ephemeral_pubkey: Some(shared),
        };
        let device = crate::devices::ViewIncomingKeyRam::new(keys.k_view);
        let built = get_output_proposal_special_v1(
            &proposal,
            &device,
            &keys.account_spend_pubkey,
            KeyImage([6; 32]),
        )
        .unwrap();
        assert_eq!(built.enote.enote_ephemeral_pubkey, shared.to_bytes());
    }
}
