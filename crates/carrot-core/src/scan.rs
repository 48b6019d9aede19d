//! Enote scanning: recognizing and opening received outputs.
//!
//! The non-coinbase core runs view-tag rejection, commitment-type recovery,
//! and one-time-address inversion. Wrappers supply the shared secret
//! (external ECDH, internal `s_vb`) and the Janus verdict. Scanning never
//! errors: a wrong view tag or unreproducible commitment is a `Miss`, a
//! reproducible enote whose ephemeral pubkey does not re-derive is `Janus`.
//! Both commitment candidates are always evaluated and compared in constant
//! time so a failed scan does not reveal which field diverged.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

use carrot_types::{
    CarrotCoinbaseEnoteV1, CarrotEnoteType, CarrotEnoteV1, EncryptedPaymentId, InputContext,
    JanusAnchor, PaymentId,
};

use crate::devices::{ViewBalanceDevice, ViewIncomingDevice};
use crate::ecdh::{make_enote_ephemeral_privkey, make_enote_ephemeral_pubkey};
use crate::enote_utils::{
    decrypt_amount, decrypt_janus_anchor, decrypt_payment_id, make_amount_commitment,
    make_commitment_mask, make_onetime_address_extensions, make_sender_receiver_secret,
    make_view_tag, recover_address_spend_pubkey,
};

/// Negative scanning outcomes. Not errors: a `Miss` is the normal fate of
/// everyone else's enotes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScanFailure {
    /// The enote is not addressed to these keys.
    Miss,
    /// The enote decrypts but its ephemeral pubkey does not re-derive from
    /// the anchor: a Janus probe or a corrupted sender.
    Janus,
}

/// Everything a successful scan recovers from one enote.
#[derive(Clone, Debug, Zeroize)]
pub struct ScannedEnote {
    /// `k_o^g`, the sender extension scaling `G`.
    pub sender_extension_g: Scalar,
    /// `k_o^t`, the sender extension scaling `T`.
    pub sender_extension_t: Scalar,
    /// Recovered `K_s^j`; lookup into the wallet's subaddress table happens
    /// downstream.
    pub address_spend_pubkey: EdwardsPoint,
    pub amount: u64,
    /// `k_a` (1 for coinbase).
    pub amount_blinding_factor: Scalar,
    pub payment_id: PaymentId,
    #[zeroize(skip)]
    pub enote_type: CarrotEnoteType,
    /// Decrypted anchor, as carried by the enote.
    pub nominal_janus_anchor: JanusAnchor,
    /// `s_ctx_sr`. Wallets keep it to derive spend keys and to address
    /// return payments.
    pub sender_receiver_secret: [u8; 32],
}

/// Steps 1-7 of the non-coinbase scan, given the pre-ECDH shared secret.
fn scan_enote_core(
    enote: &CarrotEnoteV1,
    encrypted_payment_id: Option<&EncryptedPaymentId>,
    s_sr: &[u8; 32],
    input_context: &InputContext,
) -> Result<ScannedEnote, ScanFailure> {
    // Fast rejection on the 3-byte tag.
    let nominal_view_tag = make_view_tag(s_sr, input_context, &enote.onetime_address);
    if !bool::from(nominal_view_tag.0[..].ct_eq(&enote.view_tag.0[..])) {
        return Err(ScanFailure::Miss);
    }

    let enote_ephemeral_pubkey = MontgomeryPoint(enote.enote_ephemeral_pubkey);
    let s_ctx_sr = make_sender_receiver_secret(s_sr, &enote_ephemeral_pubkey, input_context);

    // The amount keystream does not depend on the enote type, so the amount
    // is fixed and only the blinding factor candidates differ.
    let amount = decrypt_amount(&enote.encrypted_amount, &s_ctx_sr, &enote.onetime_address);

    let mask_payment = make_commitment_mask(&s_ctx_sr, CarrotEnoteType::Payment);
    let mask_change = make_commitment_mask(&s_ctx_sr, CarrotEnoteType::Change);
    let payment_commitment = make_amount_commitment(amount, &mask_payment).compress().to_bytes();
    let change_commitment = make_amount_commitment(amount, &mask_change).compress().to_bytes();
    let payment_matches: Choice = payment_commitment[..].ct_eq(&enote.amount_commitment[..]);
    let change_matches: Choice = change_commitment[..].ct_eq(&enote.amount_commitment[..]);
    if !bool::from(payment_matches | change_matches) {
        return Err(ScanFailure::Miss);
    }
    // Payment wins if both candidates reproduce the commitment.
    let amount_blinding_factor =
        Scalar::conditional_select(&mask_change, &mask_payment, payment_matches);
    let enote_type = if bool::from(payment_matches) {
        CarrotEnoteType::Payment
    } else {
        CarrotEnoteType::Change
    };

    let (sender_extension_g, sender_extension_t) =
        make_onetime_address_extensions(&s_ctx_sr, &enote.amount_commitment);
    let onetime_address = CompressedEdwardsY(enote.onetime_address)
        .decompress()
        .ok_or(ScanFailure::Miss)?;
    let address_spend_pubkey =
        recover_address_spend_pubkey(&onetime_address, &sender_extension_g, &sender_extension_t);

    let payment_id = match encrypted_payment_id {
        Some(encrypted) => decrypt_payment_id(encrypted, &s_ctx_sr, &enote.onetime_address),
        None => PaymentId::ZERO,
    };
    let nominal_janus_anchor =
        decrypt_janus_anchor(&enote.encrypted_anchor, &s_ctx_sr, &enote.onetime_address);

    Ok(ScannedEnote {
        sender_extension_g: *sender_extension_g,
        sender_extension_t: *sender_extension_t,
        address_spend_pubkey,
        amount,
        amount_blinding_factor,
        payment_id,
        enote_type,
        nominal_janus_anchor,
        sender_receiver_secret: *s_ctx_sr,
    })
}

/// Re-derive `d_e` from a nominal anchor and check it reproduces the enote's
/// ephemeral pubkey.
fn janus_ephemeral_pubkey_matches(
    anchor: &JanusAnchor,
    input_context: &InputContext,
    address_spend_pubkey: &EdwardsPoint,
    address_view_pubkey: &EdwardsPoint,
    payment_id: PaymentId,
    is_subaddress: bool,
    enote_ephemeral_pubkey: &MontgomeryPoint,
) -> bool {
    let d_e = make_enote_ephemeral_privkey(
        anchor,
        input_context,
        address_spend_pubkey,
        address_view_pubkey,
        payment_id,
    );
    let rederived = make_enote_ephemeral_pubkey(&d_e, address_spend_pubkey, is_subaddress);
    bool::from(rederived.as_bytes()[..].ct_eq(&enote_ephemeral_pubkey.as_bytes()[..]))
}

/// Janus protection for externally scanned enotes. Passes when the nominal
/// anchor is the account's special-self-send anchor, or when it re-derives
/// the ephemeral pubkey with the nominal payment id, or with a null payment
/// id (the published encrypted pid belongs to one output per tx, so other
/// outputs decrypt it to noise).
fn verify_janus_protection(
    scanned: &mut ScannedEnote,
    input_context: &InputContext,
    onetime_address: &[u8; 32],
    enote_ephemeral_pubkey: &MontgomeryPoint,
    k_view_dev: &dyn ViewIncomingDevice,
    account_spend_pubkey: &EdwardsPoint,
) -> bool {
    let special_anchor = k_view_dev.make_special_janus_anchor(
        enote_ephemeral_pubkey,
        input_context,
        onetime_address,
        account_spend_pubkey,
    );
    if bool::from(special_anchor.0[..].ct_eq(&scanned.nominal_janus_anchor.0[..])) {
        // Own special self-send; the published pid belongs to somebody else's
        // output.
        scanned.payment_id = PaymentId::ZERO;
        return true;
    }

    let is_main = bool::from(scanned.address_spend_pubkey.ct_eq(account_spend_pubkey));
    let address_view_pubkey = if is_main {
        k_view_dev.view_key_scalar_mult_ed25519(&ED25519_BASEPOINT_POINT)
    } else {
        k_view_dev.view_key_scalar_mult_ed25519(&scanned.address_spend_pubkey)
    };

    if janus_ephemeral_pubkey_matches(
        &scanned.nominal_janus_anchor,
        input_context,
        &scanned.address_spend_pubkey,
        &address_view_pubkey,
        scanned.payment_id,
        !is_main,
        enote_ephemeral_pubkey,
    ) {
        return true;
    }

    // Retry with a null pid before giving up.
    if janus_ephemeral_pubkey_matches(
        &scanned.nominal_janus_anchor,
        input_context,
        &scanned.address_spend_pubkey,
        &address_view_pubkey,
        PaymentId::ZERO,
        !is_main,
        enote_ephemeral_pubkey,
    ) {
        scanned.payment_id = PaymentId::ZERO;
        return true;
    }

    false
}

/// Scan an enote with the incoming view key (external scanning).
pub fn try_scan_carrot_enote_external(
    enote: &CarrotEnoteV1,
    encrypted_payment_id: Option<&EncryptedPaymentId>,
    k_view_dev: &dyn ViewIncomingDevice,
    account_spend_pubkey: &EdwardsPoint,
) -> Result<ScannedEnote, ScanFailure> {
    let enote_ephemeral_pubkey = MontgomeryPoint(enote.enote_ephemeral_pubkey);
    let s_sr = k_view_dev.view_key_scalar_mult_x25519(&enote_ephemeral_pubkey);
    let input_context = InputContext::Rct { first_key_image: enote.tx_first_key_image };

    let mut scanned = scan_enote_core(enote, encrypted_payment_id, &s_sr, &input_context)?;

    if !verify_janus_protection(
        &mut scanned,
        &input_context,
        &enote.onetime_address,
        &enote_ephemeral_pubkey,
        k_view_dev,
        account_spend_pubkey,
    ) {
        log::warn!(
            "janus protection failed for enote with onetime address {}",
            hex::encode(enote.onetime_address)
        );
        scanned.zeroize();
        return Err(ScanFailure::Janus);
    }

    Ok(scanned)
}

/// Scan an enote with the view-balance secret (internal self-sends).
/// Internal enotes are trusted by construction, so there is no Janus check
/// and the anchor is opaque randomness.
pub fn try_scan_carrot_enote_internal(
    enote: &CarrotEnoteV1,
    s_view_balance_dev: &dyn ViewBalanceDevice,
) -> Result<ScannedEnote, ScanFailure> {
    let s_sr = s_view_balance_dev.internal_shared_secret();
    let input_context = InputContext::Rct { first_key_image: enote.tx_first_key_image };
    scan_enote_core(enote, None, &s_sr, &input_context)
}

/// Scan a coinbase enote. Only the main address is recognized: with the
/// amount in cleartext there is no committed amount for a subaddress-table
/// lookup to disambiguate.
pub fn try_scan_carrot_coinbase_enote(
    enote: &CarrotCoinbaseEnoteV1,
    k_view_dev: &dyn ViewIncomingDevice,
    account_spend_pubkey: &EdwardsPoint,
) -> Result<ScannedEnote, ScanFailure> {
    let enote_ephemeral_pubkey = MontgomeryPoint(enote.enote_ephemeral_pubkey);
    let s_sr = k_view_dev.view_key_scalar_mult_x25519(&enote_ephemeral_pubkey);
    let input_context = InputContext::Coinbase { block_index: enote.block_index };

    let nominal_view_tag = make_view_tag(&s_sr, &input_context, &enote.onetime_address);
    if !bool::from(nominal_view_tag.0[..].ct_eq(&enote.view_tag.0[..])) {
        return Err(ScanFailure::Miss);
    }

    let s_ctx_sr = make_sender_receiver_secret(&s_sr, &enote_ephemeral_pubkey, &input_context);

    // Implied commitment: blinding factor 1, cleartext amount.
    let commitment_bytes =
        make_amount_commitment(enote.amount, &Scalar::ONE).compress().to_bytes();
    let (sender_extension_g, sender_extension_t) =
        make_onetime_address_extensions(&s_ctx_sr, &commitment_bytes);
    let onetime_address = CompressedEdwardsY(enote.onetime_address)
        .decompress()
        .ok_or(ScanFailure::Miss)?;
    let address_spend_pubkey =
        recover_address_spend_pubkey(&onetime_address, &sender_extension_g, &sender_extension_t);

    if !bool::from(address_spend_pubkey.ct_eq(account_spend_pubkey)) {
        return Err(ScanFailure::Miss);
    }

    let nominal_janus_anchor =
        decrypt_janus_anchor(&enote.encrypted_anchor, &s_ctx_sr, &enote.onetime_address);
    let main_address_view_pubkey =
        k_view_dev.view_key_scalar_mult_ed25519(&ED25519_BASEPOINT_POINT);
    if !janus_ephemeral_pubkey_matches(
        &nominal_janus_anchor,
        &input_context,
        account_spend_pubkey,
        &main_address_view_pubkey,
        PaymentId::ZERO,
        false,
        &enote_ephemeral_pubkey,
    ) {
        log::warn!(
            "janus protection failed for coinbase enote at block {}",
            enote.block_index
        );
        return Err(ScanFailure::Janus);
    }

    Ok(ScannedEnote {
        sender_extension_g: *sender_extension_g,
        sender_extension_t: *sender_extension_t,
        address_spend_pubkey,
        amount: enote.amount,
        amount_blinding_factor: Scalar::ONE,
        payment_id: PaymentId::ZERO,
        enote_type: CarrotEnoteType::Payment,
        nominal_janus_anchor,
        sender_receiver_secret: *s_ctx_sr,
    })
}

/// Scan records across enote versions, with uniform access to the fields
/// every version carries.
#[derive(Clone, Debug)]
pub enum IntermediateEnoteRecord {
    Rct { enote: CarrotEnoteV1, scanned: ScannedEnote },
    Coinbase { enote: CarrotCoinbaseEnoteV1, scanned: ScannedEnote },
}

impl IntermediateEnoteRecord {
    pub fn amount(&self) -> u64 {
        match self {
            IntermediateEnoteRecord::Rct { scanned, .. }
            | IntermediateEnoteRecord::Coinbase { scanned, .. } => scanned.amount,
        }
    }

    pub fn onetime_address(&self) -> &[u8; 32] {
        match self {
            IntermediateEnoteRecord::Rct { enote, .. } => &enote.onetime_address,
            IntermediateEnoteRecord::Coinbase { enote, .. } => &enote.onetime_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::get_output_proposal_normal_v1;
    use crate::devices::ViewIncomingKeyRam;
    use crate::keys::derive_all;
    use crate::proposal::CarrotPaymentProposalV1;
    use carrot_types::KeyImage;

    #[test]
    fn wrong_view_tag_is_a_miss() {
        let keys = derive_all(&[0x81u8; 32]);
        let proposal = CarrotPaymentProposalV1 {
            destination: keys.make_main_address(),
            amount: 123,
            randomness: JanusAnchor([3; 16]),
        };
        let (built, _) = get_output_proposal_normal_v1(&proposal, KeyImage([9; 32])).unwrap();
        let mut enote = built.enote;
        enote.view_tag.0[0] ^= 0xFF;

        let device = ViewIncomingKeyRam::new(keys.k_view);
        assert_eq!(
            try_scan_carrot_enote_external(&enote, None, &device, &keys.account_spend_pubkey)
                .unwrap_err(),
            ScanFailure::Miss
        );
    }

    #[test]
    fn foreign_keys_miss() {
        let keys = derive_all(&[0x82u8; 32]);
        let other = derive_all(&[0x83u8; 32]);
        let proposal = CarrotPaymentProposalV1 {
            destination: keys.make_main_address(),
            amount: 123,
            randomness: JanusAnchor([4; 16]),
        };
        let (built, pid_enc) =
            get_output_proposal_normal_v1(&proposal, KeyImage([9; 32])).unwrap();

        let device = ViewIncomingKeyRam::new(other.k_view);
        assert_eq!(
            try_scan_carrot_enote_external(
                &built.enote,
                Some(&pid_enc),
                &device,
                &other.account_spend_pubkey
            )
            .unwrap_err(),
            ScanFailure::Miss
        );
    }

    #[test]
    fn tampered_commitment_is_a_miss() {
        let keys = derive_all(&[0x84u8; 32]);
        let proposal = CarrotPaymentProposalV1 {
            destination: keys.make_main_address(),
            amount: 123,
            randomness: JanusAnchor([5; 16]),
        };
        let (built, _) = get_output_proposal_normal_v1(&proposal, KeyImage([9; 32])).unwrap();
        let mut enote = built.enote;
        // Another valid point that is not the committed one.
        enote.amount_commitment = crate::generators::H_BYTES;

        let device = ViewIncomingKeyRam::new(keys.k_view);
        assert_eq!(
            try_scan_carrot_enote_external(&enote, None, &device, &keys.account_spend_pubkey)
                .unwrap_err(),
            ScanFailure::Miss
        );
    }

    #[test]
    fn intermediate_record_accessors_cover_both_variants() {
        let keys = derive_all(&[0x85u8; 32]);
        let proposal = CarrotPaymentProposalV1 {
            destination: keys.make_main_address(),
            amount: 555,
            randomness: JanusAnchor([6; 16]),
        };
        let device = ViewIncomingKeyRam::new(keys.k_view);

        let (built, pid_enc) =
            get_output_proposal_normal_v1(&proposal, KeyImage([9; 32])).unwrap();
        let scanned = try_scan_carrot_enote_external(
            &built.enote,
            Some(&pid_enc),
            &device,
            &keys.account_spend_pubkey,
        )
        .unwrap();
        let rct = IntermediateEnoteRecord::Rct { enote: built.enote, scanned };
        assert_eq!(rct.amount(), 555);
        assert_eq!(rct.onetime_address(), &built.enote.onetime_address);

        let coinbase_enote =
            crate::construct::get_coinbase_output_proposal_v1(&proposal, 77).unwrap();
        let scanned_cb = try_scan_carrot_coinbase_enote(
            &coinbase_enote,
            &device,
            &keys.account_spend_pubkey,
        )
        .unwrap();
        let cb = IntermediateEnoteRecord::Coinbase { enote: coinbase_enote, scanned: scanned_cb };
        assert_eq!(cb.amount(), 555);
        assert_eq!(cb.onetime_address(), &coinbase_enote.onetime_address);
    }
}
