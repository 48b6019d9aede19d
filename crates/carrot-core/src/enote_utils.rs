//! Mid-level enote derivations shared by construction and scanning.
//!
//! Everything downstream of the shared secret lives here: the
//! contextualized secret, commitment mask, sender extensions, one-time
//! address, view tag, and the three XOR encryptions. Construction walks
//! these functions forward; scanning walks them backward.

use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;
use zeroize::Zeroizing;

use carrot_types::{
    CarrotEnoteType, EncryptedAmount, EncryptedJanusAnchor, EncryptedPaymentId, InputContext,
    JanusAnchor, PaymentId, ViewTag,
};

use crate::generators::{h_point, t_point};
use crate::hashing::{hash32, hash_scalar, xor_keystream};

const DOMAIN_SENDER_RECEIVER_SECRET: &str = "s_ctx_sr";
const DOMAIN_COMMITMENT_MASK: &str = "k_a";
const DOMAIN_EXTENSION_G: &str = "k_o^g";
const DOMAIN_EXTENSION_T: &str = "k_o^t";
const DOMAIN_ENCRYPT_AMOUNT: &str = "enc_a";
const DOMAIN_ENCRYPT_PAYMENT_ID: &str = "enc_pid";
const DOMAIN_VIEW_TAG: &str = "vt";
const DOMAIN_ENCRYPT_ANCHOR: &str = "enc_anchor";
const DOMAIN_SPECIAL_ANCHOR: &str = "anchor_sp";

/// `s_ctx_sr = hash32("s_ctx_sr", s_sr, D_e, input_context)`: binds the raw
/// shared secret to this transaction.
pub fn make_sender_receiver_secret(
    s_sr: &[u8; 32],
    enote_ephemeral_pubkey: &MontgomeryPoint,
    input_context: &InputContext,
) -> Zeroizing<[u8; 32]> {
    Zeroizing::new(hash32(
        DOMAIN_SENDER_RECEIVER_SECRET,
        &[s_sr, enote_ephemeral_pubkey.as_bytes(), &input_context.to_bytes()],
    ))
}

/// `k_a = hash_scalar("k_a", s_ctx_sr, enote_type)`. Coinbase commitments use
/// `k_a = 1` instead and never call this.
pub fn make_commitment_mask(s_ctx_sr: &[u8; 32], enote_type: CarrotEnoteType) -> Zeroizing<Scalar> {
    Zeroizing::new(hash_scalar(
        DOMAIN_COMMITMENT_MASK,
        &[s_ctx_sr, &[enote_type.as_byte()]],
    ))
}

/// Pedersen commitment `C_a = k_a*G + a*H`.
pub fn make_amount_commitment(amount: u64, mask: &Scalar) -> EdwardsPoint {
    ED25519_BASEPOINT_TABLE * mask + Scalar::from(amount) * h_point()
}

/// The two sender-extension scalars `(k_o^g, k_o^t)`, bound to the amount
/// commitment so a tampered commitment changes the one-time address.
pub fn make_onetime_address_extensions(
    s_ctx_sr: &[u8; 32],
    amount_commitment: &[u8; 32],
) -> (Zeroizing<Scalar>, Zeroizing<Scalar>) {
    let g = hash_scalar(DOMAIN_EXTENSION_G, &[s_ctx_sr, amount_commitment]);
    let t = hash_scalar(DOMAIN_EXTENSION_T, &[s_ctx_sr, amount_commitment]);
    (Zeroizing::new(g), Zeroizing::new(t))
}

/// `Ko = K_s^j + k_o^g*G + k_o^t*T`.
pub fn make_onetime_address(
    address_spend_pubkey: &EdwardsPoint,
    extension_g: &Scalar,
    extension_t: &Scalar,
) -> EdwardsPoint {
    address_spend_pubkey + ED25519_BASEPOINT_TABLE * extension_g + extension_t * t_point()
}

/// Inverse of [`make_onetime_address`]: `K_s^j = Ko - k_o^g*G - k_o^t*T`.
pub fn recover_address_spend_pubkey(
    onetime_address: &EdwardsPoint,
    extension_g: &Scalar,
    extension_t: &Scalar,
) -> EdwardsPoint {
    onetime_address - (ED25519_BASEPOINT_TABLE * extension_g + extension_t * t_point())
}

/// `vt = hash32("vt", s_sr, input_context, Ko)[0..3]`. Keyed on the
/// pre-contextualization secret so it costs one hash per candidate enote.
pub fn make_view_tag(
    s_sr: &[u8; 32],
    input_context: &InputContext,
    onetime_address: &[u8; 32],
) -> ViewTag {
    let full = hash32(
        DOMAIN_VIEW_TAG,
        &[s_sr, &input_context.to_bytes(), onetime_address],
    );
    ViewTag([full[0], full[1], full[2]])
}

pub fn encrypt_amount(
    amount: u64,
    s_ctx_sr: &[u8; 32],
    onetime_address: &[u8; 32],
) -> EncryptedAmount {
    EncryptedAmount(xor_keystream(
        &amount.to_le_bytes(),
        DOMAIN_ENCRYPT_AMOUNT,
        &[s_ctx_sr, onetime_address],
    ))
}

pub fn decrypt_amount(
    encrypted: &EncryptedAmount,
    s_ctx_sr: &[u8; 32],
    onetime_address: &[u8; 32],
) -> u64 {
    u64::from_le_bytes(xor_keystream(
        &encrypted.0,
        DOMAIN_ENCRYPT_AMOUNT,
        &[s_ctx_sr, onetime_address],
    ))
}

pub fn encrypt_payment_id(
    payment_id: PaymentId,
    s_ctx_sr: &[u8; 32],
    onetime_address: &[u8; 32],
) -> EncryptedPaymentId {
    EncryptedPaymentId(xor_keystream(
        &payment_id.0,
        DOMAIN_ENCRYPT_PAYMENT_ID,
        &[s_ctx_sr, onetime_address],
    ))
}

pub fn decrypt_payment_id(
    encrypted: &EncryptedPaymentId,
    s_ctx_sr: &[u8; 32],
    onetime_address: &[u8; 32],
) -> PaymentId {
    PaymentId(xor_keystream(
        &encrypted.0,
        DOMAIN_ENCRYPT_PAYMENT_ID,
        &[s_ctx_sr, onetime_address],
    ))
}

pub fn encrypt_janus_anchor(
    anchor: &JanusAnchor,
    s_ctx_sr: &[u8; 32],
    onetime_address: &[u8; 32],
) -> EncryptedJanusAnchor {
    EncryptedJanusAnchor(xor_keystream(
        &anchor.0,
        DOMAIN_ENCRYPT_ANCHOR,
        &[s_ctx_sr, onetime_address],
    ))
}

pub fn decrypt_janus_anchor(
    encrypted: &EncryptedJanusAnchor,
    s_ctx_sr: &[u8; 32],
    onetime_address: &[u8; 32],
) -> JanusAnchor {
    JanusAnchor(xor_keystream(
        &encrypted.0,
        DOMAIN_ENCRYPT_ANCHOR,
        &[s_ctx_sr, onetime_address],
    ))
}

/// The anchor a special self-send carries instead of randomness:
/// `hash32("anchor_sp", D_e, input_context, Ko, k_v, K_s)[0..16]`.
/// Keyed on `k_v`, so an external scanner can recognize its own special
/// self-sends during the Janus check without any stored state.
pub fn make_special_janus_anchor(
    enote_ephemeral_pubkey: &MontgomeryPoint,
    input_context: &InputContext,
    onetime_address: &[u8; 32],
    k_view: &Scalar,
    account_spend_pubkey: &EdwardsPoint,
) -> JanusAnchor {
    let full = hash32(
        DOMAIN_SPECIAL_ANCHOR,
        &[
            enote_ephemeral_pubkey.as_bytes(),
            &input_context.to_bytes(),
            onetime_address,
            &k_view.to_bytes(),
            &account_spend_pubkey.compress().to_bytes(),
        ],
    );
    JanusAnchor(full[..16].try_into().expect("16-byte prefix"))
}
