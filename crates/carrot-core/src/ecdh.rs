//! Ephemeral keys and the X25519 key exchange behind every external enote.
//!
//! The ephemeral private key `d_e` is deterministic in the proposal's
//! randomness, so a sender can be audited: re-deriving `d_e` from the
//! decrypted anchor is exactly the receiver's Janus check. All Montgomery
//! arithmetic multiplies by plain reduced scalars; Carrot does not use
//! RFC 7748 clamping.

use curve25519_dalek::constants::X25519_BASEPOINT;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;
use zeroize::Zeroizing;

use carrot_types::{InputContext, JanusAnchor, PaymentId};

use crate::hashing::hash_scalar;

const DOMAIN_EPHEMERAL_PRIVKEY: &str = "d_e";

/// `d_e = hash_scalar("d_e", anchor, input_context, K_s^j, K_v^j, pid)`.
pub fn make_enote_ephemeral_privkey(
    randomness: &JanusAnchor,
    input_context: &InputContext,
    address_spend_pubkey: &EdwardsPoint,
    address_view_pubkey: &EdwardsPoint,
    payment_id: PaymentId,
) -> Zeroizing<Scalar> {
    Zeroizing::new(hash_scalar(
        DOMAIN_EPHEMERAL_PRIVKEY,
        &[
            &randomness.0,
            &input_context.to_bytes(),
            &address_spend_pubkey.compress().to_bytes(),
            &address_view_pubkey.compress().to_bytes(),
            &payment_id.0,
        ],
    ))
}

/// `D_e`: against the X25519 basepoint for a main address, against the
/// converted address spend key for a subaddress.
pub fn make_enote_ephemeral_pubkey(
    d_e: &Scalar,
    address_spend_pubkey: &EdwardsPoint,
    is_subaddress: bool,
) -> MontgomeryPoint {
    if is_subaddress {
        d_e * address_spend_pubkey.to_montgomery()
    } else {
        d_e * X25519_BASEPOINT
    }
}

/// Sender side of the exchange: `s_sr = 8 * d_e * ConvertPointE(K_v^j)`.
pub fn make_ecdh_shared_secret_sender(
    d_e: &Scalar,
    address_view_pubkey: &EdwardsPoint,
) -> Zeroizing<[u8; 32]> {
    let point = Scalar::from(8u64) * (d_e * address_view_pubkey.to_montgomery());
    Zeroizing::new(point.to_bytes())
}

/// Receiver side: `s_sr = 8 * k_v * D_e`. The cofactor multiplication runs
/// after `k_v` so small-order components of an adversarial `D_e` are cleared
/// identically to the sender's computation.
pub fn make_ecdh_shared_secret_receiver(
    k_view: &Scalar,
    enote_ephemeral_pubkey: &MontgomeryPoint,
) -> Zeroizing<[u8; 32]> {
    let point = Scalar::from(8u64) * (k_view * enote_ephemeral_pubkey);
    Zeroizing::new(point.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_all;
    use carrot_types::KeyImage;

    fn context() -> InputContext {
        InputContext::Rct { first_key_image: KeyImage([0xAA; 32]) }
    }

    #[test]
    fn exchange_completes_for_main_address() {
        let keys = derive_all(&[0x61u8; 32]);
        let dest = keys.make_main_address();

        let d_e = make_enote_ephemeral_privkey(
            &JanusAnchor([7u8; 16]),
            &context(),
            &dest.address_spend_pubkey,
            &dest.address_view_pubkey,
            PaymentId::ZERO,
        );
        let d_e_pub = make_enote_ephemeral_pubkey(&d_e, &dest.address_spend_pubkey, false);

        let sender = make_ecdh_shared_secret_sender(&d_e, &dest.address_view_pubkey);
        let receiver = make_ecdh_shared_secret_receiver(&keys.k_view, &d_e_pub);
        assert_eq!(*sender, *receiver);
    }

    #[test]
    fn exchange_completes_for_subaddress() {
        let keys = derive_all(&[0x62u8; 32]);
        let dest = keys.make_subaddress(3, 9);

        let d_e = make_enote_ephemeral_privkey(
            &JanusAnchor([9u8; 16]),
            &context(),
            &dest.address_spend_pubkey,
            &dest.address_view_pubkey,
            PaymentId::ZERO,
        );
        let d_e_pub = make_enote_ephemeral_pubkey(&d_e, &dest.address_spend_pubkey, true);

        let sender = make_ecdh_shared_secret_sender(&d_e, &dest.address_view_pubkey);
        let receiver = make_ecdh_shared_secret_receiver(&keys.k_view, &d_e_pub);
        assert_eq!(*sender, *receiver);
    }

    #[test]
    fn ephemeral_key_binds_every_transcript_field() {
        let keys = derive_all(&[0x63u8; 32]);
        let dest = keys.make_main_address();
        let base = make_enote_ephemeral_privkey(
            &JanusAnchor([1u8; 16]),
            &context(),
            &dest.address_spend_pubkey,
            &dest.address_view_pubkey,
            PaymentId::ZERO,
        );
        let other_anchor = make_enote_ephemeral_privkey(
            &JanusAnchor([2u8; 16]),
            &context(),
            &dest.address_spend_pubkey,
            &dest.address_view_pubkey,
            PaymentId::ZERO,
        );
        let other_pid = make_enote_ephemeral_privkey(
            &JanusAnchor([1u8; 16]),
            &context(),
            &dest.address_spend_pubkey,
            &dest.address_view_pubkey,
            PaymentId([1, 0, 0, 0, 0, 0, 0, 0]),
        );
        assert_ne!(*base, *other_anchor);
        assert_ne!(*base, *other_pid);
    }
}
