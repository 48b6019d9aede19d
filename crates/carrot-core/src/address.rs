//! Address derivation: main, subaddress, and integrated destinations.
//!
//! The subaddress construction keeps `K_v^j = k_v * K_s^j` with the one
//! account-wide `k_v`, which is what makes scanning index-independent: the
//! receiver never needs to know `j` to complete the ECDH, only to look the
//! recovered spend key up afterwards.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use zeroize::Zeroizing;

use carrot_types::PaymentId;

use crate::hashing::hash_scalar;
use crate::CarrotError;

const DOMAIN_SUBADDRESS_GENERATOR: &str = "Carrot subaddr m";
const DOMAIN_SUBADDRESS_SCALAR: &str = "Carrot subaddr d";

/// A send destination: address keys plus routing metadata.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CarrotDestinationV1 {
    /// `K_s^j`.
    pub address_spend_pubkey: EdwardsPoint,
    /// `K_v^j`.
    pub address_view_pubkey: EdwardsPoint,
    pub is_subaddress: bool,
    /// Zero unless this is an integrated address.
    pub payment_id: PaymentId,
}

/// `m = hash_scalar("Carrot subaddr m", s_ga, j_major, j_minor)`, the
/// per-index extension generator.
pub fn make_index_extension_generator(
    s_generate_address: &[u8; 32],
    j_major: u32,
    j_minor: u32,
) -> Zeroizing<Scalar> {
    Zeroizing::new(hash_scalar(
        DOMAIN_SUBADDRESS_GENERATOR,
        &[s_generate_address, &j_major.to_le_bytes(), &j_minor.to_le_bytes()],
    ))
}

/// `d = hash_scalar("Carrot subaddr d", K_s, m, j_major, j_minor)`, the
/// scalar with `K_s^j = d * K_s`. Index (0, 0) has `d = 1` by definition.
pub fn make_subaddress_scalar(
    s_generate_address: &[u8; 32],
    account_spend_pubkey: &EdwardsPoint,
    j_major: u32,
    j_minor: u32,
) -> Zeroizing<Scalar> {
    if j_major == 0 && j_minor == 0 {
        return Zeroizing::new(Scalar::ONE);
    }
    let generator = make_index_extension_generator(s_generate_address, j_major, j_minor);
    Zeroizing::new(hash_scalar(
        DOMAIN_SUBADDRESS_SCALAR,
        &[
            &account_spend_pubkey.compress().to_bytes(),
            &generator.to_bytes(),
            &j_major.to_le_bytes(),
            &j_minor.to_le_bytes(),
        ],
    ))
}

pub fn make_main_address(
    account_spend_pubkey: &EdwardsPoint,
    main_address_view_pubkey: &EdwardsPoint,
) -> CarrotDestinationV1 {
    CarrotDestinationV1 {
        address_spend_pubkey: *account_spend_pubkey,
        address_view_pubkey: *main_address_view_pubkey,
        is_subaddress: false,
        payment_id: PaymentId::ZERO,
    }
}

/// Build the destination for index `(j_major, j_minor)`. Index (0, 0) is the
/// main address, with the main view pubkey `k_v*G` rather than `k_v*K_s`.
pub fn make_subaddress(
    s_generate_address: &[u8; 32],
    k_view: &Scalar,
    account_spend_pubkey: &EdwardsPoint,
    main_address_view_pubkey: &EdwardsPoint,
    j_major: u32,
    j_minor: u32,
) -> CarrotDestinationV1 {
    if j_major == 0 && j_minor == 0 {
        return make_main_address(account_spend_pubkey, main_address_view_pubkey);
    }
    let d = make_subaddress_scalar(s_generate_address, account_spend_pubkey, j_major, j_minor);
    let address_spend_pubkey = *d * account_spend_pubkey;
    let address_view_pubkey = k_view * address_spend_pubkey;
    CarrotDestinationV1 {
        address_spend_pubkey,
        address_view_pubkey,
        is_subaddress: true,
        payment_id: PaymentId::ZERO,
    }
}

/// Main-address keys carrying a nonzero payment id.
pub fn make_integrated_address(
    account_spend_pubkey: &EdwardsPoint,
    main_address_view_pubkey: &EdwardsPoint,
    payment_id: PaymentId,
) -> Result<CarrotDestinationV1, CarrotError> {
    if payment_id.is_zero() {
        return Err(CarrotError::InvalidProposal(
            "integrated address requires a nonzero payment id".into(),
        ));
    }
    Ok(CarrotDestinationV1 {
        address_spend_pubkey: *account_spend_pubkey,
        address_view_pubkey: *main_address_view_pubkey,
        is_subaddress: false,
        payment_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_all;

    #[test]
    fn index_zero_is_the_main_address() {
        let keys = derive_all(&[0x10u8; 32]);
        let main = keys.make_main_address();
        let sub00 = keys.make_subaddress(0, 0);
        assert_eq!(main, sub00);
        assert!(!main.is_subaddress);
        assert_eq!(main.address_view_pubkey, keys.main_address_view_pubkey);
    }

    #[test]
    fn subaddress_view_key_uses_the_account_view_scalar() {
        let keys = derive_all(&[0x20u8; 32]);
        let sub = keys.make_subaddress(7, 3);
        assert!(sub.is_subaddress);
        assert_eq!(sub.address_view_pubkey, keys.k_view * sub.address_spend_pubkey);
    }

    #[test]
    fn subaddress_spend_key_is_d_times_account_key() {
        let keys = derive_all(&[0x30u8; 32]);
        let sub = keys.make_subaddress(7, 3);
        let d = make_subaddress_scalar(
            &keys.s_generate_address,
            &keys.account_spend_pubkey,
            7,
            3,
        );
        assert_eq!(sub.address_spend_pubkey, *d * keys.account_spend_pubkey);
    }

    #[test]
    fn distinct_indices_give_distinct_addresses() {
        let keys = derive_all(&[0x40u8; 32]);
        let a = keys.make_subaddress(1, 0);
        let b = keys.make_subaddress(0, 1);
        let c = keys.make_subaddress(1, 1);
        assert_ne!(a.address_spend_pubkey, b.address_spend_pubkey);
        assert_ne!(a.address_spend_pubkey, c.address_spend_pubkey);
        assert_ne!(b.address_spend_pubkey, c.address_spend_pubkey);
    }

    #[test]
    fn integrated_address_requires_nonzero_pid() {
        let keys = derive_all(&[0x50u8; 32]);
        assert!(keys.make_integrated_address(PaymentId::ZERO).is_err());

        let pid = PaymentId([0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE]);
        let integrated = keys.make_integrated_address(pid).unwrap();
        assert_eq!(integrated.payment_id, pid);
        assert!(!integrated.is_subaddress);
        assert_eq!(
            integrated.address_spend_pubkey,
            keys.make_main_address().address_spend_pubkey
        );
    }
}
