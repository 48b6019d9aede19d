//! The Carrot key hierarchy.
//!
//! Every secret is a domain-separated hash of its parent, rooted at the
//! 32-byte master seed:
//!
//! ```text
//! s_master ─┬─ k_ps  = hash_scalar("Carrot prove-spend key", s_master)
//!           └─ s_vb  = hash32("Carrot view-balance secret", s_master)
//!                 ├─ k_gi = hash_scalar("Carrot generate-image key", s_vb)
//!                 ├─ k_v  = hash_scalar("Carrot incoming view key", s_vb)
//!                 └─ s_ga = hash32("Carrot generate-address secret", s_vb)
//! K_s = k_gi*G + k_ps*T      K_v = k_v*K_s      K_v_main = k_v*G
//! ```
//!
//! The tree is a total function of the seed and reproducible byte for byte.
//! Secret containers wipe their storage when dropped.

use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use zeroize::{Zeroize, ZeroizeOnDrop};

use carrot_types::PaymentId;

use crate::address::{self, CarrotDestinationV1};
use crate::generators::t_point;
use crate::hashing::{hash32, hash_scalar};
use crate::CarrotError;

const DOMAIN_PROVE_SPEND_KEY: &str = "Carrot prove-spend key";
const DOMAIN_VIEW_BALANCE_SECRET: &str = "Carrot view-balance secret";
const DOMAIN_GENERATE_IMAGE_KEY: &str = "Carrot generate-image key";
const DOMAIN_INCOMING_VIEW_KEY: &str = "Carrot incoming view key";
const DOMAIN_GENERATE_ADDRESS_SECRET: &str = "Carrot generate-address secret";

/// The full secret tree of an account, as derived from the master seed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CarrotAccountSecrets {
    /// `k_ps`, scales `T` in the account spend key.
    pub k_prove_spend: Scalar,
    /// `s_vb`, root of the view-balance tier.
    pub s_view_balance: [u8; 32],
    /// `k_gi`, scales `G` in the account spend key.
    pub k_generate_image: Scalar,
    /// `k_v`, the incoming view key.
    pub k_view: Scalar,
    /// `s_ga`, seeds subaddress index generators.
    pub s_generate_address: [u8; 32],
    /// `K_s = k_gi*G + k_ps*T`.
    pub account_spend_pubkey: EdwardsPoint,
    /// `K_v = k_v*K_s`.
    pub account_view_pubkey: EdwardsPoint,
    /// `K_v_main = k_v*G`.
    pub main_address_view_pubkey: EdwardsPoint,
}

/// The view-balance tier: everything derivable without the prove-spend key.
/// This is what a view-only wallet holds.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CarrotViewBalanceSecrets {
    pub s_view_balance: [u8; 32],
    pub k_generate_image: Scalar,
    pub k_view: Scalar,
    pub s_generate_address: [u8; 32],
    pub account_spend_pubkey: EdwardsPoint,
    pub account_view_pubkey: EdwardsPoint,
    pub main_address_view_pubkey: EdwardsPoint,
}

/// Derive the whole hierarchy from the master seed.
pub fn derive_all(s_master: &[u8; 32]) -> CarrotAccountSecrets {
    let k_prove_spend = hash_scalar(DOMAIN_PROVE_SPEND_KEY, &[s_master]);
    let s_view_balance = hash32(DOMAIN_VIEW_BALANCE_SECRET, &[s_master]);
    let k_generate_image = hash_scalar(DOMAIN_GENERATE_IMAGE_KEY, &[&s_view_balance]);
    let k_view = hash_scalar(DOMAIN_INCOMING_VIEW_KEY, &[&s_view_balance]);
    let s_generate_address = hash32(DOMAIN_GENERATE_ADDRESS_SECRET, &[&s_view_balance]);

    let account_spend_pubkey =
        ED25519_BASEPOINT_TABLE * &k_generate_image + k_prove_spend * t_point();
    let account_view_pubkey = k_view * account_spend_pubkey;
    let main_address_view_pubkey = ED25519_BASEPOINT_TABLE * &k_view;

    CarrotAccountSecrets {
        k_prove_spend,
        s_view_balance,
        k_generate_image,
        k_view,
        s_generate_address,
        account_spend_pubkey,
        account_view_pubkey,
        main_address_view_pubkey,
    }
}

/// Derive the view-balance tier from `s_vb` and the account spend pubkey.
/// `K_s` cannot be recomputed without `k_ps`, so it is taken as given.
pub fn derive_view_balance(
    s_view_balance: &[u8; 32],
    account_spend_pubkey: &EdwardsPoint,
) -> CarrotViewBalanceSecrets {
    let k_generate_image = hash_scalar(DOMAIN_GENERATE_IMAGE_KEY, &[s_view_balance]);
    let k_view = hash_scalar(DOMAIN_INCOMING_VIEW_KEY, &[s_view_balance]);
    let s_generate_address = hash32(DOMAIN_GENERATE_ADDRESS_SECRET, &[s_view_balance]);

    CarrotViewBalanceSecrets {
        s_view_balance: *s_view_balance,
        k_generate_image,
        k_view,
        s_generate_address,
        account_spend_pubkey: *account_spend_pubkey,
        account_view_pubkey: k_view * account_spend_pubkey,
        main_address_view_pubkey: ED25519_BASEPOINT_TABLE * &k_view,
    }
}

impl CarrotAccountSecrets {
    pub fn make_main_address(&self) -> CarrotDestinationV1 {
        address::make_main_address(&self.account_spend_pubkey, &self.main_address_view_pubkey)
    }

    pub fn make_subaddress(&self, j_major: u32, j_minor: u32) -> CarrotDestinationV1 {
        address::make_subaddress(
            &self.s_generate_address,
            &self.k_view,
            &self.account_spend_pubkey,
            &self.main_address_view_pubkey,
            j_major,
            j_minor,
        )
    }

    pub fn make_integrated_address(
        &self,
        payment_id: PaymentId,
    ) -> Result<CarrotDestinationV1, CarrotError> {
        address::make_integrated_address(
            &self.account_spend_pubkey,
            &self.main_address_view_pubkey,
            payment_id,
        )
    }
}

impl CarrotViewBalanceSecrets {
    pub fn make_main_address(&self) -> CarrotDestinationV1 {
        address::make_main_address(&self.account_spend_pubkey, &self.main_address_view_pubkey)
    }

    pub fn make_subaddress(&self, j_major: u32, j_minor: u32) -> CarrotDestinationV1 {
        address::make_subaddress(
            &self.s_generate_address,
            &self.k_view,
            &self.account_spend_pubkey,
            &self.main_address_view_pubkey,
            j_major,
            j_minor,
        )
    }

    pub fn make_integrated_address(
        &self,
        payment_id: PaymentId,
    ) -> Result<CarrotDestinationV1, CarrotError> {
        address::make_integrated_address(
            &self.account_spend_pubkey,
            &self.main_address_view_pubkey,
            payment_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let seed = [0x42u8; 32];
        let a = derive_all(&seed);
        let b = derive_all(&seed);
        assert_eq!(a.k_prove_spend, b.k_prove_spend);
        assert_eq!(a.s_view_balance, b.s_view_balance);
        assert_eq!(a.account_spend_pubkey, b.account_spend_pubkey);
    }

    #[test]
    fn secrets_are_pairwise_distinct() {
        let keys = derive_all(&[0x01u8; 32]);
        let all: [[u8; 32]; 5] = [
            keys.k_prove_spend.to_bytes(),
            keys.s_view_balance,
            keys.k_generate_image.to_bytes(),
            keys.k_view.to_bytes(),
            keys.s_generate_address,
        ];
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j], "secrets {i} and {j} collide");
            }
        }
    }

    #[test]
    fn spend_key_opens_under_both_generators() {
        let keys = derive_all(&[0x55u8; 32]);
        let expected =
            ED25519_BASEPOINT_TABLE * &keys.k_generate_image + keys.k_prove_spend * t_point();
        assert_eq!(keys.account_spend_pubkey, expected);
    }

    #[test]
    fn view_pubkeys_relate_through_k_view() {
        let keys = derive_all(&[0x77u8; 32]);
        assert_eq!(keys.account_view_pubkey, keys.k_view * keys.account_spend_pubkey);
        assert_eq!(keys.main_address_view_pubkey, ED25519_BASEPOINT_TABLE * &keys.k_view);
    }

    #[test]
    fn view_balance_tier_matches_full_derivation() {
        let seed = [0x99u8; 32];
        let full = derive_all(&seed);
        let view = derive_view_balance(&full.s_view_balance, &full.account_spend_pubkey);

        assert_eq!(view.k_generate_image, full.k_generate_image);
        assert_eq!(view.k_view, full.k_view);
        assert_eq!(view.s_generate_address, full.s_generate_address);
        assert_eq!(view.account_view_pubkey, full.account_view_pubkey);
        assert_eq!(view.main_address_view_pubkey, full.main_address_view_pubkey);
    }
}
