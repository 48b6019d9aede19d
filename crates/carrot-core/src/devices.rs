//! Key-holding devices.
//!
//! The core never owns long-term secrets. Anything that needs `k_v` or
//! `s_vb` goes through one of these traits, taken by borrowed reference per
//! call, so a hardware wallet (or a test fixture) can sit on the other side.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use carrot_types::{InputContext, JanusAnchor};

use crate::ecdh::make_ecdh_shared_secret_receiver;
use crate::enote_utils::make_special_janus_anchor;

/// Holder of the incoming view key `k_v`.
pub trait ViewIncomingDevice {
    /// `k_v * P` on Ed25519.
    fn view_key_scalar_mult_ed25519(&self, point: &EdwardsPoint) -> EdwardsPoint;

    /// `8 * k_v * D` on Curve25519: the receiver side of the enote ECDH.
    fn view_key_scalar_mult_x25519(&self, point: &MontgomeryPoint) -> Zeroizing<[u8; 32]>;

    /// The `"anchor_sp"` hash, which mixes `k_v` into its transcript.
    fn make_special_janus_anchor(
        &self,
        enote_ephemeral_pubkey: &MontgomeryPoint,
        input_context: &InputContext,
        onetime_address: &[u8; 32],
        account_spend_pubkey: &EdwardsPoint,
    ) -> JanusAnchor;
}

/// Holder of the view-balance secret `s_vb`.
pub trait ViewBalanceDevice {
    /// The uncontextualized shared secret of internal enotes.
    fn internal_shared_secret(&self) -> Zeroizing<[u8; 32]>;
}

/// Software implementation of [`ViewIncomingDevice`] over an in-memory key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ViewIncomingKeyRam {
    k_view: Scalar,
}

impl ViewIncomingKeyRam {
    pub fn new(k_view: Scalar) -> Self {
        ViewIncomingKeyRam { k_view }
    }
}

impl ViewIncomingDevice for ViewIncomingKeyRam {
    fn view_key_scalar_mult_ed25519(&self, point: &EdwardsPoint) -> EdwardsPoint {
        self.k_view * point
    }

    fn view_key_scalar_mult_x25519(&self, point: &MontgomeryPoint) -> Zeroizing<[u8; 32]> {
        make_ecdh_shared_secret_receiver(&self.k_view, point)
    }

    fn make_special_janus_anchor(
        &self,
        enote_ephemeral_pubkey: &MontgomeryPoint,
        input_context: &InputContext,
        onetime_address: &[u8; 32],
        account_spend_pubkey: &EdwardsPoint,
    ) -> JanusAnchor {
        make_special_janus_anchor(
            enote_ephemeral_pubkey,
            input_context,
            onetime_address,
            &self.k_view,
            account_spend_pubkey,
        )
    }
}

/// Software implementation of [`ViewBalanceDevice`] over an in-memory secret.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ViewBalanceSecretRam {
    s_view_balance: [u8; 32],
}

impl ViewBalanceSecretRam {
    pub fn new(s_view_balance: [u8; 32]) -> Self {
        ViewBalanceSecretRam { s_view_balance }
    }
}

impl ViewBalanceDevice for ViewBalanceSecretRam {
    fn internal_shared_secret(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.s_view_balance)
    }
}
