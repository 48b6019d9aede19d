//! Spend-authority proof: Schnorr knowledge of `(x, y)` with `K = xG + yT`.
//!
//! Dual-generator variant of the classic scheme. The challenge binds both
//! commitments and the key; verification recomputes it, so a proof cannot be
//! replayed against a different key.

use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;
use zeroize::Zeroizing;

use crate::generators::t_point;
use crate::hashing::hash_scalar;
use crate::random::random_scalar;

const DOMAIN_SPEND_AUTHORITY: &str = "ZKP";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SpendAuthorityProof {
    /// `R_G = r1*G`.
    pub commitment_g: EdwardsPoint,
    /// `R_T = r2*T`.
    pub commitment_t: EdwardsPoint,
    /// `c = hash_scalar("ZKP", R_G, R_T, K)`.
    pub challenge: Scalar,
    /// `z1 = r1 + c*x`.
    pub response_g: Scalar,
    /// `z2 = r2 + c*y`.
    pub response_t: Scalar,
}

fn challenge_for(
    commitment_g: &EdwardsPoint,
    commitment_t: &EdwardsPoint,
    key: &EdwardsPoint,
) -> Scalar {
    hash_scalar(
        DOMAIN_SPEND_AUTHORITY,
        &[
            &commitment_g.compress().to_bytes(),
            &commitment_t.compress().to_bytes(),
            &key.compress().to_bytes(),
        ],
    )
}

/// Prove knowledge of the opening `(x, y)` of `K = xG + yT`.
pub fn make_carrot_spend_authority_proof(x: &Scalar, y: &Scalar) -> SpendAuthorityProof {
    let r1 = Zeroizing::new(random_scalar());
    let r2 = Zeroizing::new(random_scalar());
    let commitment_g = ED25519_BASEPOINT_TABLE * &*r1;
    let commitment_t = *r2 * t_point();

    let key = ED25519_BASEPOINT_TABLE * x + y * t_point();
    let challenge = challenge_for(&commitment_g, &commitment_t, &key);

    SpendAuthorityProof {
        commitment_g,
        commitment_t,
        challenge,
        response_g: *r1 + challenge * x,
        response_t: *r2 + challenge * y,
    }
}

/// Verify a proof against `K`. The carried challenge must equal the
/// recomputed one, and the recomputed one drives the point equation:
/// `z1*G + z2*T - c'*K == R_G + R_T`.
pub fn verify_carrot_spend_authority_proof(
    proof: &SpendAuthorityProof,
    key: &EdwardsPoint,
) -> bool {
    let challenge = challenge_for(&proof.commitment_g, &proof.commitment_t, key);
    if challenge != proof.challenge {
        return false;
    }

    let lhs = EdwardsPoint::vartime_multiscalar_mul(
        &[proof.response_g, proof.response_t, -challenge],
        &[
            curve25519_dalek::constants::ED25519_BASEPOINT_POINT,
            t_point(),
            *key,
        ],
    );
    lhs == proof.commitment_g + proof.commitment_t
}
