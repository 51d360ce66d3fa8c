// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Threshold decryption: each present guardian contributes a direct share of a tallied
//! ciphertext; any missing guardian's share is reconstructed from the compensated shares that
//! present guardians compute from the backups that guardian sent them during the ceremony, via
//! Lagrange interpolation at zero (`util::algebra_utils::group_lagrange_at_zero`). Below quorum,
//! decryption refuses outright rather than guessing.

use util::algebra::{FieldElement, Group, GroupElement, ScalarField};
use util::algebra_utils::group_lagrange_at_zero;

use crate::discrete_log::DiscreteLog;
use crate::el_gamal::Ciphertext;
use crate::errors::{EgError, EgResult};
use crate::zk::DecryptionProof;

/// A present guardian's direct share of a decryption, with its proof against that guardian's own
/// public key.
pub struct GuardianDecryptionShare {
    pub sequence_order: u32,
    pub public_key: GroupElement,
    pub share: GroupElement,
    pub proof: DecryptionProof,
}

impl GuardianDecryptionShare {
    pub fn verify(
        &self,
        ct: &Ciphertext,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
    ) -> EgResult<()> {
        self.proof
            .verify(ct, &self.public_key, &self.share, qbar, group, field)
    }
}

/// A present guardian's share standing in for one missing guardian, proved against the recovery
/// key `g^{P_missing(compensating_guardian)}` rather than any real public key.
pub struct GuardianCompensatedShare {
    pub compensating_guardian: u32,
    pub missing_guardian: u32,
    pub recovery_key: GroupElement,
    pub share: GroupElement,
    pub proof: DecryptionProof,
}

impl GuardianCompensatedShare {
    pub fn verify(
        &self,
        ct: &Ciphertext,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
    ) -> EgResult<()> {
        self.proof
            .verify(ct, &self.recovery_key, &self.share, qbar, group, field)
    }
}

/// Reconstructs a missing guardian's effective share from every present guardian's compensated
/// share for that guardian. `compensated_shares` must all name the same `missing_guardian` and
/// come from distinct compensating guardians.
pub fn reconstruct_missing_share(
    missing_guardian: u32,
    compensated_shares: &[GuardianCompensatedShare],
    field: &ScalarField,
    group: &Group,
) -> EgResult<GroupElement> {
    if compensated_shares
        .iter()
        .any(|c| c.missing_guardian != missing_guardian)
    {
        return Err(EgError::StateViolation(format!(
            "compensated share set mixes guardians other than {missing_guardian}"
        )));
    }

    let xs: Vec<FieldElement> = compensated_shares
        .iter()
        .map(|c| FieldElement::from(c.compensating_guardian, field))
        .collect();
    let ys: Vec<GroupElement> = compensated_shares.iter().map(|c| c.share.clone()).collect();

    group_lagrange_at_zero(&xs, &ys, field, group).ok_or_else(|| {
        tracing::warn!(missing_guardian, "lagrange reconstruction failed");
        EgError::StateViolation(format!(
            "lagrange reconstruction failed for missing guardian {missing_guardian}"
        ))
    })
}

/// Combines every present guardian's direct share with every missing guardian's reconstructed
/// share into the full decryption share `M = alpha^s`. Refuses below `k` present guardians.
pub fn combine_decryption_shares(
    direct: &[GuardianDecryptionShare],
    reconstructed_missing: &[GroupElement],
    k: u32,
    group: &Group,
) -> EgResult<GroupElement> {
    if (direct.len() as u32) < k {
        tracing::warn!(k, present = direct.len() as u32, "insufficient quorum for decryption");
        return Err(EgError::InsufficientQuorum {
            k,
            present: direct.len() as u32,
        });
    }

    let mut m = Group::one();
    for share in direct {
        m = m.mul(&share.share, group);
    }
    for share in reconstructed_missing {
        m = m.mul(share, group);
    }
    tracing::info!(
        present = direct.len(),
        reconstructed = reconstructed_missing.len(),
        "decryption shares combined"
    );
    Ok(m)
}

/// Recovers the plaintext `t` such that `beta = M * g^t`, given the combined decryption share
/// `M = alpha^s`.
pub fn decrypt_with_combined_share(
    ct: &Ciphertext,
    combined_share: &GroupElement,
    group: &Group,
    dlog: &DiscreteLog,
    max_m: u64,
) -> Option<u64> {
    let inv = combined_share.inv(group)?;
    let g_m = ct.beta.mul(&inv, group);
    dlog.find(&g_m, group, max_m)
}
