// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Guardian secret-sharing polynomials.
//!
//! Each guardian `i` samples a random polynomial `P_i` of degree `k-1` over `Z_q`, publishes a
//! Schnorr-proven commitment to every coefficient, and sends every other guardian `l` the backup
//! value `P_i(l)`. A recipient can verify a backup against the sender's public commitments without
//! learning any other guardian's backup, and without the sender having to keep the polynomial
//! around after the key ceremony completes.

use serde::{Deserialize, Serialize};
use util::algebra::{FieldElement, Group, GroupElement, ScalarField};
use util::algebra_utils::{field_lagrange_at_zero, group_lagrange_at_zero};
use util::csprng::Csprng;

use crate::errors::{EgError, EgResult, ProofKind};
use crate::hash::{hash_elems, HashInput};
use crate::zk::SchnorrProof;

/// A guardian's secret polynomial `P(x) = a_0 + a_1 x + ... + a_{k-1} x^{k-1}`.
///
/// `a_0` is the guardian's share of the election secret key; every other coefficient exists only
/// to let a quorum of guardians reconstruct `a_0` via Lagrange interpolation.
pub struct SecretPolynomial {
    coefficients: Vec<FieldElement>,
}

impl SecretPolynomial {
    /// Samples a new random polynomial of degree `k - 1`.
    pub fn generate(k: u32, field: &ScalarField, csprng: &mut Csprng) -> Self {
        let coefficients = (0..k).map(|_| field.random_field_elem(csprng)).collect();
        SecretPolynomial { coefficients }
    }

    /// The constant term, i.e. this guardian's contribution to the joint secret key.
    pub fn secret_coefficient(&self) -> &FieldElement {
        &self.coefficients[0]
    }

    /// Evaluates `P(x)` at a guardian sequence number `x` (which is never zero).
    pub fn value_at(&self, x: u32, field: &ScalarField) -> FieldElement {
        let x_fe = FieldElement::from(x, field);
        let mut acc = ScalarField::zero();
        for coeff in self.coefficients.iter().rev() {
            acc = acc.mul(&x_fe, field).add(coeff, field);
        }
        acc
    }

    /// Publishes `g^{a_j}` and a Schnorr proof of knowledge of `a_j`, for every coefficient `j`.
    pub fn commit(
        &self,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
        csprng: &mut Csprng,
    ) -> CoefficientCommitments {
        let commitments = self
            .coefficients
            .iter()
            .map(|a_j| {
                let k_j = group.g_exp(a_j);
                let proof = SchnorrProof::prove(a_j, &k_j, qbar, group, field, csprng);
                CommittedCoefficient {
                    commitment: k_j,
                    proof,
                }
            })
            .collect();
        CoefficientCommitments { commitments }
    }
}

/// One published coefficient commitment plus its Schnorr proof of knowledge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommittedCoefficient {
    pub commitment: GroupElement,
    pub proof: SchnorrProof,
}

/// The public commitments a guardian publishes for its secret polynomial.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoefficientCommitments {
    pub commitments: Vec<CommittedCoefficient>,
}

impl CoefficientCommitments {
    pub fn degree(&self) -> usize {
        self.commitments.len()
    }

    /// `g^{a_0}`, this guardian's public-key contribution.
    pub fn public_key(&self) -> EgResult<&GroupElement> {
        self.commitments
            .first()
            .map(|c| &c.commitment)
            .ok_or_else(|| EgError::InvalidManifest("polynomial has no coefficients".to_string()))
    }

    /// Verifies every coefficient's Schnorr proof against its own commitment.
    pub fn verify_self_consistent(
        &self,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
    ) -> EgResult<()> {
        for c in &self.commitments {
            c.proof.verify(&c.commitment, qbar, group, field)?;
        }
        Ok(())
    }

    /// Checks `g^{P(l)} == prod_j K_j^{l^j}` for a backup value `p_l = P(l)` claimed to come from
    /// the polynomial committed to here.
    pub fn verify_backup(
        &self,
        l: u32,
        p_l: &FieldElement,
        group: &Group,
        field: &ScalarField,
    ) -> bool {
        let l_fe = FieldElement::from(l, field);
        let mut l_pow = ScalarField::one();
        let mut rhs = Group::one();
        for c in &self.commitments {
            rhs = rhs.mul(&c.commitment.exp(&l_pow, group), group);
            l_pow = l_pow.mul(&l_fe, field);
        }
        group.g_exp(p_l) == rhs
    }

    /// A canonical hash of this guardian's commitments, folded into the joint-key commitment hash.
    pub fn commitment_hash(&self, field: &ScalarField) -> FieldElement {
        let items: Vec<HashInput<'_>> = self
            .commitments
            .iter()
            .map(|c| HashInput::GroupElem(&c.commitment))
            .collect();
        hash_elems(field, &[HashInput::Seq(items)])
    }
}

/// A guardian's share `P_i(l)` of its secret, destined for guardian `l`, together with a proof of
/// knowledge so the full key ceremony audit can verify it was computed honestly.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backup {
    pub recipient: u32,
    pub value: FieldElement,
}

/// Reconstructs the secret at `x = 0` from `k` distinct `(guardian index, backup value)` pairs.
pub fn reconstruct_secret(
    nodes: &[(u32, FieldElement)],
    field: &ScalarField,
) -> Option<FieldElement> {
    let xs: Vec<FieldElement> = nodes
        .iter()
        .map(|(i, _)| FieldElement::from(*i, field))
        .collect();
    let ys: Vec<FieldElement> = nodes.iter().map(|(_, y)| y.clone()).collect();
    field_lagrange_at_zero(&xs, &ys, field)
}

/// Reconstructs `g^{secret}` in the exponent, for compensated decryption: the mediator never
/// needs to see a guardian's raw secret to cover for a missing guardian.
pub fn reconstruct_secret_in_exponent(
    nodes: &[(u32, GroupElement)],
    field: &ScalarField,
    group: &Group,
) -> Option<GroupElement> {
    let xs: Vec<FieldElement> = nodes
        .iter()
        .map(|(i, _)| FieldElement::from(*i, field))
        .collect();
    let ys: Vec<GroupElement> = nodes.iter().map(|(_, y)| y.clone()).collect();
    group_lagrange_at_zero(&xs, &ys, field, group)
}
