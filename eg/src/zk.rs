// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Non-interactive zero-knowledge proofs: Schnorr, disjunctive and constant Chaum-Pedersen, and
//! the guardian decryption-share proof.
//!
//! Every challenge folds in `qbar`, the crypto-extended-base-hash, as the Fiat-Shamir domain
//! separator, so a proof built for one election context can never verify under another. Every
//! verifier checks subgroup membership of every claimed group element before any further
//! algebra, per the invariant that ends section 4.5.

use serde::{Deserialize, Serialize};
use util::algebra::{FieldElement, Group, GroupElement, ScalarField};
use util::csprng::Csprng;

use crate::el_gamal::Ciphertext;
use crate::errors::{EgError, EgResult, ProofKind};
use crate::hash::{hash_elems, HashInput};

fn in_subgroup(e: &GroupElement, group: &Group) -> bool {
    e.is_valid(group)
}

/// Proof of knowledge of `s` such that `k = g^s`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchnorrProof {
    pub commitment: GroupElement, // h = g^r
    pub response: FieldElement,   // u = r + c*s
}

impl SchnorrProof {
    pub fn prove(
        s: &FieldElement,
        k: &GroupElement,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
        csprng: &mut Csprng,
    ) -> Self {
        let r = field.random_field_elem(csprng);
        let h = group.g_exp(&r);
        let c = hash_elems(
            field,
            &[
                HashInput::Scalar(qbar),
                HashInput::GroupElem(k),
                HashInput::GroupElem(&h),
            ],
        );
        let u = r.add(&c.mul(s, field), field);
        SchnorrProof {
            commitment: h,
            response: u,
        }
    }

    pub fn verify(
        &self,
        k: &GroupElement,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
    ) -> EgResult<()> {
        if !in_subgroup(k, group) || !in_subgroup(&self.commitment, group) {
            return Err(EgError::NotInSubgroup {
                what: "schnorr proof key/commitment",
            });
        }
        let c = hash_elems(
            field,
            &[
                HashInput::Scalar(qbar),
                HashInput::GroupElem(k),
                HashInput::GroupElem(&self.commitment),
            ],
        );
        let lhs = group.g_exp(&self.response);
        let rhs = self.commitment.mul(&k.pow(c.value().clone(), group), group);
        if lhs == rhs {
            Ok(())
        } else {
            Err(EgError::InvalidProof {
                proof: ProofKind::Schnorr,
                object_id: String::new(),
            })
        }
    }
}

/// One branch of a [`DisjunctiveChaumPedersenProof`]: a Chaum-Pedersen commitment/response pair
/// proving the ciphertext encrypts a specific claimed bit value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CpBranch {
    pub a: GroupElement,
    pub b: GroupElement,
    pub challenge: FieldElement,
    pub response: FieldElement,
}

/// Proof that an ElGamal ciphertext encrypts `0` or `1`, without revealing which.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisjunctiveChaumPedersenProof {
    pub branch0: CpBranch,
    pub branch1: CpBranch,
}

impl DisjunctiveChaumPedersenProof {
    /// `v` is the actual plaintext (`0` or `1`); `r` is the ciphertext's encryption nonce.
    pub fn prove(
        ct: &Ciphertext,
        v: u8,
        r: &FieldElement,
        k: &GroupElement,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
        csprng: &mut Csprng,
    ) -> Self {
        debug_assert!(v == 0 || v == 1);

        let u_real = field.random_field_elem(csprng);
        let c_sim = field.random_field_elem(csprng);
        let u_sim = field.random_field_elem(csprng);

        // Simulated branch for the value NOT taken.
        let sim_value = 1 - v;
        let g_sim_value = group.generator().pow(sim_value as u32, group);
        let beta_over_g_sim = ct.beta.mul(
            &g_sim_value
                .inv(group)
                .unwrap_or_else(Group::one),
            group,
        );
        let a_sim = group
            .g_exp(&u_sim)
            .mul(&ct.alpha.pow(c_sim.value().clone(), group).inv(group).unwrap_or_else(Group::one), group);
        let b_sim = k
            .exp(&u_sim, group)
            .mul(
                &beta_over_g_sim
                    .pow(c_sim.value().clone(), group)
                    .inv(group)
                    .unwrap_or_else(Group::one),
                group,
            );

        let a_real = group.g_exp(&u_real);
        let b_real = k.exp(&u_real, group);

        let (a0, b0, a1, b1) = if v == 0 {
            (a_real.clone(), b_real.clone(), a_sim.clone(), b_sim.clone())
        } else {
            (a_sim.clone(), b_sim.clone(), a_real.clone(), b_real.clone())
        };

        let c = hash_elems(
            field,
            &[
                HashInput::Scalar(qbar),
                HashInput::GroupElem(&ct.alpha),
                HashInput::GroupElem(&ct.beta),
                HashInput::GroupElem(&a0),
                HashInput::GroupElem(&b0),
                HashInput::GroupElem(&a1),
                HashInput::GroupElem(&b1),
            ],
        );
        let c_real = c.sub(&c_sim, field);
        let u_combined = u_real.add(&c_real.mul(r, field), field);

        let real_branch = CpBranch {
            a: a_real,
            b: b_real,
            challenge: c_real,
            response: u_combined,
        };
        let sim_branch = CpBranch {
            a: a_sim,
            b: b_sim,
            challenge: c_sim,
            response: u_sim,
        };

        if v == 0 {
            DisjunctiveChaumPedersenProof {
                branch0: real_branch,
                branch1: sim_branch,
            }
        } else {
            DisjunctiveChaumPedersenProof {
                branch0: sim_branch,
                branch1: real_branch,
            }
        }
    }

    pub fn verify(
        &self,
        ct: &Ciphertext,
        k: &GroupElement,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
    ) -> EgResult<()> {
        if !in_subgroup(&ct.alpha, group) || !in_subgroup(&ct.beta, group) {
            return Err(EgError::NotInSubgroup {
                what: "disjunctive chaum-pedersen ciphertext",
            });
        }

        let c = hash_elems(
            field,
            &[
                HashInput::Scalar(qbar),
                HashInput::GroupElem(&ct.alpha),
                HashInput::GroupElem(&ct.beta),
                HashInput::GroupElem(&self.branch0.a),
                HashInput::GroupElem(&self.branch0.b),
                HashInput::GroupElem(&self.branch1.a),
                HashInput::GroupElem(&self.branch1.b),
            ],
        );

        let challenge_sum_ok = self.branch0.challenge.add(&self.branch1.challenge, field) == c;

        let branch_ok = |branch: &CpBranch, value: u32| -> bool {
            let lhs_a = group.g_exp(&branch.response);
            let rhs_a = branch
                .a
                .mul(&ct.alpha.pow(branch.challenge.value().clone(), group), group);

            let g_value = group.generator().pow(value, group);
            let beta_over_g = ct
                .beta
                .mul(&g_value.inv(group).unwrap_or_else(Group::one), group);
            let lhs_b = k.exp(&branch.response, group);
            let rhs_b = branch
                .b
                .mul(&beta_over_g.pow(branch.challenge.value().clone(), group), group);

            lhs_a == rhs_a && lhs_b == rhs_b
        };

        if challenge_sum_ok && branch_ok(&self.branch0, 0) && branch_ok(&self.branch1, 1) {
            Ok(())
        } else {
            Err(EgError::InvalidProof {
                proof: ProofKind::DisjunctiveChaumPedersen,
                object_id: String::new(),
            })
        }
    }
}

/// Proof that `(alpha, beta)` encrypts a specific known constant `n` under public key `k`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstantChaumPedersenProof {
    pub a: GroupElement,
    pub b: GroupElement,
    pub response: FieldElement,
}

impl ConstantChaumPedersenProof {
    pub fn prove(
        ct: &Ciphertext,
        r_aggregate: &FieldElement,
        k: &GroupElement,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
        csprng: &mut Csprng,
    ) -> Self {
        let r = field.random_field_elem(csprng);
        let a = group.g_exp(&r);
        let b = k.exp(&r, group);
        let c = hash_elems(
            field,
            &[
                HashInput::Scalar(qbar),
                HashInput::GroupElem(&ct.alpha),
                HashInput::GroupElem(&ct.beta),
                HashInput::GroupElem(&a),
                HashInput::GroupElem(&b),
            ],
        );
        let u = r.add(&c.mul(r_aggregate, field), field);
        ConstantChaumPedersenProof { a, b, response: u }
    }

    pub fn verify(
        &self,
        ct: &Ciphertext,
        n: u32,
        k: &GroupElement,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
    ) -> EgResult<()> {
        if !in_subgroup(&ct.alpha, group) || !in_subgroup(&ct.beta, group) {
            return Err(EgError::NotInSubgroup {
                what: "constant chaum-pedersen ciphertext",
            });
        }

        let c = hash_elems(
            field,
            &[
                HashInput::Scalar(qbar),
                HashInput::GroupElem(&ct.alpha),
                HashInput::GroupElem(&ct.beta),
                HashInput::GroupElem(&self.a),
                HashInput::GroupElem(&self.b),
            ],
        );

        let lhs1 = group.g_exp(&self.response);
        let rhs1 = self.a.mul(&ct.alpha.pow(c.value().clone(), group), group);

        let g_n = group.generator().pow(n, group);
        let beta_over_g_n = ct.beta.mul(&g_n.inv(group).unwrap_or_else(Group::one), group);
        let lhs2 = k.exp(&self.response, group);
        let rhs2 = self
            .b
            .mul(&beta_over_g_n.pow(c.value().clone(), group), group);

        if lhs1 == rhs1 && lhs2 == rhs2 {
            Ok(())
        } else {
            Err(EgError::InvalidProof {
                proof: ProofKind::ConstantChaumPedersen,
                object_id: String::new(),
            })
        }
    }
}

/// A guardian's proof linking its public key `K_i` to its decryption share `M_i`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecryptionProof {
    pub a: GroupElement, // g^r
    pub b: GroupElement, // alpha^r
    pub response: FieldElement,
}

impl DecryptionProof {
    /// `public_key` is `K_i` for a direct share, or the recovery key `g^{P_l(i)}` for a
    /// compensated share.
    pub fn prove(
        ct: &Ciphertext,
        secret: &FieldElement,
        share: &GroupElement, // M_i = alpha^secret
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
        csprng: &mut Csprng,
    ) -> Self {
        let r = field.random_field_elem(csprng);
        let a = group.g_exp(&r);
        let b = ct.alpha.exp(&r, group);
        let c = hash_elems(
            field,
            &[
                HashInput::Scalar(qbar),
                HashInput::GroupElem(&ct.alpha),
                HashInput::GroupElem(&ct.beta),
                HashInput::GroupElem(&a),
                HashInput::GroupElem(&b),
                HashInput::GroupElem(share),
            ],
        );
        let u = r.add(&c.mul(secret, field), field);
        DecryptionProof { a, b, response: u }
    }

    pub fn verify(
        &self,
        ct: &Ciphertext,
        public_key: &GroupElement,
        share: &GroupElement,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
    ) -> EgResult<()> {
        if !in_subgroup(public_key, group) || !in_subgroup(share, group) {
            return Err(EgError::NotInSubgroup {
                what: "decryption proof key/share",
            });
        }

        let c = hash_elems(
            field,
            &[
                HashInput::Scalar(qbar),
                HashInput::GroupElem(&ct.alpha),
                HashInput::GroupElem(&ct.beta),
                HashInput::GroupElem(&self.a),
                HashInput::GroupElem(&self.b),
                HashInput::GroupElem(share),
            ],
        );

        let lhs1 = group.g_exp(&self.response);
        let rhs1 = self.a.mul(&public_key.pow(c.value().clone(), group), group);

        let lhs2 = ct.alpha.exp(&self.response, group);
        let rhs2 = self.b.mul(&share.pow(c.value().clone(), group), group);

        if lhs1 == rhs1 && lhs2 == rhs2 {
            Ok(())
        } else {
            Err(EgError::InvalidProof {
                proof: ProofKind::Decryption,
                object_id: String::new(),
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixed_parameters::FixedParameters;

    #[test]
    fn schnorr_round_trip_and_tamper() {
        let fp = FixedParameters::test_params();
        let mut csprng = Csprng::new(1);
        let s = fp.field.random_field_elem(&mut csprng);
        let k = fp.group.g_exp(&s);
        let qbar = FieldElement::from(99_u32, &fp.field);

        let proof = SchnorrProof::prove(&s, &k, &qbar, &fp.group, &fp.field, &mut csprng);
        assert!(proof.verify(&k, &qbar, &fp.group, &fp.field).is_ok());

        let mut tampered = proof;
        tampered.response = tampered.response.add(&ScalarField::one(), &fp.field);
        assert!(tampered.verify(&k, &qbar, &fp.group, &fp.field).is_err());
    }

    #[test]
    fn disjunctive_proof_for_true_value_verifies_other_does_not() {
        let fp = FixedParameters::test_params();
        let mut csprng = Csprng::new(2);
        let s = fp.field.random_field_elem(&mut csprng);
        let k = fp.group.g_exp(&s);
        let qbar = FieldElement::from(7_u32, &fp.field);
        let r = FieldElement::from(13_u32, &fp.field);

        for v in [0_u8, 1_u8] {
            let ct = Ciphertext::encrypt(v as u64, &r, &k, &fp.group).expect("r != 0");
            let proof = DisjunctiveChaumPedersenProof::prove(
                &ct, v, &r, &k, &qbar, &fp.group, &fp.field, &mut csprng,
            );
            assert!(proof.verify(&ct, &k, &qbar, &fp.group, &fp.field).is_ok());

            // A proof built for the other value over the SAME ciphertext must not verify.
            let wrong_v = 1 - v;
            let wrong_proof = DisjunctiveChaumPedersenProof::prove(
                &ct, wrong_v, &r, &k, &qbar, &fp.group, &fp.field, &mut csprng,
            );
            assert!(wrong_proof
                .verify(&ct, &k, &qbar, &fp.group, &fp.field)
                .is_err());
        }
    }

    #[test]
    fn constant_proof_checks_exact_sum() {
        let fp = FixedParameters::test_params();
        let mut csprng = Csprng::new(3);
        let s = fp.field.random_field_elem(&mut csprng);
        let k = fp.group.g_exp(&s);
        let qbar = FieldElement::from(11_u32, &fp.field);
        let r = FieldElement::from(17_u32, &fp.field);

        let ct = Ciphertext::encrypt(2, &r, &k, &fp.group).expect("ok");
        let proof =
            ConstantChaumPedersenProof::prove(&ct, &r, &k, &qbar, &fp.group, &fp.field, &mut csprng);

        assert!(proof.verify(&ct, 2, &k, &qbar, &fp.group, &fp.field).is_ok());
        assert!(proof.verify(&ct, 3, &k, &qbar, &fp.group, &fp.field).is_err());
    }

    #[test]
    fn decryption_proof_round_trip() {
        let fp = FixedParameters::test_params();
        let mut csprng = Csprng::new(4);
        let s_i = fp.field.random_field_elem(&mut csprng);
        let k_i = fp.group.g_exp(&s_i);
        let qbar = FieldElement::from(23_u32, &fp.field);

        let r = FieldElement::from(5_u32, &fp.field);
        let ct = Ciphertext::encrypt(1, &r, &k_i, &fp.group).expect("ok");
        let share = ct.alpha.exp(&s_i, &fp.group);

        let proof =
            DecryptionProof::prove(&ct, &s_i, &share, &qbar, &fp.group, &fp.field, &mut csprng);
        assert!(proof
            .verify(&ct, &k_i, &share, &qbar, &fp.group, &fp.field)
            .is_ok());

        let wrong_share = fp.group.generator();
        assert!(proof
            .verify(&ct, &k_i, &wrong_share, &qbar, &fp.group, &fp.field)
            .is_err());
    }
}
