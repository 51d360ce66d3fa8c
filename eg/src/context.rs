// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! `CiphertextElectionContext`: the aggregate every encryption, proof, and decryption step reads
//! from. Built once, after the key ceremony and manifest are both finalized; nothing in this
//! crate constructs a context's fields piecemeal.

use serde::{Deserialize, Serialize};
use util::algebra::{FieldElement, GroupElement};

use crate::fixed_parameters::{FixedParameters, ParameterVariant};
use crate::hash::{hash_elems, HashInput};
use crate::internal_manifest::InternalManifest;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CiphertextElectionContext {
    pub variant: ParameterVariant,
    pub n: u32,
    pub k: u32,
    pub joint_public_key: GroupElement,
    pub commitment_hash: FieldElement,
    pub manifest_hash: FieldElement,
    /// Crypto-base-hash Q.
    pub crypto_base_hash: FieldElement,
    /// Crypto-extended-base-hash Q̄, mixed into every proof's Fiat-Shamir challenge.
    pub crypto_extended_base_hash: FieldElement,
}

impl CiphertextElectionContext {
    /// Builds the context from the key ceremony's output and the manifest's derived hash.
    ///
    /// `Q = hash_elems(p, q, g, n, k, commitment_hash, manifest_hash)`;
    /// `Q̄ = hash_elems(Q)`, matching the two-stage base-hash/extended-base-hash split so that a
    /// future protocol revision can fold in more context without reshaping every proof's
    /// challenge inputs.
    pub fn new(
        n: u32,
        k: u32,
        joint_public_key: GroupElement,
        commitment_hash: FieldElement,
        manifest: &InternalManifest,
        fixed_parameters: &FixedParameters,
    ) -> Self {
        let field = &fixed_parameters.field;
        let group = &fixed_parameters.group;
        let manifest_hash = manifest.manifest_hash(field);

        let mut p_hex = group.modulus().to_str_radix(16);
        p_hex.make_ascii_uppercase();
        let mut q_hex = group.order().to_str_radix(16);
        q_hex.make_ascii_uppercase();

        let crypto_base_hash = hash_elems(
            field,
            &[
                HashInput::Str(&p_hex),
                HashInput::Str(&q_hex),
                HashInput::GroupElem(&group.generator()),
                HashInput::Int(n as u64),
                HashInput::Int(k as u64),
                HashInput::Scalar(&commitment_hash),
                HashInput::Scalar(&manifest_hash),
            ],
        );
        let crypto_extended_base_hash =
            hash_elems(field, &[HashInput::Scalar(&crypto_base_hash)]);

        CiphertextElectionContext {
            variant: fixed_parameters.variant,
            n,
            k,
            joint_public_key,
            commitment_hash,
            manifest_hash,
            crypto_base_hash,
            crypto_extended_base_hash,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixed_parameters::FixedParameters;
    use crate::manifest::{
        BallotStyle, Candidate, ContestDescription, GeopoliticalUnit, Manifest,
        SelectionDescription, VoteVariation,
    };

    fn tiny_manifest() -> Manifest {
        Manifest {
            election_scope_id: "e".to_string(),
            spec_version: "2.0".to_string(),
            election_type: "general".to_string(),
            start_date: "2026-01-01".to_string(),
            end_date: "2026-01-01".to_string(),
            geopolitical_units: vec![GeopoliticalUnit {
                object_id: "gpu1".to_string(),
                name: "D1".to_string(),
            }],
            parties: vec![],
            candidates: vec![Candidate {
                object_id: "cand1".to_string(),
                name: "Alice".to_string(),
            }],
            contests: vec![ContestDescription {
                object_id: "contest1".to_string(),
                sequence_order: 0,
                electoral_district_id: "gpu1".to_string(),
                vote_variation: VoteVariation::OneOfM,
                number_elected: 1,
                votes_allowed: 1,
                name: "Mayor".to_string(),
                ballot_selections: vec![SelectionDescription {
                    object_id: "sel1".to_string(),
                    sequence_order: 0,
                    candidate_id: "cand1".to_string(),
                }],
            }],
            ballot_styles: vec![BallotStyle {
                object_id: "style1".to_string(),
                geopolitical_unit_ids: vec!["gpu1".to_string()],
            }],
        }
    }

    #[test]
    fn context_is_deterministic_given_same_inputs() {
        let fp = FixedParameters::test_params();
        let internal =
            InternalManifest::from_manifest(tiny_manifest(), &fp.field).expect("valid");
        let k = fp.group.generator();
        let hash = FieldElement::from(7_u32, &fp.field);

        let c1 = CiphertextElectionContext::new(3, 2, k.clone(), hash.clone(), &internal, &fp);
        let c2 = CiphertextElectionContext::new(3, 2, k, hash, &internal, &fp);
        assert_eq!(c1.crypto_extended_base_hash, c2.crypto_extended_base_hash);
    }

    #[test]
    fn different_manifest_changes_extended_base_hash() {
        let fp = FixedParameters::test_params();
        let internal =
            InternalManifest::from_manifest(tiny_manifest(), &fp.field).expect("valid");
        let mut other_manifest = tiny_manifest();
        other_manifest.contests[0].ballot_selections[0].candidate_id = "other".to_string();
        let other_internal =
            InternalManifest::from_manifest(other_manifest, &fp.field).expect("valid");

        let k = fp.group.generator();
        let hash = FieldElement::from(7_u32, &fp.field);

        let c1 =
            CiphertextElectionContext::new(3, 2, k.clone(), hash.clone(), &internal, &fp);
        let c2 = CiphertextElectionContext::new(3, 2, k, hash, &other_internal, &fp);
        assert_ne!(c1.crypto_extended_base_hash, c2.crypto_extended_base_hash);
    }
}
