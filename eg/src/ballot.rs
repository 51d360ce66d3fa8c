// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! The ballot tree: plaintext input, its encrypted form (nonces retained so the voter's device
//! can self-verify before submission), and the submitted form (nonces and extended data
//! stripped) that actually enters the ballot box.

use serde::{Deserialize, Serialize};
use util::algebra::FieldElement;

use crate::context::CiphertextElectionContext;
use crate::el_gamal::Ciphertext;
use crate::errors::{EgError, EgResult};
use crate::fixed_parameters::FixedParameters;
use crate::hash::HValue;
use crate::hashed_el_gamal::HashedElGamalCiphertext;
use crate::internal_manifest::InternalManifest;
use crate::zk::{ConstantChaumPedersenProof, DisjunctiveChaumPedersenProof};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaintextBallotSelection {
    pub object_id: String,
    /// `0` or `1`.
    pub vote: u8,
    pub write_in: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaintextBallotContest {
    pub object_id: String,
    pub selections: Vec<PlaintextBallotSelection>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaintextBallot {
    pub object_id: String,
    pub style_id: String,
    pub contests: Vec<PlaintextBallotContest>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedSelection {
    pub object_id: String,
    pub ciphertext: Ciphertext,
    pub proof: DisjunctiveChaumPedersenProof,
    /// Present on a freshly-encrypted ballot, stripped (`None`) once submitted.
    pub nonce: Option<FieldElement>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedContest {
    pub object_id: String,
    pub selections: Vec<EncryptedSelection>,
    /// The homomorphic sum of every selection (real and placeholder) in this contest.
    pub accumulation: Ciphertext,
    pub proof: ConstantChaumPedersenProof,
    pub nonce: Option<FieldElement>,
    pub extended_data: Option<HashedElGamalCiphertext>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, strum_macros::Display)]
pub enum BallotState {
    Cast,
    Spoiled,
}

/// Wire-serializable form of [`HValue`]'s inner bytes.
pub type HValueWire = [u8; 32];

pub fn to_wire(h: &HValue) -> HValueWire {
    h.0
}

pub fn from_wire(w: HValueWire) -> HValue {
    HValue(w)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedBallot {
    pub object_id: String,
    pub style_id: String,
    pub contests: Vec<EncryptedContest>,
    pub previous_tracking_hash: HValueWire,
    pub tracking_hash: HValueWire,
    pub timestamp: u64,
}

impl EncryptedBallot {
    /// Re-checks every selection proof and every contest sum proof against the published
    /// context and manifest. Run both by the encrypting device, immediately after encryption,
    /// and by any later verifier reading the published record.
    pub fn is_valid_encryption(
        &self,
        context: &CiphertextElectionContext,
        fixed_parameters: &FixedParameters,
        manifest: &InternalManifest,
    ) -> EgResult<()> {
        let group = &fixed_parameters.group;
        let field = &fixed_parameters.field;

        for contest in &self.contests {
            let internal_contest = manifest.require_contest(&contest.object_id)?;

            for selection in &contest.selections {
                selection
                    .proof
                    .verify(
                        &selection.ciphertext,
                        &context.joint_public_key,
                        &context.crypto_extended_base_hash,
                        group,
                        field,
                    )
                    .map_err(|_| EgError::BallotInvalid {
                        ballot_id: self.object_id.clone(),
                        reason: format!("selection {} failed proof", selection.object_id),
                    })?;
            }

            let cts: Vec<&Ciphertext> = contest.selections.iter().map(|s| &s.ciphertext).collect();
            let expected_accumulation =
                Ciphertext::sum(cts, group).ok_or_else(|| EgError::BallotInvalid {
                    ballot_id: self.object_id.clone(),
                    reason: format!("contest {} has no selections", contest.object_id),
                })?;
            if expected_accumulation != contest.accumulation {
                return Err(EgError::BallotInvalid {
                    ballot_id: self.object_id.clone(),
                    reason: format!(
                        "contest {} accumulation does not match its selections",
                        contest.object_id
                    ),
                });
            }

            contest
                .proof
                .verify(
                    &contest.accumulation,
                    internal_contest.description.number_elected,
                    &context.joint_public_key,
                    &context.crypto_extended_base_hash,
                    group,
                    field,
                )
                .map_err(|_| EgError::BallotInvalid {
                    ballot_id: self.object_id.clone(),
                    reason: format!("contest {} failed sum proof", contest.object_id),
                })?;
        }
        Ok(())
    }
}

/// A ballot that has left the voter's control: nonces and extended data are stripped so the
/// published record can't be used to prove how any individual voted (receipt-freeness).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmittedBallot {
    pub ballot: EncryptedBallot,
    pub state: BallotState,
}

impl SubmittedBallot {
    pub fn strip(mut ballot: EncryptedBallot, state: BallotState) -> Self {
        for contest in &mut ballot.contests {
            contest.nonce = None;
            contest.extended_data = None;
            for selection in &mut contest.selections {
                selection.nonce = None;
            }
        }
        SubmittedBallot { ballot, state }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::el_gamal::ElGamalKeyPair;
    use crate::manifest::{
        BallotStyle, Candidate, ContestDescription, GeopoliticalUnit, Manifest,
        SelectionDescription, VoteVariation,
    };
    use crate::zk::DisjunctiveChaumPedersenProof as DcpProof;
    use util::algebra::ScalarField;
    use util::csprng::Csprng;

    fn manifest() -> Manifest {
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
            candidates: vec![
                Candidate {
                    object_id: "cand1".to_string(),
                    name: "Alice".to_string(),
                },
                Candidate {
                    object_id: "cand2".to_string(),
                    name: "Bob".to_string(),
                },
            ],
            contests: vec![ContestDescription {
                object_id: "contest1".to_string(),
                sequence_order: 0,
                electoral_district_id: "gpu1".to_string(),
                vote_variation: VoteVariation::OneOfM,
                number_elected: 1,
                votes_allowed: 1,
                name: "Mayor".to_string(),
                ballot_selections: vec![
                    SelectionDescription {
                        object_id: "sel1".to_string(),
                        sequence_order: 0,
                        candidate_id: "cand1".to_string(),
                    },
                    SelectionDescription {
                        object_id: "sel2".to_string(),
                        sequence_order: 1,
                        candidate_id: "cand2".to_string(),
                    },
                ],
            }],
            ballot_styles: vec![BallotStyle {
                object_id: "style1".to_string(),
                geopolitical_unit_ids: vec!["gpu1".to_string()],
            }],
        }
    }

    #[test]
    fn valid_ballot_passes_is_valid_encryption() {
        let fp = FixedParameters::test_params();
        let mut csprng = Csprng::new(42);
        let internal = InternalManifest::from_manifest(manifest(), &fp.field).expect("valid");
        let s = fp.field.random_field_elem(&mut csprng);
        let keys = ElGamalKeyPair::from_secret(s, &fp.group).expect("valid secret");
        let context = CiphertextElectionContext::new(
            1,
            1,
            keys.public_key.clone(),
            FieldElement::from(1_u32, &fp.field),
            &internal,
            &fp,
        );
        let qbar = context.crypto_extended_base_hash.clone();

        let contest = internal.contest("contest1").expect("exists");
        // one real "yes" vote on selection 1, "no" on selection 2, no placeholders triggered.
        let votes = [("sel1", 1_u8), ("sel2", 0_u8)];
        let mut encrypted_selections = Vec::new();
        let mut ciphertexts = Vec::new();
        let mut total_nonce = ScalarField::zero();
        for (sel_id, v) in votes {
            let r = fp.field.random_field_elem(&mut csprng);
            let ct = Ciphertext::encrypt(v as u64, &r, &keys.public_key, &fp.group).expect("r!=0");
            let proof = DcpProof::prove(
                &ct, v, &r, &keys.public_key, &qbar, &fp.group, &fp.field, &mut csprng,
            );
            total_nonce = total_nonce.add(&r, &fp.field);
            ciphertexts.push(ct.clone());
            encrypted_selections.push(EncryptedSelection {
                object_id: sel_id.to_string(),
                ciphertext: ct,
                proof,
                nonce: Some(r),
            });
        }
        let accumulation =
            Ciphertext::sum(ciphertexts.iter(), &fp.group).expect("non-empty");
        let sum_proof = ConstantChaumPedersenProof::prove(
            &accumulation,
            &total_nonce,
            &keys.public_key,
            &qbar,
            &fp.group,
            &fp.field,
            &mut csprng,
        );

        let ballot = EncryptedBallot {
            object_id: "ballot1".to_string(),
            style_id: "style1".to_string(),
            contests: vec![EncryptedContest {
                object_id: contest.description.object_id.clone(),
                selections: encrypted_selections,
                accumulation,
                proof: sum_proof,
                nonce: Some(total_nonce),
                extended_data: None,
            }],
            previous_tracking_hash: [0_u8; 32],
            tracking_hash: [1_u8; 32],
            timestamp: 0,
        };

        assert!(ballot.is_valid_encryption(&context, &fp, &internal).is_ok());

        let submitted = SubmittedBallot::strip(ballot.clone(), BallotState::Cast);
        assert!(submitted.ballot.contests[0].nonce.is_none());
        assert!(submitted.ballot.contests[0].selections[0].nonce.is_none());
    }
}
