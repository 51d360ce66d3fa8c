// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! The publishable election record: everything a verifier needs to re-run every proof without
//! trusting the party that ran the election. This module only shapes the data — packaging it into
//! a directory tree, a zip, or anything else with actual file I/O is a caller concern.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use util::algebra::{FieldElement, Group, ScalarField};

use crate::ballot::SubmittedBallot;
use crate::context::CiphertextElectionContext;
use crate::encrypt::EncryptionDevice;
use crate::errors::EgResult;
use crate::guardian::Announcement;
use crate::manifest::Manifest;

/// `constants.json`: the (p, q, g) triple every other published value was computed under. The
/// cofactor `r = (p-1)/q` is never stored; it's cheap to recompute and storing it invites the two
/// copies drifting apart.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constants {
    pub group: Group,
    pub field: ScalarField,
}

/// One guardian's contribution to a Lagrange reconstruction, published so any verifier can redo
/// the interpolation `coefficients.json` claims the mediator performed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LagrangeCoefficient {
    pub guardian_sequence_order: u32,
    pub coefficient: FieldElement,
}

/// `tally.json`: the fully decrypted result, one count per `(contest, selection)`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaintextTally {
    pub counts: HashMap<String, HashMap<String, u64>>,
}

impl PlaintextTally {
    pub fn insert(&mut self, contest_id: &str, selection_id: &str, count: u64) {
        self.counts
            .entry(contest_id.to_string())
            .or_default()
            .insert(selection_id.to_string(), count);
    }

    pub fn get(&self, contest_id: &str, selection_id: &str) -> Option<u64> {
        self.counts.get(contest_id)?.get(selection_id).copied()
    }
}

/// Everything published about one election, shaped per the external-interfaces directory layout:
/// `manifest.json`, `context.json`, `constants.json`, `coefficients.json`,
/// `encryption_devices/device_*.json`, `guardians/guardian_*.json`,
/// `submitted_ballots/submitted_ballot_*.json`, `spoiled_ballots/spoiled_ballot_*.json`,
/// `encrypted_tally.json`, `tally.json`.
pub struct ElectionRecord {
    pub manifest: Manifest,
    pub context: CiphertextElectionContext,
    pub constants: Constants,
    pub coefficients: Vec<LagrangeCoefficient>,
    pub encryption_devices: Vec<EncryptionDevice>,
    pub guardians: Vec<Announcement>,
    pub submitted_ballots: Vec<SubmittedBallot>,
    pub encrypted_tally: HashMap<String, HashMap<String, crate::el_gamal::Ciphertext>>,
    pub tally: PlaintextTally,
}

impl ElectionRecord {
    /// Renders every published artifact as `(file path, JSON value)` pairs, using the file-naming
    /// convention from the directory layout. Object ids appear verbatim in file names, so callers
    /// should only feed this record objects whose ids are already filesystem-safe ASCII.
    pub fn to_named_json(&self) -> EgResult<Vec<(String, Value)>> {
        let mut out = Vec::new();
        out.push(("manifest.json".to_string(), to_json(&self.manifest)?));
        out.push(("context.json".to_string(), to_json(&self.context)?));
        out.push(("constants.json".to_string(), to_json(&self.constants)?));
        out.push(("coefficients.json".to_string(), to_json(&self.coefficients)?));

        for device in &self.encryption_devices {
            out.push((
                format!("encryption_devices/device_{}.json", device.device_id),
                to_json(device)?,
            ));
        }

        for guardian in &self.guardians {
            out.push((
                format!("guardians/guardian_{}.json", guardian.guardian_id),
                to_json(guardian)?,
            ));
        }

        for ballot in &self.submitted_ballots {
            let dir = match ballot.state {
                crate::ballot::BallotState::Cast => "submitted_ballots/submitted_ballot",
                crate::ballot::BallotState::Spoiled => "spoiled_ballots/spoiled_ballot",
            };
            out.push((
                format!("{}_{}.json", dir, ballot.ballot.object_id),
                to_json(ballot)?,
            ));
        }

        out.push(("encrypted_tally.json".to_string(), to_json(&self.encrypted_tally)?));
        out.push(("tally.json".to_string(), to_json(&self.tally)?));

        Ok(out)
    }
}

fn to_json(value: &impl Serialize) -> EgResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| crate::errors::EgError::InvalidManifest(format!("serialization failed: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ballot::{BallotState, EncryptedBallot, EncryptedContest, EncryptedSelection};
    use crate::el_gamal::{Ciphertext, ElGamalKeyPair};
    use crate::fixed_parameters::FixedParameters;
    use crate::internal_manifest::InternalManifest;
    use crate::manifest::{
        BallotStyle, Candidate, ContestDescription, GeopoliticalUnit, SelectionDescription,
        VoteVariation,
    };
    use crate::zk::{ConstantChaumPedersenProof, DisjunctiveChaumPedersenProof};
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
    fn record_serializes_every_named_artifact() {
        let fp = FixedParameters::test_params();
        let mut csprng = Csprng::new(1);
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

        let r = FieldElement::from(3_u32, &fp.field);
        let ct = Ciphertext::encrypt(1, &r, &keys.public_key, &fp.group).expect("r != 0");
        let proof = DisjunctiveChaumPedersenProof::prove(
            &ct, 1, &r, &keys.public_key, &qbar, &fp.group, &fp.field, &mut csprng,
        );
        let sum_proof = ConstantChaumPedersenProof::prove(
            &ct, &r, &keys.public_key, &qbar, &fp.group, &fp.field, &mut csprng,
        );
        let ballot = EncryptedBallot {
            object_id: "ballot1".to_string(),
            style_id: "style1".to_string(),
            contests: vec![EncryptedContest {
                object_id: "contest1".to_string(),
                selections: vec![EncryptedSelection {
                    object_id: "sel1".to_string(),
                    ciphertext: ct.clone(),
                    proof,
                    nonce: None,
                }],
                accumulation: ct.clone(),
                proof: sum_proof,
                nonce: None,
                extended_data: None,
            }],
            previous_tracking_hash: [0_u8; 32],
            tracking_hash: [1_u8; 32],
            timestamp: 0,
        };
        let submitted = SubmittedBallot {
            ballot,
            state: BallotState::Cast,
        };

        let mut tally = PlaintextTally::default();
        tally.insert("contest1", "sel1", 1);

        let mut encrypted_tally = HashMap::new();
        let mut sel_map = HashMap::new();
        sel_map.insert("sel1".to_string(), ct);
        encrypted_tally.insert("contest1".to_string(), sel_map);

        let record = ElectionRecord {
            manifest: internal.manifest.clone(),
            context,
            constants: Constants {
                group: fp.group.clone(),
                field: fp.field.clone(),
            },
            coefficients: vec![LagrangeCoefficient {
                guardian_sequence_order: 1,
                coefficient: FieldElement::from(1_u32, &fp.field),
            }],
            encryption_devices: vec![crate::encrypt::EncryptionDevice {
                device_id: "dev1".to_string(),
                location: "precinct-1".to_string(),
                session_id: 1,
                launch_code: 55,
            }],
            guardians: vec![],
            submitted_ballots: vec![submitted],
            encrypted_tally,
            tally,
        };

        let files = record.to_named_json().expect("serializes");
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"manifest.json"));
        assert!(names.contains(&"context.json"));
        assert!(names.contains(&"constants.json"));
        assert!(names.contains(&"coefficients.json"));
        assert!(names.contains(&"encrypted_tally.json"));
        assert!(names.contains(&"tally.json"));
        assert!(names.contains(&"submitted_ballots/submitted_ballot_ballot1.json"));
        assert!(names.contains(&"encryption_devices/device_dev1.json"));
    }
}
