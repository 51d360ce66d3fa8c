// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Ballot encryption: turns a [`PlaintextBallot`] into an [`EncryptedBallot`], deriving every
//! nonce from a single per-ballot seed, filling each contest's undervoted slots with encrypted
//! placeholders, and chaining the device's running tracking hash.
//!
//! An overvoted contest is encrypted exactly like any other — the real selections sum to more
//! than the contest allows, there's no room left for placeholders, and the resulting
//! [`ConstantChaumPedersenProof`] simply fails to verify against the manifest's
//! `number_elected` once checked. Encryption never inspects vote counts to decide whether to
//! proceed; `EncryptedBallot::is_valid_encryption` is what catches it.

use serde::{Deserialize, Serialize};
use util::algebra::{FieldElement, Group, ScalarField};
use util::csprng::Csprng;

use crate::ballot::{
    EncryptedBallot, EncryptedContest, EncryptedSelection, HValueWire, PlaintextBallot,
    PlaintextBallotContest,
};
use crate::context::CiphertextElectionContext;
use crate::el_gamal::Ciphertext;
use crate::errors::EgResult;
use crate::fixed_parameters::FixedParameters;
use crate::hash::{hash_elems, HashInput};
use crate::hashed_el_gamal::HashedElGamalCiphertext;
use crate::internal_manifest::InternalManifest;
use crate::nonces::NonceSeed;
use crate::zk::{ConstantChaumPedersenProof, DisjunctiveChaumPedersenProof};

/// The device that performed the encryption: folded into the first tracking hash of a ballot
/// session so two devices can never collide on the same tracking chain.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptionDevice {
    pub device_id: String,
    pub location: String,
    pub session_id: u64,
    pub launch_code: u64,
}

impl EncryptionDevice {
    fn hash(&self, field: &ScalarField) -> FieldElement {
        hash_elems(
            field,
            &[
                HashInput::Str(&self.device_id),
                HashInput::Str(&self.location),
                HashInput::Int(self.session_id),
                HashInput::Int(self.launch_code),
            ],
        )
    }

    /// `T_0`, the tracking hash a device's first ballot of a voting session chains from.
    pub fn initial_tracking_hash(
        &self,
        timestamp: u64,
        context: &CiphertextElectionContext,
        field: &ScalarField,
    ) -> HValueWire {
        let t0 = hash_elems(
            field,
            &[
                HashInput::Scalar(&self.hash(field)),
                HashInput::Int(timestamp),
                HashInput::Scalar(&context.crypto_extended_base_hash),
            ],
        );
        field_to_wire(&t0)
    }
}

fn field_to_wire(f: &FieldElement) -> HValueWire {
    let bytes = f.to_32_be_bytes();
    let mut arr = [0_u8; 32];
    arr.copy_from_slice(&bytes);
    arr
}

fn wire_to_field(w: &HValueWire, field: &ScalarField) -> FieldElement {
    FieldElement::from_bytes_be(w, field)
}

/// Derives a nonce for `(contest_ix, path_ix)`, extending the path with an incrementing salt on
/// the negligible chance the derived value is exactly zero (which `Ciphertext::encrypt` rejects).
fn derive_nonzero_nonce(
    nonce_seed: &NonceSeed,
    field: &ScalarField,
    contest_ix: u64,
    path_ix: u64,
) -> FieldElement {
    let mut salt = 0_u64;
    loop {
        let r = nonce_seed.derive(field, &[contest_ix, path_ix, salt]);
        if !r.is_zero() {
            return r;
        }
        salt += 1;
    }
}

fn ct_or_err(ct: Option<Ciphertext>) -> EgResult<Ciphertext> {
    ct.ok_or_else(|| crate::errors::EgError::StateViolation(
        "ciphertext encryption nonce was zero after derivation".to_string(),
    ))
}

/// Encrypts `plaintext` against `manifest`/`context`, chaining from `previous_tracking_hash`
/// (the prior ballot's tracking hash, or [`EncryptionDevice::initial_tracking_hash`] for the
/// first ballot of a session).
///
/// `master_seed` is a fresh random [`FieldElement`] drawn once per ballot; every selection and
/// contest nonce is derived from it via [`NonceSeed`], never drawn independently, so the same
/// master seed always re-derives the identical ciphertexts.
pub fn encrypt_ballot(
    plaintext: &PlaintextBallot,
    manifest: &InternalManifest,
    context: &CiphertextElectionContext,
    fixed_parameters: &FixedParameters,
    master_seed: FieldElement,
    previous_tracking_hash: HValueWire,
    timestamp: u64,
    csprng: &mut Csprng,
) -> EgResult<EncryptedBallot> {
    let group = &fixed_parameters.group;
    let field = &fixed_parameters.field;

    let ballot_root = hash_elems(
        field,
        &[
            HashInput::Scalar(&context.manifest_hash),
            HashInput::Str(&plaintext.object_id),
            HashInput::Scalar(&master_seed),
        ],
    );
    let nonce_seed = NonceSeed::new(ballot_root);

    let mut encrypted_contests = Vec::with_capacity(plaintext.contests.len());
    for (contest_ix, contest) in plaintext.contests.iter().enumerate() {
        let internal_contest = manifest.require_contest(&contest.object_id)?;
        let number_elected = internal_contest.description.number_elected;

        let selected_count: u32 = contest
            .selections
            .iter()
            .map(|s| s.vote as u32)
            .sum();
        let placeholders_needed = number_elected.saturating_sub(selected_count);

        let mut selections = Vec::new();
        let mut ciphertexts = Vec::new();
        let mut aggregate_nonce = ScalarField::zero();

        for (selection_ix, selection) in contest.selections.iter().enumerate() {
            let r = derive_nonzero_nonce(&nonce_seed, field, contest_ix as u64, selection_ix as u64);
            let ct = ct_or_err(Ciphertext::encrypt(
                selection.vote as u64,
                &r,
                &context.joint_public_key,
                group,
            ))?;
            let proof = DisjunctiveChaumPedersenProof::prove(
                &ct,
                selection.vote,
                &r,
                &context.joint_public_key,
                &context.crypto_extended_base_hash,
                group,
                field,
                csprng,
            );
            aggregate_nonce = aggregate_nonce.add(&r, field);
            ciphertexts.push(ct.clone());
            selections.push(EncryptedSelection {
                object_id: selection.object_id.clone(),
                ciphertext: ct,
                proof,
                nonce: Some(r),
            });
        }

        for (placeholder_ix, placeholder) in internal_contest.placeholders.iter().enumerate() {
            let path_ix = contest.selections.len() as u64 + placeholder_ix as u64;
            let r = derive_nonzero_nonce(&nonce_seed, field, contest_ix as u64, path_ix);
            let value = if (placeholder_ix as u32) < placeholders_needed {
                1_u8
            } else {
                0_u8
            };
            let ct = ct_or_err(Ciphertext::encrypt(value as u64, &r, &context.joint_public_key, group))?;
            let proof = DisjunctiveChaumPedersenProof::prove(
                &ct,
                value,
                &r,
                &context.joint_public_key,
                &context.crypto_extended_base_hash,
                group,
                field,
                csprng,
            );
            aggregate_nonce = aggregate_nonce.add(&r, field);
            ciphertexts.push(ct.clone());
            selections.push(EncryptedSelection {
                object_id: placeholder.object_id.clone(),
                ciphertext: ct,
                proof,
                nonce: Some(r),
            });
        }

        let accumulation = Ciphertext::sum(ciphertexts.iter(), group).ok_or_else(|| {
            crate::errors::EgError::InvalidManifest(format!(
                "contest {} has no selections to encrypt",
                contest.object_id
            ))
        })?;
        let proof = ConstantChaumPedersenProof::prove(
            &accumulation,
            &aggregate_nonce,
            &context.joint_public_key,
            &context.crypto_extended_base_hash,
            group,
            field,
            csprng,
        );

        let extended_data_path_ix =
            (contest.selections.len() + internal_contest.placeholders.len()) as u64;
        let extended_data = encrypt_write_ins(
            contest,
            &nonce_seed,
            field,
            group,
            context,
            contest_ix as u64,
            extended_data_path_ix,
        )?;

        encrypted_contests.push(EncryptedContest {
            object_id: contest.object_id.clone(),
            selections,
            accumulation,
            proof,
            nonce: Some(aggregate_nonce),
            extended_data,
        });
    }

    let ballot_crypto_hash = ballot_hash(&plaintext.object_id, &encrypted_contests, field);
    let previous_scalar = wire_to_field(&previous_tracking_hash, field);
    let tracking_scalar = hash_elems(
        field,
        &[
            HashInput::Scalar(&previous_scalar),
            HashInput::Int(timestamp),
            HashInput::Scalar(&ballot_crypto_hash),
        ],
    );

    Ok(EncryptedBallot {
        object_id: plaintext.object_id.clone(),
        style_id: plaintext.style_id.clone(),
        contests: encrypted_contests,
        previous_tracking_hash,
        tracking_hash: field_to_wire(&tracking_scalar),
        timestamp,
    })
}

/// Hashed-ElGamal-encrypts `contest`'s write-in strings, if any, as `"selection_id=text\n"` lines
/// concatenated in selection order. Returns `None` when no selection in the contest carries a
/// write-in, so a contest with no write-ins publishes no extended-data ciphertext at all.
#[allow(clippy::too_many_arguments)]
fn encrypt_write_ins(
    contest: &PlaintextBallotContest,
    nonce_seed: &NonceSeed,
    field: &ScalarField,
    group: &Group,
    context: &CiphertextElectionContext,
    contest_ix: u64,
    path_ix: u64,
) -> EgResult<Option<HashedElGamalCiphertext>> {
    let mut payload = Vec::new();
    for selection in &contest.selections {
        if let Some(write_in) = &selection.write_in {
            payload.extend_from_slice(selection.object_id.as_bytes());
            payload.push(b'=');
            payload.extend_from_slice(write_in.as_bytes());
            payload.push(b'\n');
        }
    }
    if payload.is_empty() {
        return Ok(None);
    }

    let r = derive_nonzero_nonce(nonce_seed, field, contest_ix, path_ix);
    let seed = contest.object_id.as_bytes();
    let ct = HashedElGamalCiphertext::encrypt(&payload, &r, &context.joint_public_key, seed, group)?;
    Ok(Some(ct))
}

/// Decrypts `extended_data` back into `(selection_id, write_in_text)` pairs, the inverse of
/// [`encrypt_write_ins`]. `contest_object_id` must be the same value used as the encryption seed.
pub fn decrypt_write_ins(
    extended_data: &HashedElGamalCiphertext,
    contest_object_id: &str,
    s: &FieldElement,
    group: &Group,
) -> Option<Vec<(String, String)>> {
    let payload = extended_data.decrypt(s, contest_object_id.as_bytes(), group)?;
    let text = String::from_utf8(payload).ok()?;
    text.lines()
        .map(|line| line.split_once('=').map(|(id, w)| (id.to_string(), w.to_string())))
        .collect()
}

/// Re-derives the tracking hash of every ballot in `ballots` (submitted in order to a single
/// device) from `previous_tracking_hash` and checks it against the hash the ballot actually
/// carries. Reports the first mismatch with its ballot id; a ballot published out of its true
/// order, or with any field tampered, breaks the chain at that point and every ballot after it.
pub fn verify_tracking_chain(
    ballots: &[EncryptedBallot],
    mut previous_tracking_hash: HValueWire,
    field: &ScalarField,
) -> EgResult<()> {
    for ballot in ballots {
        if ballot.previous_tracking_hash != previous_tracking_hash {
            tracing::warn!(ballot_id = %ballot.object_id, "tracking chain broken");
            return Err(crate::errors::EgError::BallotInvalid {
                ballot_id: ballot.object_id.clone(),
                reason: "previous tracking hash does not match the chain".to_string(),
            });
        }

        let ballot_crypto_hash = ballot_hash(&ballot.object_id, &ballot.contests, field);
        let previous_scalar = wire_to_field(&previous_tracking_hash, field);
        let expected = hash_elems(
            field,
            &[
                HashInput::Scalar(&previous_scalar),
                HashInput::Int(ballot.timestamp),
                HashInput::Scalar(&ballot_crypto_hash),
            ],
        );
        if field_to_wire(&expected) != ballot.tracking_hash {
            tracing::warn!(ballot_id = %ballot.object_id, "tracking chain broken");
            return Err(crate::errors::EgError::BallotInvalid {
                ballot_id: ballot.object_id.clone(),
                reason: "tracking hash does not match its recomputation".to_string(),
            });
        }

        previous_tracking_hash = ballot.tracking_hash;
    }
    Ok(())
}

fn ballot_hash(
    ballot_id: &str,
    contests: &[EncryptedContest],
    field: &ScalarField,
) -> FieldElement {
    let mut sorted: Vec<&EncryptedContest> = contests.iter().collect();
    sorted.sort_by_key(|c| c.object_id.clone());

    let contest_hashes: Vec<FieldElement> = sorted
        .iter()
        .map(|contest| {
            let mut items = vec![HashInput::Str(&contest.object_id)];
            for selection in &contest.selections {
                items.push(HashInput::GroupElem(&selection.ciphertext.alpha));
                items.push(HashInput::GroupElem(&selection.ciphertext.beta));
            }
            items.push(HashInput::GroupElem(&contest.accumulation.alpha));
            items.push(HashInput::GroupElem(&contest.accumulation.beta));
            hash_elems(field, &[HashInput::Seq(items)])
        })
        .collect();

    let items: Vec<HashInput<'_>> = contest_hashes.iter().map(HashInput::Scalar).collect();
    hash_elems(
        field,
        &[HashInput::Str(ballot_id), HashInput::Seq(items)],
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ballot::PlaintextBallotContest;
    use crate::ballot::PlaintextBallotSelection;
    use crate::el_gamal::ElGamalKeyPair;
    use crate::manifest::{
        BallotStyle, Candidate, ContestDescription, GeopoliticalUnit, Manifest,
        SelectionDescription, VoteVariation,
    };

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

    fn setup() -> (
        FixedParameters,
        InternalManifest,
        CiphertextElectionContext,
        ElGamalKeyPair,
    ) {
        let fp = FixedParameters::test_params();
        let mut csprng = Csprng::new(123);
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
        (fp, internal, context, keys)
    }

    #[test]
    fn undervoted_ballot_encrypts_and_verifies() {
        let (fp, internal, context, _keys) = setup();
        let mut csprng = Csprng::new(9);
        let device = EncryptionDevice {
            device_id: "dev1".to_string(),
            location: "precinct-1".to_string(),
            session_id: 1,
            launch_code: 55,
        };
        let t0 = device.initial_tracking_hash(0, &context, &fp.field);

        let ballot = PlaintextBallot {
            object_id: "ballot1".to_string(),
            style_id: "style1".to_string(),
            contests: vec![PlaintextBallotContest {
                object_id: "contest1".to_string(),
                selections: vec![
                    PlaintextBallotSelection {
                        object_id: "sel1".to_string(),
                        vote: 1,
                        write_in: None,
                    },
                    PlaintextBallotSelection {
                        object_id: "sel2".to_string(),
                        vote: 0,
                        write_in: None,
                    },
                ],
            }],
        };

        let seed = fp.field.random_field_elem(&mut csprng);
        let encrypted = encrypt_ballot(&ballot, &internal, &context, &fp, seed, t0, 1, &mut csprng)
            .expect("encrypts");
        assert!(encrypted
            .is_valid_encryption(&context, &fp, &internal)
            .is_ok());
    }

    #[test]
    fn overvoted_contest_fails_verification() {
        let (fp, internal, context, _keys) = setup();
        let mut csprng = Csprng::new(10);
        let device = EncryptionDevice {
            device_id: "dev1".to_string(),
            location: "precinct-1".to_string(),
            session_id: 1,
            launch_code: 55,
        };
        let t0 = device.initial_tracking_hash(0, &context, &fp.field);

        // contest1 allows number_elected = 1, but both selections are marked.
        let ballot = PlaintextBallot {
            object_id: "ballot2".to_string(),
            style_id: "style1".to_string(),
            contests: vec![PlaintextBallotContest {
                object_id: "contest1".to_string(),
                selections: vec![
                    PlaintextBallotSelection {
                        object_id: "sel1".to_string(),
                        vote: 1,
                        write_in: None,
                    },
                    PlaintextBallotSelection {
                        object_id: "sel2".to_string(),
                        vote: 1,
                        write_in: None,
                    },
                ],
            }],
        };

        let seed = fp.field.random_field_elem(&mut csprng);
        let encrypted = encrypt_ballot(&ballot, &internal, &context, &fp, seed, t0, 1, &mut csprng)
            .expect("encryption always succeeds");
        assert!(encrypted
            .is_valid_encryption(&context, &fp, &internal)
            .is_err());
    }

    #[test]
    fn tracking_hash_chains_across_ballots() {
        let (fp, internal, context, _keys) = setup();
        let mut csprng = Csprng::new(11);
        let device = EncryptionDevice {
            device_id: "dev1".to_string(),
            location: "precinct-1".to_string(),
            session_id: 1,
            launch_code: 55,
        };
        let t0 = device.initial_tracking_hash(0, &context, &fp.field);

        let ballot = PlaintextBallot {
            object_id: "ballot1".to_string(),
            style_id: "style1".to_string(),
            contests: vec![PlaintextBallotContest {
                object_id: "contest1".to_string(),
                selections: vec![
                    PlaintextBallotSelection {
                        object_id: "sel1".to_string(),
                        vote: 1,
                        write_in: None,
                    },
                    PlaintextBallotSelection {
                        object_id: "sel2".to_string(),
                        vote: 0,
                        write_in: None,
                    },
                ],
            }],
        };

        let seed1 = fp.field.random_field_elem(&mut csprng);
        let first = encrypt_ballot(&ballot, &internal, &context, &fp, seed1, t0, 1, &mut csprng)
            .expect("encrypts");
        assert_ne!(first.tracking_hash, t0);

        let mut second_ballot = ballot.clone();
        second_ballot.object_id = "ballot2".to_string();
        let seed2 = fp.field.random_field_elem(&mut csprng);
        let second = encrypt_ballot(
            &second_ballot,
            &internal,
            &context,
            &fp,
            seed2,
            first.tracking_hash,
            2,
            &mut csprng,
        )
        .expect("encrypts");
        assert_ne!(second.tracking_hash, first.tracking_hash);

        assert!(verify_tracking_chain(&[first.clone(), second.clone()], t0, &fp.field).is_ok());

        let swapped = [second, first];
        assert!(verify_tracking_chain(&swapped, t0, &fp.field).is_err());
    }

    #[test]
    fn write_in_round_trips_through_extended_data() {
        let (fp, internal, context, keys) = setup();
        let mut csprng = Csprng::new(12);
        let device = EncryptionDevice {
            device_id: "dev1".to_string(),
            location: "precinct-1".to_string(),
            session_id: 1,
            launch_code: 55,
        };
        let t0 = device.initial_tracking_hash(0, &context, &fp.field);

        let ballot = PlaintextBallot {
            object_id: "ballot1".to_string(),
            style_id: "style1".to_string(),
            contests: vec![PlaintextBallotContest {
                object_id: "contest1".to_string(),
                selections: vec![
                    PlaintextBallotSelection {
                        object_id: "sel1".to_string(),
                        vote: 1,
                        write_in: Some("Jane Doe".to_string()),
                    },
                    PlaintextBallotSelection {
                        object_id: "sel2".to_string(),
                        vote: 0,
                        write_in: None,
                    },
                ],
            }],
        };

        let seed = fp.field.random_field_elem(&mut csprng);
        let encrypted = encrypt_ballot(&ballot, &internal, &context, &fp, seed, t0, 1, &mut csprng)
            .expect("encrypts");
        let extended_data = encrypted.contests[0]
            .extended_data
            .as_ref()
            .expect("write-in present");

        let s = keys.secret_as_field_element(&fp.field);
        let recovered = decrypt_write_ins(extended_data, "contest1", &s, &fp.group)
            .expect("decrypts");
        assert_eq!(recovered, vec![("sel1".to_string(), "Jane Doe".to_string())]);
    }

    #[test]
    fn no_write_ins_means_no_extended_data() {
        let (fp, internal, context, _keys) = setup();
        let mut csprng = Csprng::new(13);
        let device = EncryptionDevice {
            device_id: "dev1".to_string(),
            location: "precinct-1".to_string(),
            session_id: 1,
            launch_code: 55,
        };
        let t0 = device.initial_tracking_hash(0, &context, &fp.field);

        let ballot = PlaintextBallot {
            object_id: "ballot1".to_string(),
            style_id: "style1".to_string(),
            contests: vec![PlaintextBallotContest {
                object_id: "contest1".to_string(),
                selections: vec![
                    PlaintextBallotSelection {
                        object_id: "sel1".to_string(),
                        vote: 1,
                        write_in: None,
                    },
                    PlaintextBallotSelection {
                        object_id: "sel2".to_string(),
                        vote: 0,
                        write_in: None,
                    },
                ],
            }],
        };

        let seed = fp.field.random_field_elem(&mut csprng);
        let encrypted = encrypt_ballot(&ballot, &internal, &context, &fp, seed, t0, 1, &mut csprng)
            .expect("encrypts");
        assert!(encrypted.contests[0].extended_data.is_none());
    }
}
