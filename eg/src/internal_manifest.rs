// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! The manifest after placeholder generation and crypto-hash precomputation. Every encryption and
//! verification in this crate reads contest/selection hashes from here rather than recomputing
//! them from the raw `Manifest`, so a manifest edit is guaranteed to invalidate every ballot
//! encrypted against the old one (the hashes differ, so old proofs fail to verify).

use std::collections::HashMap;

use util::algebra::{FieldElement, ScalarField};

use crate::errors::{EgError, EgResult};
use crate::hash::{hash_elems, HashInput};
use crate::manifest::{ContestDescription, Manifest, SelectionDescription};

/// A placeholder selection absorbing one of a contest's undervoted slots. Encrypted exactly like
/// a real selection; its candidate id is synthetic and never shown to a voter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderSelection {
    pub object_id: String,
    pub sequence_order: u32,
}

pub struct InternalContest {
    pub description: ContestDescription,
    pub placeholders: Vec<PlaceholderSelection>,
    pub crypto_hash: FieldElement,
    selection_hashes: HashMap<String, FieldElement>,
}

impl InternalContest {
    pub fn selection_hash(&self, selection_object_id: &str) -> Option<&FieldElement> {
        self.selection_hashes.get(selection_object_id)
    }

    /// Total selections (real + placeholder) a ballot must encrypt for this contest: `M`.
    pub fn total_selection_count(&self) -> usize {
        self.description.ballot_selections.len() + self.placeholders.len()
    }
}

pub struct InternalManifest {
    pub manifest: Manifest,
    pub contests: Vec<InternalContest>,
}

impl InternalManifest {
    pub fn from_manifest(manifest: Manifest, field: &ScalarField) -> EgResult<Self> {
        manifest.validate()?;

        let contests = manifest
            .contests
            .iter()
            .map(|contest| build_internal_contest(contest, field))
            .collect();

        Ok(InternalManifest { manifest, contests })
    }

    pub fn contest(&self, object_id: &str) -> Option<&InternalContest> {
        self.contests
            .iter()
            .find(|c| c.description.object_id == object_id)
    }

    /// A digest over every contest's crypto-hash, in sequence order — the manifest hash folded
    /// into `CiphertextElectionContext`.
    pub fn manifest_hash(&self, field: &ScalarField) -> FieldElement {
        let mut sorted: Vec<&InternalContest> = self.contests.iter().collect();
        sorted.sort_by_key(|c| c.description.sequence_order);
        let items: Vec<HashInput<'_>> = sorted
            .iter()
            .map(|c| HashInput::Scalar(&c.crypto_hash))
            .collect();
        hash_elems(field, &[HashInput::Seq(items)])
    }
}

fn build_internal_contest(contest: &ContestDescription, field: &ScalarField) -> InternalContest {
    let n = contest.number_elected;
    let base = contest.ballot_selections.len() as u32;
    let placeholders: Vec<PlaceholderSelection> = (0..n)
        .map(|i| PlaceholderSelection {
            object_id: format!("{}-placeholder-{}", contest.object_id, i),
            sequence_order: base + i,
        })
        .collect();

    let mut selection_hashes = HashMap::new();
    for selection in &contest.ballot_selections {
        selection_hashes.insert(
            selection.object_id.clone(),
            selection_crypto_hash(selection, field),
        );
    }
    for placeholder in &placeholders {
        selection_hashes.insert(
            placeholder.object_id.clone(),
            placeholder_crypto_hash(placeholder, field),
        );
    }

    let mut ordered_selection_hashes: Vec<&FieldElement> = contest
        .ballot_selections
        .iter()
        .map(|s| &selection_hashes[&s.object_id])
        .collect();
    ordered_selection_hashes.extend(
        placeholders
            .iter()
            .map(|p| &selection_hashes[&p.object_id]),
    );

    let selection_items: Vec<HashInput<'_>> = ordered_selection_hashes
        .into_iter()
        .map(HashInput::Scalar)
        .collect();

    let crypto_hash = hash_elems(
        field,
        &[
            HashInput::Str(&contest.object_id),
            HashInput::Int(contest.sequence_order as u64),
            HashInput::Str(&contest.electoral_district_id),
            HashInput::Int(n as u64),
            HashInput::Int(contest.votes_allowed as u64),
            HashInput::Str(&contest.vote_variation.to_string()),
            HashInput::Seq(selection_items),
        ],
    );

    InternalContest {
        description: contest.clone(),
        placeholders,
        crypto_hash,
        selection_hashes,
    }
}

fn selection_crypto_hash(selection: &SelectionDescription, field: &ScalarField) -> FieldElement {
    hash_elems(
        field,
        &[
            HashInput::Str(&selection.object_id),
            HashInput::Int(selection.sequence_order as u64),
            HashInput::Str(&selection.candidate_id),
        ],
    )
}

fn placeholder_crypto_hash(
    placeholder: &PlaceholderSelection,
    field: &ScalarField,
) -> FieldElement {
    hash_elems(
        field,
        &[
            HashInput::Str(&placeholder.object_id),
            HashInput::Int(placeholder.sequence_order as u64),
            HashInput::Str("PLACEHOLDER"),
        ],
    )
}

impl InternalManifest {
    /// Convenience: fails with `InvalidManifest` if `contest_id` is unknown.
    pub fn require_contest(&self, contest_id: &str) -> EgResult<&InternalContest> {
        self.contest(contest_id)
            .ok_or_else(|| EgError::InvalidManifest(format!("unknown contest {contest_id}")))
    }
}
