// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! The read-only election structure: geopolitical units, parties, candidates, contests, and
//! ballot styles. `Manifest` round-trips directly to the JSON shape published alongside every
//! election record; [`crate::internal_manifest::InternalManifest`] is what the rest of the crate
//! actually computes over.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{EgError, EgResult};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeopoliticalUnit {
    pub object_id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Party {
    pub object_id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub object_id: String,
    pub name: String,
}

/// Which vote variations are in scope: a single winner, or up to `votes_allowed` of `m`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, strum_macros::Display)]
pub enum VoteVariation {
    #[serde(rename = "one_of_m")]
    OneOfM,
    #[serde(rename = "n_of_m")]
    NOfM,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionDescription {
    pub object_id: String,
    pub sequence_order: u32,
    pub candidate_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContestDescription {
    pub object_id: String,
    pub sequence_order: u32,
    pub electoral_district_id: String,
    pub vote_variation: VoteVariation,
    /// N: number of selections a valid ballot affirmatively marks.
    pub number_elected: u32,
    /// M: total selections a voter may mark (>= `number_elected`).
    pub votes_allowed: u32,
    pub name: String,
    pub ballot_selections: Vec<SelectionDescription>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BallotStyle {
    pub object_id: String,
    pub geopolitical_unit_ids: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub election_scope_id: String,
    pub spec_version: String,
    #[serde(rename = "type")]
    pub election_type: String,
    pub start_date: String,
    pub end_date: String,
    pub geopolitical_units: Vec<GeopoliticalUnit>,
    pub parties: Vec<Party>,
    pub candidates: Vec<Candidate>,
    pub contests: Vec<ContestDescription>,
    pub ballot_styles: Vec<BallotStyle>,
}

impl Manifest {
    /// Non-empty contests, `votes_allowed >= number_elected`, and unique object ids throughout —
    /// checked once here rather than re-validated by every downstream reader.
    pub fn validate(&self) -> EgResult<()> {
        if self.contests.is_empty() {
            return Err(EgError::InvalidManifest(
                "manifest has no contests".to_string(),
            ));
        }

        let mut seen_ids: HashSet<&str> = HashSet::new();
        let mut insert_unique = |id: &str| -> EgResult<()> {
            if !seen_ids.insert(id) {
                return Err(EgError::InvalidManifest(format!(
                    "duplicate object id {id}"
                )));
            }
            Ok(())
        };

        for gpu in &self.geopolitical_units {
            insert_unique(&gpu.object_id)?;
        }
        for party in &self.parties {
            insert_unique(&party.object_id)?;
        }
        for candidate in &self.candidates {
            insert_unique(&candidate.object_id)?;
        }
        for style in &self.ballot_styles {
            insert_unique(&style.object_id)?;
        }

        for contest in &self.contests {
            insert_unique(&contest.object_id)?;
            if contest.votes_allowed < contest.number_elected {
                return Err(EgError::InvalidManifest(format!(
                    "contest {} has votes_allowed {} < number_elected {}",
                    contest.object_id, contest.votes_allowed, contest.number_elected
                )));
            }
            if contest.ballot_selections.is_empty() {
                return Err(EgError::InvalidManifest(format!(
                    "contest {} has no selections",
                    contest.object_id
                )));
            }
            for selection in &contest.ballot_selections {
                insert_unique(&selection.object_id)?;
            }
        }

        Ok(())
    }
}
