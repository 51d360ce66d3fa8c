// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Homomorphic tally: every cast ballot's ciphertexts are folded into a single running
//! ciphertext per selection, never decrypted until the guardians' threshold decryption runs.
//! Accumulation is commutative and associative (it's the same `Zp` multiplication `Ciphertext`
//! uses for pairwise addition), so ballots can be applied in any order or batch and still reach
//! the same total; applying the same ballot id twice is a no-op rather than double-counting it.

use std::collections::{HashMap, HashSet};

use crate::ballot::{BallotState, SubmittedBallot};
use crate::el_gamal::Ciphertext;
use util::algebra::Group;

/// The running homomorphic sum of every cast ballot's selections, keyed by `(contest_id,
/// selection_id)`.
pub struct CiphertextTally {
    totals: HashMap<(String, String), Ciphertext>,
    applied_ballot_ids: HashSet<String>,
}

impl CiphertextTally {
    pub fn new() -> Self {
        CiphertextTally {
            totals: HashMap::new(),
            applied_ballot_ids: HashSet::new(),
        }
    }

    /// Folds `ballot` into the running totals. Ballots that aren't [`BallotState::Cast`] (e.g.
    /// spoiled ballots) are skipped; a ballot id already applied is skipped as well, so replaying
    /// the same submitted-ballot log more than once can't inflate the tally.
    pub fn accumulate(&mut self, ballot: &SubmittedBallot, group: &Group) {
        if ballot.state != BallotState::Cast {
            return;
        }
        if !self.applied_ballot_ids.insert(ballot.ballot.object_id.clone()) {
            return;
        }

        for contest in &ballot.ballot.contests {
            for selection in &contest.selections {
                let key = (contest.object_id.clone(), selection.object_id.clone());
                self.totals
                    .entry(key)
                    .and_modify(|total| *total = total.add(&selection.ciphertext, group))
                    .or_insert_with(|| selection.ciphertext.clone());
            }
        }
    }

    pub fn accumulate_all<'a>(
        &mut self,
        ballots: impl IntoIterator<Item = &'a SubmittedBallot>,
        group: &Group,
    ) {
        for ballot in ballots {
            self.accumulate(ballot, group);
        }
    }

    pub fn total(&self, contest_id: &str, selection_id: &str) -> Option<&Ciphertext> {
        self.totals
            .get(&(contest_id.to_string(), selection_id.to_string()))
    }

    pub fn ballot_count(&self) -> usize {
        self.applied_ballot_ids.len()
    }

    pub fn totals(&self) -> impl Iterator<Item = (&(String, String), &Ciphertext)> {
        self.totals.iter()
    }
}

impl Default for CiphertextTally {
    fn default() -> Self {
        Self::new()
    }
}
