// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! The ballot box: the `UNKNOWN -> CAST | SPOILED` state machine every encrypted ballot passes
//! through exactly once. A ballot that fails its own proofs, or that repeats an already-submitted
//! id, never enters the box at all.

use std::collections::HashMap;

use crate::ballot::{BallotState, EncryptedBallot, SubmittedBallot};
use crate::context::CiphertextElectionContext;
use crate::errors::{EgError, EgResult};
use crate::fixed_parameters::FixedParameters;
use crate::internal_manifest::InternalManifest;

/// An append-only store of submitted ballots, keyed by ballot id. A ballot id is accepted at
/// most once, either as cast or as spoiled; resubmitting the same id under any state is
/// rejected rather than silently overwritten.
#[derive(Default)]
pub struct BallotBox {
    submitted: HashMap<String, SubmittedBallot>,
}

impl BallotBox {
    pub fn new() -> Self {
        BallotBox::default()
    }

    /// Verifies `ballot`'s encryption and records it as cast.
    pub fn cast(
        &mut self,
        ballot: EncryptedBallot,
        context: &CiphertextElectionContext,
        fixed_parameters: &FixedParameters,
        manifest: &InternalManifest,
    ) -> EgResult<()> {
        self.accept(ballot, BallotState::Cast, context, fixed_parameters, manifest)
    }

    /// Verifies `ballot`'s encryption and records it as spoiled (challenged for a benaloh-style
    /// decryption, rather than counted in the tally).
    pub fn spoil(
        &mut self,
        ballot: EncryptedBallot,
        context: &CiphertextElectionContext,
        fixed_parameters: &FixedParameters,
        manifest: &InternalManifest,
    ) -> EgResult<()> {
        self.accept(ballot, BallotState::Spoiled, context, fixed_parameters, manifest)
    }

    fn accept(
        &mut self,
        ballot: EncryptedBallot,
        state: BallotState,
        context: &CiphertextElectionContext,
        fixed_parameters: &FixedParameters,
        manifest: &InternalManifest,
    ) -> EgResult<()> {
        if self.submitted.contains_key(&ballot.object_id) {
            return Err(EgError::BallotInvalid {
                ballot_id: ballot.object_id,
                reason: "ballot id already submitted".to_string(),
            });
        }
        ballot.is_valid_encryption(context, fixed_parameters, manifest)?;

        let submitted = SubmittedBallot::strip(ballot, state);
        self.submitted
            .insert(submitted.ballot.object_id.clone(), submitted);
        Ok(())
    }

    pub fn get(&self, ballot_id: &str) -> Option<&SubmittedBallot> {
        self.submitted.get(ballot_id)
    }

    pub fn cast_ballots(&self) -> impl Iterator<Item = &SubmittedBallot> {
        self.submitted
            .values()
            .filter(|b| b.state == BallotState::Cast)
    }

    pub fn spoiled_ballots(&self) -> impl Iterator<Item = &SubmittedBallot> {
        self.submitted
            .values()
            .filter(|b| b.state == BallotState::Spoiled)
    }

    pub fn len(&self) -> usize {
        self.submitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submitted.is_empty()
    }
}
