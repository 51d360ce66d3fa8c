// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! The error type shared by every fallible operation in this crate.
//!
//! Cryptographic primitives (`el_gamal`, `zk`, `hash`) never return `EgError` themselves —
//! they signal failure with `None`/`bool` and let the caller decide policy, per the crate's
//! error-handling design. `EgError` is reserved for the mediator/ballot-box/key-ceremony layers,
//! which have enough context to name exactly what went wrong.

use thiserror::Error;

/// Identifies which proof failed verification, for diagnostic purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum ProofKind {
    Schnorr,
    DisjunctiveChaumPedersen,
    ConstantChaumPedersen,
    Decryption,
    CompensatedDecryption,
    BackupVerification,
}

/// The main [`std::error::Error`] type returned by functions of the `eg` crate.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EgError {
    #[error("value {value} is out of range for {what} (expected 0 <= x < {modulus})")]
    OutOfRange {
        what: &'static str,
        value: String,
        modulus: String,
    },

    #[error("element claimed for {what} is not a member of the q-order subgroup")]
    NotInSubgroup { what: &'static str },

    #[error("{proof} proof failed to verify at {object_id}")]
    InvalidProof {
        proof: ProofKind,
        object_id: String,
    },

    #[error("ballot {ballot_id} is invalid: {reason}")]
    BallotInvalid { ballot_id: String, reason: String },

    #[error("illegal state transition: {0}")]
    StateViolation(String),

    #[error("decryption requires at least {k} guardians but only {present} are present")]
    InsufficientQuorum { k: u32, present: u32 },

    #[error("guardian {recipient} rejected the backup sent by guardian {sender}")]
    VerificationFailed { sender: u32, recipient: u32 },

    #[error("extended data of {len} bytes exceeds the padded capacity of {capacity} bytes")]
    EncodingError { len: usize, capacity: usize },

    #[error("election parameter variant mismatch: expected {expected}, found {found}")]
    ParameterVariantMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("manifest is invalid: {0}")]
    InvalidManifest(String),
}

/// [`Result`](std::result::Result) type with an [`EgError`].
pub type EgResult<T> = Result<T, EgError>;
