// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Deterministic nonce derivation.
//!
//! Ballot encryption never draws nonces straight from a CSPRNG. Instead every nonce is derived
//! from a single per-ballot seed together with the indices that select the contest and selection
//! it belongs to, via [`hash_elems`]. This is what lets a voter's device re-derive the exact same
//! ciphertexts later (for verification, or for a "benaloh challenge" spoiled-ballot decryption)
//! without having persisted the nonces themselves.

use util::algebra::{FieldElement, ScalarField};

use crate::hash::{hash_elems, HashInput};

/// A source of deterministic, hash-derived nonces rooted at a single seed.
///
/// Construct one per ballot from the voter's master nonce, then derive a fresh [`FieldElement`]
/// for every ciphertext that needs one by extending the path with contest/selection indices.
#[derive(Clone, Debug)]
pub struct NonceSeed(FieldElement);

impl NonceSeed {
    /// Wraps a raw seed value (typically drawn from a CSPRNG once per ballot).
    pub fn new(seed: FieldElement) -> Self {
        NonceSeed(seed)
    }

    /// Derives the nonce for a particular path of u64 indices, e.g. `(contest_ix, selection_ix)`.
    ///
    /// Distinct paths are guaranteed to (with overwhelming probability) derive distinct nonces,
    /// and the same path always re-derives the same nonce.
    pub fn derive(&self, field: &ScalarField, path: &[u64]) -> FieldElement {
        let mut items = vec![HashInput::Scalar(&self.0)];
        items.extend(path.iter().map(|ix| HashInput::Int(*ix)));
        hash_elems(field, &items)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use num_bigint::BigUint;

    fn field() -> ScalarField {
        ScalarField::new_unchecked(BigUint::from(127_u32))
    }

    #[test]
    fn same_path_same_nonce() {
        let field = field();
        let seed = NonceSeed::new(FieldElement::from(42_u32, &field));
        assert_eq!(seed.derive(&field, &[1, 2]), seed.derive(&field, &[1, 2]));
    }

    #[test]
    fn distinct_paths_distinct_nonces() {
        let field = field();
        let seed = NonceSeed::new(FieldElement::from(42_u32, &field));
        assert_ne!(seed.derive(&field, &[1, 2]), seed.derive(&field, &[1, 3]));
        assert_ne!(seed.derive(&field, &[1, 2]), seed.derive(&field, &[2, 2]));
    }

    #[test]
    fn distinct_seeds_distinct_nonces() {
        let field = field();
        let a = NonceSeed::new(FieldElement::from(42_u32, &field));
        let b = NonceSeed::new(FieldElement::from(43_u32, &field));
        assert_ne!(a.derive(&field, &[1, 2]), b.derive(&field, &[1, 2]));
    }
}
