// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! A process-wide, append-only cache mapping `g^m -> m` for small `m`.
//!
//! ElGamal decryption recovers `g^m` algebraically but needs the integer `m`. Since every `m` in
//! this protocol is a small vote count (bounded by the total number of ballots cast), the
//! discrete log is recovered by brute-force search from the last cached point rather than a
//! general discrete-log algorithm. The cache only ever grows, so readers never need to block on
//! a writer beyond the single `RwLock` acquisition.

use std::sync::RwLock;

use num_bigint::BigUint;
use num_traits::One;
use util::algebra::{Group, GroupElement};

/// Lazily-extended `g^m -> m` cache for one `Group`.
pub struct DiscreteLog {
    // Entry `i` holds `g^i`; the vector is extended monotonically.
    powers: RwLock<Vec<BigUint>>,
}

impl DiscreteLog {
    pub fn new() -> Self {
        DiscreteLog {
            powers: RwLock::new(vec![BigUint::one()]),
        }
    }

    /// Finds `m` such that `g^m == y`, extending the cache up to `max_m` if needed.
    ///
    /// Returns `None` if `y` is not `g^m` for any `0 <= m <= max_m`.
    pub fn find(&self, y: &GroupElement, group: &Group, max_m: u64) -> Option<u64> {
        let target = y.as_biguint();

        {
            let powers = self
                .powers
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(pos) = powers.iter().position(|p| p == target) {
                return Some(pos as u64);
            }
            if (powers.len() as u64) > max_m {
                return None;
            }
        }

        let mut powers = self
            .powers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Someone else may have extended the cache while we waited for the write lock.
        if let Some(pos) = powers.iter().position(|p| p == target) {
            return Some(pos as u64);
        }

        let g = group.generator();
        let mut m = (powers.len() as u64) - 1;

        while m < max_m {
            m += 1;
            let next = g.pow(m, group);
            powers.push(next.as_biguint().clone());
            if next.as_biguint() == target {
                return Some(m);
            }
        }

        None
    }
}

impl Default for DiscreteLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixed_parameters::FixedParameters;

    #[test]
    fn finds_small_exponents() {
        let fp = FixedParameters::test_params();
        let dlog = DiscreteLog::new();
        let g = fp.group.generator();

        for m in 0_u64..20 {
            let y = g.pow(m as u32, &fp.group);
            assert_eq!(dlog.find(&y, &fp.group, 100), Some(m));
        }
    }

    #[test]
    fn out_of_range_is_none() {
        let fp = FixedParameters::test_params();
        let dlog = DiscreteLog::new();
        let g = fp.group.generator();
        let y = g.pow(50_u32, &fp.group);
        assert_eq!(dlog.find(&y, &fp.group, 10), None);
    }
}
