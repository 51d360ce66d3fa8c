// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Exponential ElGamal over the working subgroup.
//!
//! Plaintexts are small non-negative integers (a selection vote, or a contest's running sum);
//! they are always recovered from the exponent via the [`crate::discrete_log::DiscreteLog`]
//! cache rather than encoded directly, which is what makes the scheme additively homomorphic.

use serde::{Deserialize, Serialize};
use util::algebra::{FieldElement, Group, GroupElement, ScalarField};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::discrete_log::DiscreteLog;

/// A guardian or election secret key `s`, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ElGamalSecretKey(FieldElementBytes);

// `FieldElement` itself doesn't implement `Zeroize` (it wraps a `BigUint`, which doesn't either),
// so the secret is additionally mirrored into a fixed byte buffer that can be zeroized reliably.
// The `FieldElement` copy lives only as long as needed to compute with it.
type FieldElementBytes = [u8; 32];

impl ElGamalSecretKey {
    fn to_field_element(&self, field: &ScalarField) -> FieldElement {
        FieldElement::from_bytes_be(&self.0, field)
    }
}

/// An ElGamal key pair `(s, g^s)`.
pub struct ElGamalKeyPair {
    secret: ElGamalSecretKey,
    pub public_key: GroupElement,
}

impl ElGamalKeyPair {
    /// Builds a key pair from a secret scalar. Rejects `s` in `{0, 1}`, which would produce a
    /// degenerate or easily-guessed public key.
    pub fn from_secret(s: FieldElement, group: &Group) -> Option<Self> {
        if s.is_zero() || s == ScalarField::one() {
            return None;
        }
        let public_key = group.g_exp(&s);
        let mut bytes = [0_u8; 32];
        let be = s.to_32_be_bytes();
        bytes.copy_from_slice(&be);
        Some(ElGamalKeyPair {
            secret: ElGamalSecretKey(bytes),
            public_key,
        })
    }

    pub fn secret_as_field_element(&self, field: &ScalarField) -> FieldElement {
        self.secret.to_field_element(field)
    }
}

/// An exponential-ElGamal ciphertext `(alpha, beta) = (g^R, K^R * g^m)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ciphertext {
    pub alpha: GroupElement,
    pub beta: GroupElement,
}

impl Ciphertext {
    /// Encrypts `m` under public key `k` with nonce `r`. Rejects `r = 0`.
    pub fn encrypt(m: u64, r: &FieldElement, k: &GroupElement, group: &Group) -> Option<Self> {
        if r.is_zero() {
            return None;
        }
        let alpha = group.g_exp(r);
        let k_r = k.exp(r, group);
        let g_m = group.generator().pow(m, group);
        let beta = k_r.mul(&g_m, group);
        Some(Ciphertext { alpha, beta })
    }

    /// Recovers `g^m` given the secret key, then inverts the discrete log via `dlog`.
    pub fn decrypt_known_secret(
        &self,
        s: &FieldElement,
        group: &Group,
        dlog: &DiscreteLog,
        max_m: u64,
    ) -> Option<u64> {
        let alpha_s = self.alpha.exp(s, group);
        let alpha_s_inv = alpha_s.inv(group)?;
        let g_m = self.beta.mul(&alpha_s_inv, group);
        dlog.find(&g_m, group, max_m)
    }

    /// Recovers `g^m` given the encryption nonce and public key (used by the original encryptor
    /// to audit its own ciphertext without needing the secret key).
    pub fn decrypt_known_nonce(
        &self,
        r: &FieldElement,
        k: &GroupElement,
        group: &Group,
        dlog: &DiscreteLog,
        max_m: u64,
    ) -> Option<u64> {
        let k_r = k.exp(r, group);
        let k_r_inv = k_r.inv(group)?;
        let g_m = self.beta.mul(&k_r_inv, group);
        dlog.find(&g_m, group, max_m)
    }

    /// Homomorphic addition: component-wise multiplication in `Zp`.
    pub fn add(&self, other: &Ciphertext, group: &Group) -> Ciphertext {
        Ciphertext {
            alpha: self.alpha.mul(&other.alpha, group),
            beta: self.beta.mul(&other.beta, group),
        }
    }

    /// Sums a non-empty list of ciphertexts homomorphically.
    pub fn sum<'a>(cs: impl IntoIterator<Item = &'a Ciphertext>, group: &Group) -> Option<Ciphertext> {
        let mut it = cs.into_iter();
        let first = it.next()?.clone();
        Some(it.fold(first, |acc, c| acc.add(c, group)))
    }
}
