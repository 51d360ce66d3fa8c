// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Domain-separated hashing of heterogeneous inputs into `Z_q`.
//!
//! `hash_elems` is the only hash construction used throughout proofs and the ballot tracking
//! chain. Every argument is first turned into a [`HashInput`], then serialized with a fixed,
//! bit-exact encoding, then reduced with SHA-256. Picking a single [`HashInput`] sum type (rather
//! than a `Box<dyn Display>`-style heterogeneous argument list) keeps the wire format honest:
//! there is exactly one way to encode each kind of value.

use sha2::{Digest, Sha256};
use util::algebra::{FieldElement, GroupElement, ScalarField};

pub const HVALUE_BYTE_LEN: usize = 32;
pub type HValueByteArray = [u8; HVALUE_BYTE_LEN];

/// A 256-bit hash output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, zeroize::Zeroize, zeroize::ZeroizeOnDrop)]
pub struct HValue(pub HValueByteArray);

impl HValue {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for HValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::fmt::Display for HValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl From<HValueByteArray> for HValue {
    fn from(value: HValueByteArray) -> Self {
        HValue(value)
    }
}

/// A single value to be folded into a [`hash_elems`] digest.
///
/// This is the sum type the ElectionGuard hash-input encoding has historically lacked: rather
/// than accepting any `Display`-able argument, every caller must say exactly what kind of thing
/// it is passing so the serialization is unambiguous.
pub enum HashInput<'a> {
    Null,
    Str(&'a str),
    Int(u64),
    Scalar(&'a FieldElement),
    GroupElem(&'a GroupElement),
    Hash(&'a HValue),
    Seq(Vec<HashInput<'a>>),
}

impl<'a> From<&'a str> for HashInput<'a> {
    fn from(s: &'a str) -> Self {
        HashInput::Str(s)
    }
}

impl From<u64> for HashInput<'_> {
    fn from(n: u64) -> Self {
        HashInput::Int(n)
    }
}

impl<'a> From<&'a FieldElement> for HashInput<'a> {
    fn from(fe: &'a FieldElement) -> Self {
        HashInput::Scalar(fe)
    }
}

impl<'a> From<&'a GroupElement> for HashInput<'a> {
    fn from(ge: &'a GroupElement) -> Self {
        HashInput::GroupElem(ge)
    }
}

impl<'a> From<&'a HValue> for HashInput<'a> {
    fn from(hv: &'a HValue) -> Self {
        HashInput::Hash(hv)
    }
}

impl<'a, T> From<Option<T>> for HashInput<'a>
where
    T: Into<HashInput<'a>>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            None => HashInput::Null,
            Some(v) => v.into(),
        }
    }
}

const DELIM: u8 = b'|';

/// Appends the canonical encoding of `input` to `buf`.
///
/// - Strings and integers are written as their natural UTF-8/decimal text.
/// - Group elements are the uppercase hex of their integer value.
/// - `None`/absent values encode as the literal text `null`.
/// - Sequences are wrapped as `[<len>:elem|elem|...]` so that an empty sequence cannot be
///   confused with the absence of an argument, and so truncation cannot create ambiguity with
///   neighboring fields.
fn encode_into(buf: &mut Vec<u8>, input: &HashInput<'_>) {
    match input {
        HashInput::Null => buf.extend_from_slice(b"null"),
        HashInput::Str(s) => buf.extend_from_slice(s.as_bytes()),
        HashInput::Int(n) => buf.extend_from_slice(n.to_string().as_bytes()),
        HashInput::Scalar(fe) => {
            let mut s = fe.value().to_str_radix(16);
            s.make_ascii_uppercase();
            buf.extend_from_slice(s.as_bytes());
        }
        HashInput::GroupElem(ge) => {
            let mut s = ge.as_biguint().to_str_radix(16);
            s.make_ascii_uppercase();
            buf.extend_from_slice(s.as_bytes());
        }
        HashInput::Hash(hv) => buf.extend_from_slice(hv.to_string().as_bytes()),
        HashInput::Seq(items) => {
            buf.push(b'[');
            buf.extend_from_slice(items.len().to_string().as_bytes());
            buf.push(b':');
            for (ix, item) in items.iter().enumerate() {
                if ix != 0 {
                    buf.push(DELIM);
                }
                encode_into(buf, item);
            }
            buf.push(b']');
        }
    }
    buf.push(DELIM);
}

/// Computes SHA-256 over the canonical encoding of `items`, reduced modulo `q`.
///
/// This is the `hash_elems(*args)` function of the specification: the only hash construction
/// used throughout proofs and the ballot tracking chain.
pub fn hash_elems(field: &ScalarField, items: &[HashInput<'_>]) -> FieldElement {
    let mut buf = Vec::new();
    for item in items {
        encode_into(&mut buf, item);
    }
    let digest = Sha256::digest(&buf);
    FieldElement::from_bytes_be(digest.as_slice(), field)
}

/// Convenience entry point: hash a tuple-like list of `impl Into<HashInput>` values.
#[macro_export]
macro_rules! hash_elems {
    ($field:expr, $($x:expr),* $(,)?) => {
        $crate::hash::hash_elems($field, &[$( $crate::hash::HashInput::from($x) ),*])
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use num_bigint::BigUint;

    fn field() -> ScalarField {
        ScalarField::new_unchecked(BigUint::from(127_u32))
    }

    #[test]
    fn deterministic() {
        let field = field();
        let a = hash_elems(&field, &[HashInput::Str("x"), HashInput::Int(5)]);
        let b = hash_elems(&field, &[HashInput::Str("x"), HashInput::Int(5)]);
        assert_eq!(a, b);
    }

    #[test]
    fn distinguishes_inputs() {
        let field = field();
        let a = hash_elems(&field, &[HashInput::Str("x"), HashInput::Int(5)]);
        let b = hash_elems(&field, &[HashInput::Str("x"), HashInput::Int(6)]);
        assert_ne!(a, b);
    }

    #[test]
    fn null_is_distinct_from_absent_arg() {
        let field = field();
        let with_null = hash_elems(&field, &[HashInput::Str("x"), HashInput::Null]);
        let without = hash_elems(&field, &[HashInput::Str("x")]);
        assert_ne!(with_null, without);
    }

    #[test]
    fn sequences_are_wrapped() {
        let field = field();
        let seq = hash_elems(
            &field,
            &[HashInput::Seq(vec![HashInput::Int(1), HashInput::Int(2)])],
        );
        let flat = hash_elems(&field, &[HashInput::Int(1), HashInput::Int(2)]);
        assert_ne!(seq, flat);
    }

    #[test]
    fn macro_matches_manual_call() {
        let field = field();
        let a = hash_elems!(&field, "x", 5_u64);
        let b = hash_elems(&field, &[HashInput::Str("x"), HashInput::Int(5)]);
        assert_eq!(a, b);
    }
}
