// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Hashed ElGamal: hybrid encryption for payloads too large to live in the exponent (contest
//! extended data, guardian backups).
//!
//! `pad = g^R` carries the key-exchange; a KDF over `K^R` is stretched to a one-time pad XORed
//! with the (length-padded) plaintext; an HMAC-SHA256 under a second KDF-derived key
//! authenticates `pad || data`. Payload length is always padded up to a multiple of
//! [`BLOCK_SIZE_BYTES`] so that ciphertext length does not leak the true payload size.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use util::algebra::{FieldElement, Group, GroupElement};

use crate::errors::{EgError, EgResult};

/// Padded payloads are always a multiple of this many bytes.
pub const BLOCK_SIZE_BYTES: usize = 64;

/// Maximum payload this scheme will encode (keeps the 2-byte length prefix meaningful).
pub const MAX_PAYLOAD_BYTES: usize = u16::MAX as usize;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashedElGamalCiphertext {
    pub pad: GroupElement,
    pub data: Vec<u8>,
    pub mac: [u8; 32],
}

impl HashedElGamalCiphertext {
    /// Encrypts `payload` under public key `k` with nonce `r`, domain-separated by `seed`.
    ///
    /// `payload` is length-prefixed (2 bytes, big-endian) and zero-padded up to the next
    /// multiple of [`BLOCK_SIZE_BYTES`] before the stream cipher is applied, so the emitted
    /// `data` length depends only on the padded block count, not the exact payload length.
    pub fn encrypt(
        payload: &[u8],
        r: &FieldElement,
        k: &GroupElement,
        seed: &[u8],
        group: &Group,
    ) -> EgResult<Self> {
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(EgError::EncodingError {
                len: payload.len(),
                capacity: MAX_PAYLOAD_BYTES,
            });
        }

        let padded = pad_payload(payload);
        let pad = group.g_exp(r);
        let shared = k.exp(r, group);

        let (enc_key, mac_key) = derive_keys(&shared, seed);
        let stream = kdf_stream(&enc_key, padded.len());

        let data: Vec<u8> = padded
            .iter()
            .zip(stream.iter())
            .map(|(p, s)| p ^ s)
            .collect();

        let mac = compute_mac(&mac_key, &pad, &data)?;

        Ok(HashedElGamalCiphertext { pad, data, mac })
    }

    /// Decrypts and authenticates. Returns `None` on MAC mismatch or malformed length prefix.
    pub fn decrypt(&self, s: &FieldElement, seed: &[u8], group: &Group) -> Option<Vec<u8>> {
        let shared = self.pad.exp(s, group);
        let (enc_key, mac_key) = derive_keys(&shared, seed);

        let expected_mac = compute_mac(&mac_key, &self.pad, &self.data).ok()?;
        if !constant_time_eq(&expected_mac, &self.mac) {
            return None;
        }

        let stream = kdf_stream(&enc_key, self.data.len());
        let padded: Vec<u8> = self
            .data
            .iter()
            .zip(stream.iter())
            .map(|(d, s)| d ^ s)
            .collect();

        unpad_payload(&padded)
    }
}

fn pad_payload(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(BLOCK_SIZE_BYTES * 2);
    buf.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    buf.extend_from_slice(payload);
    let target = round_up(buf.len(), BLOCK_SIZE_BYTES);
    buf.resize(target, 0);
    buf
}

fn unpad_payload(padded: &[u8]) -> Option<Vec<u8>> {
    if padded.len() < 2 {
        return None;
    }
    let len = u16::from_be_bytes([padded[0], padded[1]]) as usize;
    if 2 + len > padded.len() {
        return None;
    }
    Some(padded[2..2 + len].to_vec())
}

fn round_up(n: usize, block: usize) -> usize {
    n.div_ceil(block) * block
}

fn derive_keys(shared: &GroupElement, seed: &[u8]) -> ([u8; 32], [u8; 32]) {
    let mut enc_hasher = Sha256::new();
    enc_hasher.update(b"eg-hashed-elgamal-enc");
    enc_hasher.update(seed);
    enc_hasher.update(shared.as_biguint().to_bytes_be());
    let enc_key: [u8; 32] = enc_hasher.finalize().into();

    let mut mac_hasher = Sha256::new();
    mac_hasher.update(b"eg-hashed-elgamal-mac");
    mac_hasher.update(seed);
    mac_hasher.update(shared.as_biguint().to_bytes_be());
    let mac_key: [u8; 32] = mac_hasher.finalize().into();

    (enc_key, mac_key)
}

/// Stretches a 32-byte key into a keystream of `len` bytes via counter-mode SHA-256.
fn kdf_stream(key: &[u8; 32], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut counter: u32 = 0;
    while out.len() < len {
        let mut hasher = Sha256::new();
        hasher.update(key);
        hasher.update(counter.to_be_bytes());
        out.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    out.truncate(len);
    out
}

fn compute_mac(mac_key: &[u8; 32], pad: &GroupElement, data: &[u8]) -> EgResult<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(mac_key).map_err(|_| EgError::EncodingError {
        len: mac_key.len(),
        capacity: 32,
    })?;
    mac.update(&pad.as_biguint().to_bytes_be());
    mac.update(data);
    let bytes = mac.finalize().into_bytes();
    let mut out = [0_u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
