// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! One guardian's key-ceremony and decryption-time state.
//!
//! A guardian holds two secrets: the coefficients of its election-key polynomial (`polynomial`,
//! grounded on [`crate::polynomial`]), and an auxiliary ElGamal key pair used only to receive
//! other guardians' encrypted backups. Backups it receives from peers are decrypted and kept
//! (never the peer's raw polynomial) so that, at decryption time, this guardian can compute a
//! compensated share on behalf of any one peer who goes missing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use util::algebra::{FieldElement, Group, GroupElement, ScalarField};
use util::csprng::Csprng;

use crate::el_gamal::Ciphertext;
use crate::errors::{EgError, EgResult};
use crate::hashed_el_gamal::HashedElGamalCiphertext;
use crate::polynomial::{CoefficientCommitments, SecretPolynomial};
use crate::zk::DecryptionProof;

/// What a guardian publishes during the Join/Announce phases of the key ceremony.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub guardian_id: String,
    pub sequence_order: u32,
    pub commitments: CoefficientCommitments,
    pub auxiliary_public_key: GroupElement,
}

/// A scalar backup `P_i(j)`, hashed-ElGamal-encrypted so only guardian `j` can read it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedBackup {
    pub sender: u32,
    pub recipient: u32,
    pub ciphertext: HashedElGamalCiphertext,
}

const BACKUP_SEED: &[u8] = b"eg-key-ceremony-backup";

pub struct Guardian {
    pub guardian_id: String,
    pub sequence_order: u32,
    polynomial: SecretPolynomial,
    pub commitments: CoefficientCommitments,
    auxiliary_secret: FieldElement,
    pub auxiliary_public_key: GroupElement,
    peer_commitments: HashMap<u32, CoefficientCommitments>,
    /// Backups received from peers, decrypted: `sender sequence -> P_sender(self)`.
    received_backups: HashMap<u32, FieldElement>,
}

impl Guardian {
    pub fn new(
        guardian_id: impl Into<String>,
        sequence_order: u32,
        k: u32,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
        csprng: &mut Csprng,
    ) -> Self {
        let polynomial = SecretPolynomial::generate(k, field, csprng);
        let commitments = polynomial.commit(qbar, group, field, csprng);
        let auxiliary_secret = field.random_field_elem(csprng);
        let auxiliary_public_key = group.g_exp(&auxiliary_secret);

        Guardian {
            guardian_id: guardian_id.into(),
            sequence_order,
            polynomial,
            commitments,
            auxiliary_secret,
            auxiliary_public_key,
            peer_commitments: HashMap::new(),
            received_backups: HashMap::new(),
        }
    }

    pub fn announcement(&self) -> Announcement {
        Announcement {
            guardian_id: self.guardian_id.clone(),
            sequence_order: self.sequence_order,
            commitments: self.commitments.clone(),
            auxiliary_public_key: self.auxiliary_public_key.clone(),
        }
    }

    /// Verifies and stores a peer's announced commitments. Called once per peer during Announce.
    pub fn store_peer_announcement(
        &mut self,
        ann: &Announcement,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
    ) -> EgResult<()> {
        ann.commitments.verify_self_consistent(qbar, group, field)?;
        self.peer_commitments
            .insert(ann.sequence_order, ann.commitments.clone());
        Ok(())
    }

    /// Computes and encrypts this guardian's backup for `recipient`.
    pub fn make_backup(
        &self,
        recipient: &Announcement,
        field: &ScalarField,
        group: &Group,
        csprng: &mut Csprng,
    ) -> EgResult<EncryptedBackup> {
        let p_value = self.polynomial.value_at(recipient.sequence_order, field);
        let r = field.random_field_elem(csprng);
        let ciphertext = HashedElGamalCiphertext::encrypt(
            &p_value.to_32_be_bytes(),
            &r,
            &recipient.auxiliary_public_key,
            BACKUP_SEED,
            group,
        )?;
        Ok(EncryptedBackup {
            sender: self.sequence_order,
            recipient: recipient.sequence_order,
            ciphertext,
        })
    }

    /// Decrypts and verifies an incoming backup against the sender's announced commitments.
    /// Stores it for later compensated-decryption use only if it verifies.
    pub fn receive_backup(
        &mut self,
        backup: &EncryptedBackup,
        field: &ScalarField,
        group: &Group,
    ) -> EgResult<()> {
        let plaintext = backup
            .ciphertext
            .decrypt(&self.auxiliary_secret, BACKUP_SEED, group)
            .ok_or(EgError::VerificationFailed {
                sender: backup.sender,
                recipient: backup.recipient,
            })?;
        let p_value = FieldElement::from_bytes_be(&plaintext, field);

        let sender_commitments = self.peer_commitments.get(&backup.sender).ok_or(
            EgError::VerificationFailed {
                sender: backup.sender,
                recipient: backup.recipient,
            },
        )?;
        if !sender_commitments.verify_backup(self.sequence_order, &p_value, group, field) {
            return Err(EgError::VerificationFailed {
                sender: backup.sender,
                recipient: backup.recipient,
            });
        }

        self.received_backups.insert(backup.sender, p_value);
        Ok(())
    }

    /// This guardian's share `s_i` of the joint election secret.
    pub fn election_secret_share(&self) -> &FieldElement {
        self.polynomial.secret_coefficient()
    }

    /// `K_i = g^{s_i}`, this guardian's contribution to the joint public key.
    pub fn election_public_key(&self) -> EgResult<&GroupElement> {
        self.commitments.public_key()
    }

    /// A direct decryption share `M_i = alpha^{s_i}` with its Chaum-Pedersen proof.
    pub fn decryption_share(
        &self,
        ct: &Ciphertext,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
        csprng: &mut Csprng,
    ) -> EgResult<(GroupElement, DecryptionProof)> {
        let s_i = self.election_secret_share();
        let share = ct.alpha.exp(s_i, group);
        let proof = DecryptionProof::prove(ct, s_i, &share, qbar, group, field, csprng);
        Ok((share, proof))
    }

    /// A compensated share standing in for `missing` guardian, using the backup `missing` sent
    /// this guardian during the ceremony. Fails if no such backup was ever received/verified.
    pub fn compensated_share(
        &self,
        missing: u32,
        ct: &Ciphertext,
        qbar: &FieldElement,
        group: &Group,
        field: &ScalarField,
        csprng: &mut Csprng,
    ) -> EgResult<(GroupElement, GroupElement, DecryptionProof)> {
        let p_missing_at_self =
            self.received_backups
                .get(&missing)
                .ok_or(EgError::VerificationFailed {
                    sender: missing,
                    recipient: self.sequence_order,
                })?;
        let recovery_key = group.g_exp(p_missing_at_self);
        let share = ct.alpha.exp(p_missing_at_self, group);
        let proof = DecryptionProof::prove(
            ct,
            p_missing_at_self,
            &share,
            qbar,
            group,
            field,
            csprng,
        );
        Ok((recovery_key, share, proof))
    }
}
