// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! The key-ceremony mediator: a stateless router that only ever advances through the six phases
//! below, never retried partially. Each phase is its own enum variant carrying exactly the data
//! collected so far, so a caller cannot, say, submit a backup before every guardian has joined —
//! the method to do so does not exist on that variant.

use util::algebra::{FieldElement, Group, GroupElement, ScalarField};

use crate::errors::{EgError, EgResult};
use crate::guardian::{Announcement, EncryptedBackup};
use crate::hash::{hash_elems, HashInput};

/// A verification outcome published by a recipient for one incoming backup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verification {
    pub sender: u32,
    pub recipient: u32,
    pub ok: bool,
}

/// The mediator's progress through the key ceremony.
pub enum CeremonyState {
    Joining {
        announcements: Vec<Announcement>,
    },
    Announcing {
        announcements: Vec<Announcement>,
    },
    MakingBackups {
        announcements: Vec<Announcement>,
        backups: Vec<EncryptedBackup>,
    },
    SharingBackups {
        announcements: Vec<Announcement>,
        backups: Vec<EncryptedBackup>,
    },
    VerifyingBackups {
        announcements: Vec<Announcement>,
        verifications: Vec<Verification>,
    },
    Complete {
        announcements: Vec<Announcement>,
        joint_key: GroupElement,
        commitment_hash: FieldElement,
    },
}

pub struct KeyCeremonyMediator {
    n: u32,
    state: CeremonyState,
}

impl KeyCeremonyMediator {
    pub fn new(n: u32) -> Self {
        KeyCeremonyMediator {
            n,
            state: CeremonyState::Joining {
                announcements: Vec::new(),
            },
        }
    }

    pub fn state(&self) -> &CeremonyState {
        &self.state
    }

    /// Phase 1 (Join): records one guardian's announcement.
    pub fn submit_announcement(&mut self, ann: Announcement) -> EgResult<()> {
        match &mut self.state {
            CeremonyState::Joining { announcements } => {
                announcements.push(ann);
                Ok(())
            }
            _ => Err(EgError::StateViolation(
                "announcements are only accepted while joining".to_string(),
            )),
        }
    }

    /// Gate: all `n` guardians announced. Returns the full list for distribution (Phase 2).
    pub fn advance_to_announcing(&mut self) -> EgResult<Vec<Announcement>> {
        match &self.state {
            CeremonyState::Joining { announcements } if announcements.len() as u32 == self.n => {
                let announcements = announcements.clone();
                self.state = CeremonyState::Announcing {
                    announcements: announcements.clone(),
                };
                tracing::info!(phase = "announcing", "ceremony advanced");
                Ok(announcements)
            }
            CeremonyState::Joining { announcements } => Err(EgError::StateViolation(format!(
                "expected {} announcements, have {}",
                self.n,
                announcements.len()
            ))),
            _ => Err(EgError::StateViolation(
                "not in the joining phase".to_string(),
            )),
        }
    }

    /// Phase 2 -> Phase 3: every guardian has verified and stored its peers' commitments.
    pub fn advance_to_making_backups(&mut self) -> EgResult<()> {
        match std::mem::replace(
            &mut self.state,
            CeremonyState::Joining {
                announcements: Vec::new(),
            },
        ) {
            CeremonyState::Announcing { announcements } => {
                self.state = CeremonyState::MakingBackups {
                    announcements,
                    backups: Vec::new(),
                };
                tracing::info!(phase = "making_backups", "ceremony advanced");
                Ok(())
            }
            other => {
                self.state = other;
                Err(EgError::StateViolation(
                    "not in the announcing phase".to_string(),
                ))
            }
        }
    }

    /// Phase 3/4: the mediator simply collects every `B_{i->j}` it is handed.
    pub fn submit_backup(&mut self, backup: EncryptedBackup) -> EgResult<()> {
        match &mut self.state {
            CeremonyState::MakingBackups { backups, .. } => {
                backups.push(backup);
                Ok(())
            }
            _ => Err(EgError::StateViolation(
                "backups are only accepted while making backups".to_string(),
            )),
        }
    }

    /// Gate: `n * (n - 1)` backups collected. Returns them for distribution (Phase 4 proper).
    pub fn advance_to_sharing_backups(&mut self) -> EgResult<Vec<EncryptedBackup>> {
        let expected = self.n * self.n.saturating_sub(1);
        match std::mem::replace(
            &mut self.state,
            CeremonyState::Joining {
                announcements: Vec::new(),
            },
        ) {
            CeremonyState::MakingBackups {
                announcements,
                backups,
            } if backups.len() as u32 == expected => {
                let out = backups.clone();
                self.state = CeremonyState::SharingBackups {
                    announcements,
                    backups,
                };
                tracing::info!(phase = "sharing_backups", "ceremony advanced");
                Ok(out)
            }
            other @ CeremonyState::MakingBackups { .. } => {
                self.state = other;
                Err(EgError::StateViolation(format!(
                    "expected {expected} backups"
                )))
            }
            other => {
                self.state = other;
                Err(EgError::StateViolation(
                    "not in the making-backups phase".to_string(),
                ))
            }
        }
    }

    /// Phase 4 -> Phase 5: recipients have received and are now verifying their backups.
    pub fn advance_to_verifying_backups(&mut self) -> EgResult<()> {
        match std::mem::replace(
            &mut self.state,
            CeremonyState::Joining {
                announcements: Vec::new(),
            },
        ) {
            CeremonyState::SharingBackups { announcements, .. } => {
                self.state = CeremonyState::VerifyingBackups {
                    announcements,
                    verifications: Vec::new(),
                };
                tracing::info!(phase = "verifying_backups", "ceremony advanced");
                Ok(())
            }
            other => {
                self.state = other;
                Err(EgError::StateViolation(
                    "not in the sharing-backups phase".to_string(),
                ))
            }
        }
    }

    /// Phase 5: each recipient publishes a pass/fail verdict for one incoming backup.
    pub fn submit_verification(&mut self, v: Verification) -> EgResult<()> {
        match &mut self.state {
            CeremonyState::VerifyingBackups { verifications, .. } => {
                verifications.push(v);
                Ok(())
            }
            _ => Err(EgError::StateViolation(
                "verifications are only accepted while verifying backups".to_string(),
            )),
        }
    }

    /// Phase 6: gate is `n * (n - 1)` verifications, all `true` (any challenge must have already
    /// cleared before being resubmitted as `ok: true`). Computes and publishes `K` and the
    /// commitment hash.
    pub fn finalize(&mut self, field: &ScalarField, group: &Group) -> EgResult<()> {
        let expected = self.n * self.n.saturating_sub(1);
        match std::mem::replace(
            &mut self.state,
            CeremonyState::Joining {
                announcements: Vec::new(),
            },
        ) {
            CeremonyState::VerifyingBackups {
                announcements,
                verifications,
            } => {
                if verifications.len() as u32 != expected {
                    let count = verifications.len() as u32;
                    self.state = CeremonyState::VerifyingBackups {
                        announcements,
                        verifications,
                    };
                    return Err(EgError::StateViolation(format!(
                        "expected {expected} verifications, have {count}"
                    )));
                }
                if let Some(bad) = verifications.iter().find(|v| !v.ok) {
                    let (sender, recipient) = (bad.sender, bad.recipient);
                    self.state = CeremonyState::VerifyingBackups {
                        announcements,
                        verifications,
                    };
                    return Err(EgError::VerificationFailed { sender, recipient });
                }

                let mut sorted = announcements.clone();
                sorted.sort_by_key(|a| a.sequence_order);

                let mut joint_key = Group::one();
                for ann in &sorted {
                    let k_i = ann.commitments.public_key()?;
                    joint_key = joint_key.mul(k_i, group);
                }

                let commitment_hashes: Vec<FieldElement> = sorted
                    .iter()
                    .map(|a| a.commitments.commitment_hash(field))
                    .collect();
                let hash_items: Vec<HashInput<'_>> =
                    commitment_hashes.iter().map(HashInput::Scalar).collect();
                let commitment_hash = hash_elems(field, &[HashInput::Seq(hash_items)]);

                self.state = CeremonyState::Complete {
                    announcements: sorted,
                    joint_key,
                    commitment_hash,
                };
                tracing::info!(phase = "complete", "ceremony advanced");
                Ok(())
            }
            other => {
                self.state = other;
                Err(EgError::StateViolation(
                    "not in the verifying-backups phase".to_string(),
                ))
            }
        }
    }

    /// The published `(K, commitment_hash)` once the ceremony has completed.
    pub fn joint_key(&self) -> EgResult<(&GroupElement, &FieldElement)> {
        match &self.state {
            CeremonyState::Complete {
                joint_key,
                commitment_hash,
                ..
            } => Ok((joint_key, commitment_hash)),
            _ => Err(EgError::StateViolation(
                "key ceremony has not completed".to_string(),
            )),
        }
    }
}
