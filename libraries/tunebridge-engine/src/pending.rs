//! Pending transfer selection.
//!
//! The staging area between "the caller picked some playlists" and "a commit
//! was sent". Holds at most one entry per playlist id and exactly one
//! destination while non-empty:
//!
//! `destination().is_none() == is_empty()` holds after every operation.

use crate::error::PendingError;
use tunebridge_core::{DestinationRef, Playlist, PlaylistId, TransferStatus};

/// A playlist captured at selection time plus where it is going
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub playlist: Playlist,
    pub destination: DestinationRef,
}

impl PendingEntry {
    pub fn id(&self) -> &PlaylistId {
        &self.playlist.id
    }

    pub fn status(&self) -> TransferStatus {
        self.playlist.status
    }
}

/// Outcome of a single [`PendingSet::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Id already pending; nothing changed
    AlreadyPending,
}

/// Outcome of [`PendingSet::add_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddAllReport {
    pub added: usize,
    pub already_pending: usize,
    /// First policy error; later playlists were not considered
    pub error: Option<PendingError>,
}

/// Playlists selected for transfer to a single destination
#[derive(Debug, Clone, Default)]
pub struct PendingSet {
    entries: Vec<PendingEntry>,
    destination: Option<DestinationRef>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `playlist` for transfer to `destination`.
    ///
    /// A duplicate id is a no-op even when `destination` differs. A new
    /// entry is rejected if it already lives on `destination` or if other
    /// entries target a different platform.
    pub fn add(
        &mut self,
        playlist: Playlist,
        destination: DestinationRef,
    ) -> Result<AddOutcome, PendingError> {
        if self.contains(&playlist.id) {
            return Ok(AddOutcome::AlreadyPending);
        }

        if playlist.platform == destination.platform() {
            return Err(PendingError::SameAsSource {
                playlist: playlist.id,
                platform: playlist.platform,
            });
        }

        if let Some(current) = self.destination {
            if current != destination {
                return Err(PendingError::DestinationMismatch {
                    current: current.platform(),
                    requested: destination.platform(),
                });
            }
        }

        self.entries.push(PendingEntry {
            playlist: playlist.with_status(TransferStatus::Queued),
            destination,
        });
        self.destination = Some(destination);
        Ok(AddOutcome::Added)
    }

    /// Stage several playlists, stopping at the first policy error
    pub fn add_all(
        &mut self,
        playlists: impl IntoIterator<Item = Playlist>,
        destination: DestinationRef,
    ) -> AddAllReport {
        let mut report = AddAllReport::default();
        for playlist in playlists {
            match self.add(playlist, destination) {
                Ok(AddOutcome::Added) => report.added += 1,
                Ok(AddOutcome::AlreadyPending) => report.already_pending += 1,
                Err(e) => {
                    report.error = Some(e);
                    break;
                }
            }
        }
        report
    }

    /// Remove by id. Emptying the set clears the destination.
    pub fn remove(&mut self, id: &PlaylistId) -> Option<PendingEntry> {
        let index = self.entries.iter().position(|entry| entry.id() == id)?;
        let removed = self.entries.remove(index);
        if self.entries.is_empty() {
            self.destination = None;
        }
        Some(removed)
    }

    /// Drop every entry and the destination. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        self.destination = None;
        std::mem::take(&mut self.entries).len()
    }

    /// Set the status of every entry
    pub fn mark_all(&mut self, status: TransferStatus) {
        for entry in &mut self.entries {
            entry.playlist.status = status;
        }
    }

    /// Set the status of the listed entries; unknown ids are skipped
    pub fn mark(&mut self, ids: &[PlaylistId], status: TransferStatus) {
        for entry in &mut self.entries {
            if ids.contains(&entry.playlist.id) {
                entry.playlist.status = status;
            }
        }
    }

    pub fn contains(&self, id: &PlaylistId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    pub fn entries(&self) -> &[PendingEntry] {
        &self.entries
    }

    pub fn destination(&self) -> Option<DestinationRef> {
        self.destination
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
