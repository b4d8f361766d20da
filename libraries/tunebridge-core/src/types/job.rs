/// Transfer job tracked after a commit
use crate::types::{
    DestinationRef, JobId, Platform, Playlist, PlaylistId, TransferStatus, Transition,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One playlist moving to one destination platform.
///
/// Created when a commit response is parsed. Only the poll loop changes its
/// status afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferJob {
    /// Server job id, or a `local-` id for items rejected at commit time
    pub id: JobId,

    /// Destination-shaped snapshot of the playlist
    pub playlist: Playlist,

    /// Playlist id on the source platform
    pub source_playlist_id: PlaylistId,

    /// Platform the playlist is copied from
    pub source_platform: Platform,

    /// Target platform
    pub destination: DestinationRef,

    /// Current state
    pub status: TransferStatus,

    /// Whether a server id exists to poll
    pub pollable: bool,

    /// Last failure reason reported by the server or the transport
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransferJob {
    /// Job accepted by the server, starts QUEUED and is polled.
    pub fn accepted(id: JobId, source: &Playlist, destination: DestinationRef) -> Self {
        let now = Utc::now();
        Self {
            id,
            playlist: source.for_destination(destination.platform()),
            source_playlist_id: source.id.clone(),
            source_platform: source.platform,
            destination,
            status: TransferStatus::Queued,
            pollable: true,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Job rejected at commit time: terminal ERROR, never polled.
    pub fn rejected(source: &Playlist, destination: DestinationRef, reason: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut playlist = source.for_destination(destination.platform());
        playlist.status = TransferStatus::Error;
        Self {
            id: JobId::local(),
            playlist,
            source_playlist_id: source.id.clone(),
            source_platform: source.platform,
            destination,
            status: TransferStatus::Error,
            pollable: false,
            error: Some(reason.into()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the poll loop should ask the server about this job
    pub fn needs_poll(&self) -> bool {
        self.pollable && !self.status.is_terminal()
    }

    /// Apply an observed status. Returns the transition that was taken.
    pub fn observe(&mut self, observed: TransferStatus) -> Transition {
        let transition = self.status.advance(observed);
        if let Transition::Moved { to, .. } = transition {
            self.set_status(to);
        }
        transition
    }

    /// Force the job into ERROR (poll failure). No-op on terminal jobs.
    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.error = Some(reason.into());
        self.set_status(TransferStatus::Error);
        true
    }

    fn set_status(&mut self, status: TransferStatus) {
        self.status = status;
        self.playlist.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Playlist {
        Playlist::new("p1", "melatones", Platform::AppleMusic, 41)
    }

    #[test]
    fn accepted_job_is_pollable() {
        let job = TransferJob::accepted(JobId::new("j1"), &source(), Platform::Spotify.into());
        assert!(job.needs_poll());
        assert_eq!(job.status, TransferStatus::Queued);
        assert_eq!(job.playlist.platform, Platform::Spotify);
        assert_eq!(job.source_platform, Platform::AppleMusic);
    }

    #[test]
    fn rejected_job_is_terminal_and_never_polled() {
        let job = TransferJob::rejected(&source(), Platform::Spotify.into(), "rejected by server");
        assert!(!job.needs_poll());
        assert!(job.id.is_local());
        assert_eq!(job.status, TransferStatus::Error);
        assert_eq!(job.playlist.status, TransferStatus::Error);
    }

    #[test]
    fn observe_keeps_snapshot_status_in_sync() {
        let mut job = TransferJob::accepted(JobId::new("j1"), &source(), Platform::Spotify.into());
        job.observe(TransferStatus::Processing);
        assert_eq!(job.playlist.status, TransferStatus::Processing);

        job.observe(TransferStatus::Success);
        assert!(!job.needs_poll());

        assert!(!job.fail("late failure"));
        assert_eq!(job.status, TransferStatus::Success);
    }
}
