//! Turns pending entries into server-side transfer jobs.
//!
//! One commit sends exactly one batch. Every submitted entry comes back as
//! either an accepted, pollable job or a rejected job in terminal ERROR with
//! a local id. A transport failure fails the whole batch and creates no jobs.

use crate::error::{EngineError, Result};
use crate::pending::PendingEntry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tunebridge_core::{
    DestinationRef, JobId, Playlist, PlaylistId, TransferApi, TransferBatchRequest,
    TransferBatchResponse, TransferJob,
};

const REJECTED_BY_SERVER: &str = "Rejected by transfer server";
const MISSING_FROM_RESPONSE: &str = "No job id returned for this playlist";

/// What happened to each entry of a commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Source ids that received a server job
    pub accepted_ids: Vec<PlaylistId>,
    /// Source ids rejected at commit time
    pub failed_ids: Vec<PlaylistId>,
    /// Server job ids, aligned with `accepted_ids`
    pub job_ids: Vec<JobId>,
    /// One job per submitted entry, in submission order
    pub jobs: Vec<TransferJob>,
}

impl CommitOutcome {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn accept(&mut self, job_id: JobId, playlist: &Playlist, destination: DestinationRef) {
        self.accepted_ids.push(playlist.id.clone());
        self.job_ids.push(job_id.clone());
        self.jobs.push(TransferJob::accepted(job_id, playlist, destination));
    }

    fn reject(&mut self, playlist: &Playlist, destination: DestinationRef, reason: &str) {
        self.failed_ids.push(playlist.id.clone());
        self.jobs.push(TransferJob::rejected(playlist, destination, reason));
    }
}

/// Submits pending entries to the transfer queue
#[derive(Clone)]
pub struct TransferCommitter {
    api: Arc<dyn TransferApi>,
}

impl TransferCommitter {
    pub fn new(api: Arc<dyn TransferApi>) -> Self {
        Self { api }
    }

    /// Submit `entries` as one batch to `destination`.
    ///
    /// An empty slice sends nothing.
    pub async fn commit(
        &self,
        entries: &[PendingEntry],
        destination: DestinationRef,
    ) -> Result<CommitOutcome> {
        if entries.is_empty() {
            debug!("Nothing pending, skipping commit");
            return Ok(CommitOutcome::default());
        }

        let playlists: Vec<Playlist> = entries.iter().map(|e| e.playlist.clone()).collect();
        let request = TransferBatchRequest::new(&playlists, destination.platform());

        let response = match self.api.submit_batch(&request).await {
            Ok(response) => response,
            Err(source) => {
                error!(
                    items = playlists.len(),
                    destination = %destination,
                    error = %source,
                    "Transfer batch failed"
                );
                return Err(EngineError::CommitTransport {
                    failed_ids: playlists.into_iter().map(|p| p.id).collect(),
                    source,
                });
            }
        };

        let outcome = correlate(&playlists, destination, response);
        info!(
            destination = %destination,
            accepted = outcome.accepted_ids.len(),
            rejected = outcome.failed_ids.len(),
            "Transfer batch committed"
        );
        Ok(outcome)
    }
}

/// Match response items to submitted playlists.
///
/// Echoed `results` are matched by source id. The legacy `ids`/`failed_ids`
/// form pairs the non-failed playlists with `ids` in submission order.
pub(crate) fn correlate(
    playlists: &[Playlist],
    destination: DestinationRef,
    response: TransferBatchResponse,
) -> CommitOutcome {
    let mut outcome = CommitOutcome::default();

    if let Some(results) = response.results {
        let mut by_source = HashMap::with_capacity(results.len());
        for result in results {
            if !playlists.iter().any(|p| p.id == result.src_playlist_id) {
                warn!(src_playlist_id = %result.src_playlist_id, "Result for a playlist that was not submitted");
                continue;
            }
            by_source.entry(result.src_playlist_id.clone()).or_insert(result);
        }

        for playlist in playlists {
            match by_source.remove(&playlist.id) {
                Some(result) if !result.failed => match result.job_id {
                    Some(job_id) => outcome.accept(job_id, playlist, destination),
                    None => {
                        warn!(playlist_id = %playlist.id, "Accepted result carries no job id");
                        outcome.reject(playlist, destination, MISSING_FROM_RESPONSE);
                    }
                },
                Some(_) => outcome.reject(playlist, destination, REJECTED_BY_SERVER),
                None => {
                    warn!(playlist_id = %playlist.id, "Playlist missing from commit results");
                    outcome.reject(playlist, destination, MISSING_FROM_RESPONSE);
                }
            }
        }
        return outcome;
    }

    let mut job_ids = response.ids.into_iter();
    for playlist in playlists {
        if response.failed_ids.contains(&playlist.id) {
            outcome.reject(playlist, destination, REJECTED_BY_SERVER);
            continue;
        }
        match job_ids.next() {
            Some(job_id) => outcome.accept(job_id, playlist, destination),
            None => {
                warn!(playlist_id = %playlist.id, "Commit response has fewer job ids than accepted playlists");
                outcome.reject(playlist, destination, MISSING_FROM_RESPONSE);
            }
        }
    }

    let surplus = job_ids.count();
    if surplus > 0 {
        warn!(surplus, "Commit response has more job ids than accepted playlists");
    }

    outcome
}
