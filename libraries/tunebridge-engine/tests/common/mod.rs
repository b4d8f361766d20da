//! Shared helpers for engine integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Barrier, Notify};
use tunebridge_core::{
    JobId, Platform, Playlist, TransferApi, TransferBatchRequest, TransferBatchResponse,
    TransferJob, TransferStatusReport, TransportError, TransportResult,
};
use tunebridge_engine::{EventBus, SessionEvent};

/// Scripted transfer queue that records every call.
#[derive(Default)]
pub struct FakeTransferApi {
    statuses: Mutex<HashMap<JobId, TransportResult<String>>>,
    polls: Mutex<Vec<JobId>>,
    batches: Mutex<Vec<TransferBatchRequest>>,
    batch_response: Mutex<Option<TransportResult<TransferBatchResponse>>>,
    barrier: Option<Arc<Barrier>>,
    gate: Option<Arc<Notify>>,
    batch_gate: Option<Arc<Notify>>,
}

impl FakeTransferApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every status call waits until `parties` calls are in flight together
    pub fn with_barrier(parties: usize) -> Arc<Self> {
        Arc::new(Self {
            barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        })
    }

    /// Every status call waits for a permit on the returned handle
    pub fn gated() -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        });
        (api, gate)
    }

    /// Every batch submission waits for a permit on the returned handle
    pub fn gated_batches() -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(Self {
            batch_gate: Some(Arc::clone(&gate)),
            ..Self::default()
        });
        (api, gate)
    }

    pub fn set_status(&self, job_id: &str, status: &str) {
        self.statuses
            .lock()
            .unwrap()
            .insert(JobId::new(job_id), Ok(status.to_string()));
    }

    pub fn fail_status(&self, job_id: &str, error: TransportError) {
        self.statuses
            .lock()
            .unwrap()
            .insert(JobId::new(job_id), Err(error));
    }

    pub fn respond_to_batch(&self, response: TransportResult<TransferBatchResponse>) {
        *self.batch_response.lock().unwrap() = Some(response);
    }

    pub fn polls_of(&self, job_id: &str) -> usize {
        let id = JobId::new(job_id);
        self.polls.lock().unwrap().iter().filter(|p| **p == id).count()
    }

    pub fn total_polls(&self) -> usize {
        self.polls.lock().unwrap().len()
    }

    pub fn batches(&self) -> Vec<TransferBatchRequest> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferApi for FakeTransferApi {
    async fn submit_batch(
        &self,
        request: &TransferBatchRequest,
    ) -> TransportResult<TransferBatchResponse> {
        self.batches.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.batch_gate {
            gate.notified().await;
        }
        self.batch_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(TransferBatchResponse::default()))
    }

    async fn transfer_status(&self, job_id: &JobId) -> TransportResult<TransferStatusReport> {
        self.polls.lock().unwrap().push(job_id.clone());

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(job_id)
            .cloned()
            .unwrap_or_else(|| Ok("queued".to_string()))?;

        Ok(TransferStatusReport {
            id: job_id.clone(),
            status,
            src_playlist_id: None,
            dest_playlist_id: None,
            error: None,
        })
    }
}

pub fn playlist(id: &str, platform: Platform) -> Playlist {
    Playlist::new(id, format!("playlist {id}"), platform, 12)
}

/// Accepted job moving an Apple Music playlist to Spotify
pub fn accepted(job_id: &str, playlist_id: &str) -> TransferJob {
    TransferJob::accepted(
        JobId::new(job_id),
        &playlist(playlist_id, Platform::AppleMusic),
        Platform::Spotify.into(),
    )
}

/// Collects every event emitted on `events`
pub fn record(events: &EventBus) -> Arc<Mutex<Vec<SessionEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    events.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    seen
}

/// Opt-in log output: `RUST_LOG=tunebridge_engine=debug cargo test`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
