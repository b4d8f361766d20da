//! Transfer job tracking.
//!
//! The tracker owns every job created by a commit. A background loop polls
//! all non-terminal, pollable jobs every `poll_interval`, concurrently, and
//! applies the observed statuses through the state machine:
//!
//! - a failed poll forces the job to ERROR; it is never polled again
//! - SUCCESS forces a catalog refresh of the destination platform and
//!   schedules the job's retirement after `retire_delay`
//! - ERROR stays visible until the caller dismisses it
//!
//! The loop starts on the first registration and stops once no pollable job
//! is left. A round holds the round lock from snapshot to apply, and
//! registration takes the same lock, so a commit never interleaves with a
//! round. [`JobTracker::clear`] bumps an epoch so a round or retirement
//! started before it changes nothing.

use crate::catalog::{Catalog, RefreshOptions};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{EventBus, SessionEvent};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tunebridge_core::{
    JobId, Platform, TransferApi, TransferJob, TransferStatus, TransferStatusReport,
    TransportResult, Transition,
};

/// Poll cadence and retirement grace delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerTimings {
    pub poll_interval: Duration,
    pub retire_delay: Duration,
}

impl Default for TrackerTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            retire_delay: Duration::from_secs(4),
        }
    }
}

impl From<&EngineConfig> for TrackerTimings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            retire_delay: config.retire_delay(),
        }
    }
}

struct Poller {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct TrackerState {
    jobs: Vec<TransferJob>,
    epoch: u64,
    generation: u64,
    poller: Option<Poller>,
    retirements: HashMap<JobId, JoinHandle<()>>,
}

impl TrackerState {
    fn has_pollable(&self) -> bool {
        self.jobs.iter().any(TransferJob::needs_poll)
    }

    fn take_tasks(&mut self) -> Vec<JoinHandle<()>> {
        let mut tasks: Vec<JoinHandle<()>> =
            self.retirements.drain().map(|(_, handle)| handle).collect();
        if let Some(poller) = self.poller.take() {
            tasks.push(poller.handle);
        }
        tasks
    }
}

struct Shared {
    api: Arc<dyn TransferApi>,
    catalog: Catalog,
    events: EventBus,
    timings: TrackerTimings,
    state: Mutex<TrackerState>,
    round: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
}

/// Owns in-flight transfer jobs and drives their polling.
///
/// Dropping the tracker stops the poll loop and every retirement timer.
pub struct JobTracker {
    shared: Arc<Shared>,
}

impl JobTracker {
    pub fn new(
        api: Arc<dyn TransferApi>,
        catalog: Catalog,
        events: EventBus,
        timings: TrackerTimings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                catalog,
                events,
                timings,
                state: Mutex::new(TrackerState::default()),
                round: tokio::sync::Mutex::new(()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn timings(&self) -> TrackerTimings {
        self.shared.timings
    }

    /// Start tracking `jobs`, starting the poll loop if needed.
    ///
    /// Waits for a running round to finish. Ids already tracked are skipped.
    /// Returns how many jobs were added.
    pub async fn register(&self, jobs: Vec<TransferJob>) -> usize {
        self.register_in(jobs, None).await.unwrap_or_default()
    }

    /// Current clear epoch, for [`JobTracker::register_in_epoch`]
    pub(crate) fn epoch(&self) -> u64 {
        self.shared.lock_state().epoch
    }

    /// Like [`JobTracker::register`], but registers nothing and returns
    /// `None` if the tracker was cleared since `epoch` was read.
    pub(crate) async fn register_in_epoch(
        &self,
        jobs: Vec<TransferJob>,
        epoch: u64,
    ) -> Option<usize> {
        self.register_in(jobs, Some(epoch)).await
    }

    async fn register_in(&self, jobs: Vec<TransferJob>, epoch: Option<u64>) -> Option<usize> {
        let _round = self.shared.round.lock().await;

        let added: Vec<TransferJob> = {
            let mut state = self.shared.lock_state();
            if epoch.is_some_and(|epoch| epoch != state.epoch) {
                debug!(jobs = jobs.len(), "Dropping jobs registered before the tracker was cleared");
                return None;
            }
            let mut added = Vec::with_capacity(jobs.len());
            for job in jobs {
                if state.jobs.iter().any(|existing| existing.id == job.id) {
                    warn!(job_id = %job.id, "Job already tracked, skipping");
                    continue;
                }
                debug!(
                    job_id = %job.id,
                    status = %job.status,
                    pollable = job.pollable,
                    "Tracking transfer job"
                );
                added.push(job.clone());
                state.jobs.push(job);
            }
            self.shared.ensure_polling(&mut state);
            added
        };

        let count = added.len();
        self.shared
            .events
            .emit_all(added.into_iter().map(|job| SessionEvent::JobUpdated { job }));
        Some(count)
    }

    /// Run one poll round now. Returns how many jobs were polled.
    pub async fn poll_once(&self) -> usize {
        self.shared.run_round().await
    }

    /// Snapshot of every tracked job, in registration order
    pub fn jobs(&self) -> Vec<TransferJob> {
        self.shared.lock_state().jobs.clone()
    }

    pub fn job(&self, job_id: &JobId) -> Option<TransferJob> {
        self.shared
            .lock_state()
            .jobs
            .iter()
            .find(|job| job.id == *job_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.lock_state().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock_state().jobs.is_empty()
    }

    /// Jobs the next round would poll
    pub fn pollable_count(&self) -> usize {
        self.shared
            .lock_state()
            .jobs
            .iter()
            .filter(|job| job.needs_poll())
            .count()
    }

    /// Whether the background poll loop is scheduled
    pub fn is_polling(&self) -> bool {
        self.shared.lock_state().poller.is_some()
    }

    /// Remove one job in any state, cancelling its pending retirement
    pub fn dismiss(&self, job_id: &JobId) -> Result<TransferJob> {
        let removed = {
            let mut state = self.shared.lock_state();
            let index = state
                .jobs
                .iter()
                .position(|job| job.id == *job_id)
                .ok_or_else(|| EngineError::JobNotFound(job_id.clone()))?;
            if let Some(retirement) = state.retirements.remove(job_id) {
                retirement.abort();
            }
            state.jobs.remove(index)
        };

        info!(job_id = %job_id, status = %removed.status, "Transfer job dismissed");
        self.shared.events.emit(&SessionEvent::JobDismissed {
            job_id: job_id.clone(),
        });
        Ok(removed)
    }

    /// Remove every terminal job. Returns the removed ids.
    pub fn clear_finished(&self) -> Vec<JobId> {
        let removed: Vec<JobId> = {
            let mut state = self.shared.lock_state();
            let (finished, active): (Vec<TransferJob>, Vec<TransferJob>) =
                std::mem::take(&mut state.jobs)
                    .into_iter()
                    .partition(|job| job.status.is_terminal());
            state.jobs = active;
            for job in &finished {
                if let Some(retirement) = state.retirements.remove(&job.id) {
                    retirement.abort();
                }
            }
            finished.into_iter().map(|job| job.id).collect()
        };

        if !removed.is_empty() {
            info!(count = removed.len(), "Cleared finished transfer jobs");
        }
        self.shared.events.emit_all(
            removed
                .iter()
                .map(|job_id| SessionEvent::JobDismissed {
                    job_id: job_id.clone(),
                }),
        );
        removed
    }

    /// Drop every job and stop polling. In-flight rounds are discarded.
    pub fn clear(&self) -> usize {
        let (count, tasks) = {
            let mut state = self.shared.lock_state();
            state.epoch += 1;
            let count = state.jobs.len();
            state.jobs.clear();
            (count, state.take_tasks())
        };

        for task in tasks {
            task.abort();
        }
        info!(jobs = count, "Transfer tracker cleared");
        count
    }

    /// Stop the poll loop and retirement timers for good. Jobs stay readable.
    pub fn shutdown(&self) {
        self.shared.cancel.cancel();
        let tasks = self.shared.lock_state().take_tasks();
        for task in tasks {
            task.abort();
        }
        debug!("Transfer tracker shut down");
    }
}

impl Drop for JobTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for JobTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock_state();
        f.debug_struct("JobTracker")
            .field("jobs", &state.jobs.len())
            .field("polling", &state.poller.is_some())
            .field("timings", &self.shared.timings)
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_polling(self: &Arc<Self>, state: &mut TrackerState) {
        if state.poller.is_some() || self.cancel.is_cancelled() || !state.has_pollable() {
            return;
        }
        state.generation += 1;
        let generation = state.generation;
        let handle = tokio::spawn(poll_loop(Arc::clone(self), generation));
        state.poller = Some(Poller { generation, handle });
        debug!(generation, "Poll loop started");
    }

    /// Unschedule the loop if nothing is left to poll. Returns true to stop.
    fn stop_if_idle(&self, generation: u64) -> bool {
        let mut state = self.lock_state();
        match &state.poller {
            Some(poller) if poller.generation == generation => {}
            // Replaced or cleared while this round ran
            _ => return true,
        }
        if state.has_pollable() {
            return false;
        }
        state.poller = None;
        true
    }

    async fn run_round(self: &Arc<Self>) -> usize {
        let round = self.round.lock().await;

        let (epoch, targets) = {
            let state = self.lock_state();
            let targets: Vec<JobId> = state
                .jobs
                .iter()
                .filter(|job| job.needs_poll())
                .map(|job| job.id.clone())
                .collect();
            (state.epoch, targets)
        };
        if targets.is_empty() {
            return 0;
        }
        debug!(jobs = targets.len(), "Poll round started");

        let reports = join_all(targets.iter().map(|job_id| self.api.transfer_status(job_id))).await;

        let mut events = Vec::new();
        let mut refresh: Vec<Platform> = Vec::new();
        {
            let mut state = self.lock_state();
            if state.epoch != epoch {
                debug!("Discarding poll round started before the tracker was cleared");
                return 0;
            }

            let mut succeeded = Vec::new();
            for (job_id, report) in targets.iter().zip(reports) {
                let Some(job) = state.jobs.iter_mut().find(|job| job.id == *job_id) else {
                    debug!(job_id = %job_id, "Job removed during poll round");
                    continue;
                };
                if !apply_report(job, report) {
                    continue;
                }
                if job.status == TransferStatus::Success {
                    let platform = job.destination.platform();
                    if !refresh.contains(&platform) {
                        refresh.push(platform);
                    }
                    succeeded.push(job.id.clone());
                }
                events.push(SessionEvent::JobUpdated { job: job.clone() });
            }

            for job_id in succeeded {
                self.schedule_retirement(&mut state, job_id);
            }
        }
        drop(round);

        self.events.emit_all(events);

        for platform in refresh {
            if let Err(e) = self.catalog.refresh(platform, RefreshOptions::forced()).await {
                warn!(platform = %platform, error = %e, "Catalog refresh after transfer failed");
            }
        }

        targets.len()
    }

    fn schedule_retirement(self: &Arc<Self>, state: &mut TrackerState, job_id: JobId) {
        let deadline = Instant::now() + self.timings.retire_delay;
        let epoch = state.epoch;
        let shared = Arc::clone(self);
        let id = job_id.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                () = shared.cancel.cancelled() => {}
                () = sleep_until(deadline) => shared.retire(&id, epoch),
            }
        });

        if let Some(previous) = state.retirements.insert(job_id, handle) {
            previous.abort();
        }
    }

    fn retire(&self, job_id: &JobId, epoch: u64) {
        let retired = {
            let mut state = self.lock_state();
            if state.epoch != epoch {
                return;
            }
            state.retirements.remove(job_id);
            let before = state.jobs.len();
            state
                .jobs
                .retain(|job| !(job.id == *job_id && job.status == TransferStatus::Success));
            state.jobs.len() != before
        };

        if retired {
            info!(job_id = %job_id, "Transfer job retired");
            self.events.emit(&SessionEvent::JobRetired {
                job_id: job_id.clone(),
            });
        }
    }
}

async fn poll_loop(shared: Arc<Shared>, generation: u64) {
    let period = shared.timings.poll_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = shared.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            () = shared.cancel.cancelled() => break,
            _ = shared.run_round() => {}
        }

        if shared.stop_if_idle(generation) {
            break;
        }
    }

    debug!(generation, "Poll loop stopped");
}

/// Apply one poll result to `job`. Returns true if the job changed.
fn apply_report(job: &mut TransferJob, report: TransportResult<TransferStatusReport>) -> bool {
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            let changed = job.fail(e.to_string());
            if changed {
                warn!(job_id = %job.id, error = %e, "Status poll failed, marking transfer as failed");
            }
            return changed;
        }
    };

    let Some(observed) = TransferStatus::parse_lenient(&report.status) else {
        warn!(job_id = %job.id, status = %report.status, "Unrecognized transfer status, leaving job unchanged");
        return false;
    };

    match job.observe(observed) {
        Transition::Moved { from, to } => {
            if report.error.is_some() {
                job.error = report.error;
            }
            if to == TransferStatus::Success {
                if let Some(created) = report.dest_playlist_id {
                    job.playlist.id = created;
                }
            }
            if to.is_terminal() {
                info!(job_id = %job.id, from = %from, to = %to, "Transfer finished");
            } else {
                debug!(job_id = %job.id, from = %from, to = %to, "Transfer status changed");
            }
            true
        }
        Transition::Rejected { from, to } => {
            debug!(job_id = %job.id, from = %from, to = %to, "Ignoring status change out of a terminal state");
            false
        }
        Transition::Unchanged => false,
    }
}
