//! The orchestration session: one per caller.
//!
//! Ties the pending selection, the committer, the job tracker and the
//! catalog together behind one object, and owns the event bus callers
//! subscribe to.

use crate::catalog::{Catalog, CatalogMode, RefreshOptions};
use crate::committer::{CommitOutcome, TransferCommitter};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{EventBus, SessionEvent, SubscriptionId};
use crate::pending::{AddAllReport, AddOutcome, PendingEntry, PendingSet};
use crate::tracker::{JobTracker, TrackerTimings};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use tunebridge_client::{ServerConfig, TransferServerClient};
use tunebridge_core::{
    DestinationRef, FetchResult, JobId, Platform, PlatformClient, Playlist, PlaylistId,
    TransferApi, TransferJob, TransferStatus,
};

/// Builder for [`TransferSession`]
pub struct SessionBuilder {
    api: Arc<dyn TransferApi>,
    clients: Vec<Arc<dyn PlatformClient>>,
    timings: TrackerTimings,
    demo: bool,
    events: EventBus,
}

impl SessionBuilder {
    /// Add a platform client (replaces an earlier one for the same platform)
    #[must_use]
    pub fn client(mut self, client: Arc<dyn PlatformClient>) -> Self {
        self.clients.push(client);
        self
    }

    #[must_use]
    pub fn timings(mut self, timings: TrackerTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Start with fixture data instead of live listings
    #[must_use]
    pub fn demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    /// Share an existing event bus
    #[must_use]
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn build(self) -> TransferSession {
        let catalog = Catalog::new(self.events.clone());
        for client in self.clients {
            catalog.register_client(client);
        }
        if self.demo {
            catalog.enter_demo();
        }

        let tracker = JobTracker::new(
            Arc::clone(&self.api),
            catalog.clone(),
            self.events.clone(),
            self.timings,
        );

        TransferSession {
            events: self.events,
            catalog,
            pending: Mutex::new(PendingSet::new()),
            committer: TransferCommitter::new(self.api),
            commit_lock: tokio::sync::Mutex::new(()),
            tracker,
        }
    }
}

/// Playlist transfer orchestration for one caller.
///
/// # Example
///
/// ```ignore
/// use tunebridge_engine::{EngineConfig, TransferSession};
/// use tunebridge_core::{DestinationRef, Platform};
///
/// let config = EngineConfig::load()?;
/// let session = TransferSession::connect(&config, Some(token))?;
///
/// let playlists = session.refresh(Platform::AppleMusic, false).await?;
/// session.add_pending(playlists[0].clone(), DestinationRef::new(Platform::Spotify))?;
///
/// let outcome = session.commit().await?;
/// println!("{} job(s) queued", outcome.job_ids.len());
/// ```
pub struct TransferSession {
    events: EventBus,
    catalog: Catalog,
    pending: Mutex<PendingSet>,
    committer: TransferCommitter,
    commit_lock: tokio::sync::Mutex<()>,
    tracker: JobTracker,
}

impl TransferSession {
    pub fn builder(api: Arc<dyn TransferApi>) -> SessionBuilder {
        SessionBuilder {
            api,
            clients: Vec::new(),
            timings: TrackerTimings::default(),
            demo: false,
            events: EventBus::new(),
        }
    }

    /// Session against the transfer server described by `config`.
    ///
    /// Without a token the session starts in demo mode.
    pub fn connect(config: &EngineConfig, access_token: Option<String>) -> Result<Self> {
        config.validate()?;

        let demo = access_token.is_none();
        let server_config = ServerConfig {
            url: config.api_url.clone(),
            access_token,
        };
        let server = Arc::new(
            TransferServerClient::with_timeouts(
                server_config,
                config.request_timeout(),
                config.connect_timeout(),
            )
            .map_err(|e| EngineError::Config(e.to_string()))?,
        );

        let mut builder = Self::builder(Arc::clone(&server) as Arc<dyn TransferApi>)
            .timings(TrackerTimings::from(config))
            .demo(demo);
        for platform in Platform::ALL {
            builder = builder.client(Arc::new(TransferServerClient::platform_client(
                &server, platform,
            )));
        }

        info!(api_url = %config.api_url, demo, "Transfer session created");
        Ok(builder.build())
    }

    fn lock_pending(&self) -> MutexGuard<'_, PendingSet> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn on_auth_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Platform) + Send + Sync + 'static,
    {
        self.events.on_auth_changed(callback)
    }

    pub fn on_pending_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events.on_pending_changed(callback)
    }

    // =========================================================================
    // Pending selection
    // =========================================================================

    /// Stage a playlist for transfer to `destination`
    pub fn add_pending(&self, playlist: Playlist, destination: DestinationRef) -> Result<AddOutcome> {
        let outcome = self.lock_pending().add(playlist, destination)?;
        if outcome == AddOutcome::Added {
            self.events.emit(&SessionEvent::PendingChanged);
        }
        Ok(outcome)
    }

    /// Stage several playlists ("select all")
    pub fn add_all_pending(
        &self,
        playlists: impl IntoIterator<Item = Playlist>,
        destination: DestinationRef,
    ) -> AddAllReport {
        let report = self.lock_pending().add_all(playlists, destination);
        if report.added > 0 {
            self.events.emit(&SessionEvent::PendingChanged);
        }
        report
    }

    pub fn remove_pending(&self, id: &PlaylistId) -> Option<PendingEntry> {
        let removed = self.lock_pending().remove(id);
        if removed.is_some() {
            self.events.emit(&SessionEvent::PendingChanged);
        }
        removed
    }

    /// Drop the whole selection. Returns how many entries were dropped.
    pub fn cancel_all(&self) -> usize {
        let dropped = self.lock_pending().cancel_all();
        if dropped > 0 {
            self.events.emit(&SessionEvent::PendingChanged);
        }
        dropped
    }

    pub fn pending(&self) -> Vec<PendingEntry> {
        self.lock_pending().entries().to_vec()
    }

    pub fn pending_destination(&self) -> Option<DestinationRef> {
        self.lock_pending().destination()
    }

    // =========================================================================
    // Commit and jobs
    // =========================================================================

    /// Submit the pending selection as one batch.
    ///
    /// Committed entries leave the pending set and become tracked jobs. If
    /// the request fails as a whole, the entries stay pending in ERROR and no
    /// job is created. A response that lands after a demo switch or tracker
    /// clear is dropped with [`EngineError::CommitDiscarded`].
    pub async fn commit(&self) -> Result<CommitOutcome> {
        let _commit = self.commit_lock.lock().await;

        // Read before the mode check: a demo switch after this point clears
        // the tracker and bumps its epoch.
        let epoch = self.tracker.epoch();
        if self.catalog.mode() == CatalogMode::Demo {
            return Err(EngineError::NotLive);
        }

        let snapshot = {
            let mut pending = self.lock_pending();
            pending.destination().map(|destination| {
                pending.mark_all(TransferStatus::Processing);
                (pending.entries().to_vec(), destination)
            })
        };
        let Some((entries, destination)) = snapshot else {
            debug!("Commit requested with nothing pending");
            return Ok(CommitOutcome::default());
        };
        self.events.emit(&SessionEvent::PendingChanged);

        let ids: Vec<PlaylistId> = entries.iter().map(|entry| entry.id().clone()).collect();

        match self.committer.commit(&entries, destination).await {
            Ok(outcome) => {
                let registered = self
                    .tracker
                    .register_in_epoch(outcome.jobs.clone(), epoch)
                    .await;
                if registered.is_none() {
                    warn!(
                        jobs = outcome.job_ids.len(),
                        "Session was reset during commit, dropping its jobs"
                    );
                    return Err(EngineError::CommitDiscarded {
                        job_ids: outcome.job_ids,
                    });
                }

                {
                    let mut pending = self.lock_pending();
                    for id in &ids {
                        pending.remove(id);
                    }
                }
                self.events.emit(&SessionEvent::PendingChanged);
                Ok(outcome)
            }
            Err(e) => {
                self.lock_pending().mark(&ids, TransferStatus::Error);
                if let EngineError::CommitTransport { failed_ids, .. } = &e {
                    self.events.emit(&SessionEvent::CommitFailed {
                        failed_ids: failed_ids.clone(),
                    });
                }
                self.events.emit(&SessionEvent::PendingChanged);
                Err(e)
            }
        }
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    pub fn jobs(&self) -> Vec<TransferJob> {
        self.tracker.jobs()
    }

    pub fn job(&self, job_id: &JobId) -> Option<TransferJob> {
        self.tracker.job(job_id)
    }

    pub fn dismiss_job(&self, job_id: &JobId) -> Result<TransferJob> {
        self.tracker.dismiss(job_id)
    }

    pub fn clear_finished(&self) -> Vec<JobId> {
        self.tracker.clear_finished()
    }

    /// Run a poll round now instead of waiting for the next tick
    pub async fn poll_now(&self) -> usize {
        self.tracker.poll_once().await
    }

    // =========================================================================
    // Catalog and mode
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn mode(&self) -> CatalogMode {
        self.catalog.mode()
    }

    pub fn playlists(&self, platform: Platform) -> Vec<Playlist> {
        self.catalog.playlists(platform)
    }

    pub async fn refresh(&self, platform: Platform, force: bool) -> Result<Vec<Playlist>> {
        Ok(self
            .catalog
            .refresh(platform, RefreshOptions { force })
            .await?)
    }

    pub async fn refresh_all(&self, force: bool) -> Vec<(Platform, FetchResult<Vec<Playlist>>)> {
        self.catalog.refresh_all(RefreshOptions { force }).await
    }

    pub async fn is_logged_in(&self, platform: Platform) -> Result<bool> {
        Ok(self.catalog.is_logged_in(platform).await?)
    }

    /// Switch to fixture data, dropping the selection and every job
    pub fn enter_demo_mode(&self) {
        // Catalog first, so a commit that passes the mode check reads the
        // tracker epoch before the clear below.
        let switched = self.catalog.enter_demo();
        let jobs = self.tracker.clear();
        let dropped = self.lock_pending().cancel_all();

        if dropped > 0 {
            self.events.emit(&SessionEvent::PendingChanged);
        }
        if switched {
            info!(jobs, pending = dropped, "Entered demo mode");
        }
    }

    /// Drop fixture data; listings must be refreshed afterwards
    pub fn enter_live_mode(&self) {
        if self.catalog.enter_live() {
            info!("Entered live mode");
        }
    }

    /// Stop background polling and retirement timers
    pub fn shutdown(&self) {
        self.tracker.shutdown();
    }
}

impl std::fmt::Debug for TransferSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferSession")
            .field("catalog", &self.catalog)
            .field("pending", &self.lock_pending().len())
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}
