//! Session Events
//!
//! Observer interface for callers (UI, CLI, automation). Events are emitted
//! at key points:
//! - Pending selection changes
//! - Job registration, status changes, retirement and dismissal
//! - Catalog refreshes and their failures
//! - Authorization problems and demo/live switches
//!
//! Callbacks run synchronously on the emitting task, after the engine has
//! released its own locks, so a callback may call back into the session.

use crate::catalog::CatalogMode;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tunebridge_core::{JobId, Platform, PlaylistId, TransferJob};

/// Events emitted by a transfer session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Pending entries or their statuses changed
    PendingChanged,

    /// A platform answered 401/403; the caller should re-authorize
    AuthChanged {
        platform: Platform,
    },

    /// A job was registered or changed status
    JobUpdated {
        job: TransferJob,
    },

    /// A successful job left the active set after the grace delay
    JobRetired {
        job_id: JobId,
    },

    /// A job was removed by the caller
    JobDismissed {
        job_id: JobId,
    },

    /// A platform listing was replaced
    CatalogUpdated {
        platform: Platform,
        count: usize,
    },

    /// A refresh failed; the previous listing is kept
    CatalogRefreshFailed {
        platform: Platform,
        /// 401/403 rather than a server or network problem
        auth: bool,
    },

    ModeChanged {
        mode: CatalogMode,
    },

    /// The commit request failed as a whole
    CommitFailed {
        failed_ids: Vec<PlaylistId>,
    },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

/// Callback registry shared by the session's components.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<RwLock<Subscribers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every event
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let mut subscribers = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        subscribers.next_id += 1;
        let id = SubscriptionId(subscribers.next_id);
        subscribers.callbacks.push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.callbacks.len();
        subscribers.callbacks.retain(|(existing, _)| *existing != id);
        subscribers.callbacks.len() != before
    }

    /// Called with the platform whenever it needs re-authorization
    pub fn on_auth_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Platform) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let SessionEvent::AuthChanged { platform } = event {
                callback(*platform);
            }
        })
    }

    /// Called whenever the pending selection changes
    pub fn on_pending_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if matches!(event, SessionEvent::PendingChanged) {
                callback();
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .len()
    }

    /// Deliver one event to every subscriber
    pub fn emit(&self, event: &SessionEvent) {
        // Snapshot so callbacks can (un)subscribe without deadlocking
        let callbacks: Vec<Callback> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(event);
        }
    }

    pub fn emit_all(&self, events: impl IntoIterator<Item = SessionEvent>) {
        for event in events {
            self.emit(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
