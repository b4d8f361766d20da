//! TuneBridge Engine
//!
//! Client-side orchestration of playlist transfers between streaming
//! platforms.
//!
//! # Architecture
//!
//! - **`PendingSet`**: playlists selected for one destination
//! - **`TransferCommitter`**: one batch request per commit, correlated back
//!   to accepted and rejected jobs
//! - **`JobTracker`**: concurrent status polling, retirement after SUCCESS,
//!   ERROR kept until dismissed
//! - **`Catalog`**: per-platform listings, live or demo fixtures
//! - **`TransferSession`**: the facade that owns all of the above plus the
//!   `EventBus` observers subscribe to
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tunebridge_core::{DestinationRef, Platform};
//! use tunebridge_engine::{EngineConfig, SessionEvent, TransferSession};
//!
//! let config = EngineConfig::load()?;
//! let session = TransferSession::connect(&config, Some(token))?;
//!
//! session.on_auth_changed(|platform| println!("Please sign in to {platform} again"));
//! session.subscribe(|event| {
//!     if let SessionEvent::JobUpdated { job } = event {
//!         println!("{} is {}", job.playlist.name, job.status);
//!     }
//! });
//!
//! for playlist in session.refresh(Platform::AppleMusic, false).await? {
//!     session.add_pending(playlist, DestinationRef::new(Platform::Spotify))?;
//! }
//! session.commit().await?;
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod committer;
pub mod config;
pub mod demo;
pub mod error;
pub mod events;
pub mod pending;
pub mod session;
pub mod tracker;

pub use catalog::{Catalog, CatalogMode, Listing, RefreshOptions};
pub use committer::{CommitOutcome, TransferCommitter};
pub use config::EngineConfig;
pub use error::{EngineError, PendingError, Result};
pub use events::{EventBus, SessionEvent, SubscriptionId};
pub use pending::{AddAllReport, AddOutcome, PendingEntry, PendingSet};
pub use session::{SessionBuilder, TransferSession};
pub use tracker::{JobTracker, TrackerTimings};
