//! TuneBridge Core
//!
//! Platform-agnostic types, the transfer state machine and the boundary
//! traits used by the TuneBridge playlist transfer engine.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Platform`, `Playlist`, `TransferJob`, wire shapes
//! - **State Machine**: `TransferStatus` and its `Transition`s
//! - **Boundary Traits**: `PlatformClient`, `TransferApi`
//! - **Error Handling**: `FetchError` and `TransportError`
//!
//! # Example
//!
//! ```rust
//! use tunebridge_core::{JobId, Platform, Playlist, TransferJob, TransferStatus};
//!
//! let playlist = Playlist::new("p1", "cupid arrows", Platform::AppleMusic, 119);
//! let mut job = TransferJob::accepted(JobId::new("j1"), &playlist, Platform::Spotify.into());
//!
//! job.observe(TransferStatus::Processing);
//! job.observe(TransferStatus::Success);
//! assert!(!job.needs_poll());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{FetchError, FetchResult, TransportError, TransportResult};
pub use traits::{AuthedRequest, PlatformClient, RequestMethod, TransferApi};

#[cfg(any(test, feature = "mock"))]
pub use traits::{MockPlatformClient, MockTransferApi};

pub use types::{
    DestinationRef, JobId, Platform, Playlist, PlaylistId, PlaylistPage, TransferBatchRequest,
    TransferBatchResponse, TransferItem, TransferItemResult, TransferJob, TransferStatus,
    TransferStatusReport, Transition, LOCAL_JOB_PREFIX,
};
