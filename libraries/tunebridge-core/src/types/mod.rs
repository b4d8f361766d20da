//! Domain types shared by every TuneBridge crate.

mod ids;
mod job;
mod platform;
mod playlist;
mod status;
mod transfer;

pub use ids::{JobId, PlaylistId, LOCAL_JOB_PREFIX};
pub use job::TransferJob;
pub use platform::{DestinationRef, Platform};
pub use playlist::{Playlist, PlaylistPage};
pub use status::{TransferStatus, Transition};
pub use transfer::{
    TransferBatchRequest, TransferBatchResponse, TransferItem, TransferItemResult,
    TransferStatusReport,
};
