//! TuneBridge Client
//!
//! HTTP client for the TuneBridge transfer server API.
//!
//! # Features
//!
//! - **Transfers**: submit a batch and poll each job's status
//! - **Catalog**: fetch a platform's playlists, optionally bypassing the cache
//! - **Session**: read linked OAuth providers from `/auth/info`
//!
//! [`TransferServerClient`] implements [`tunebridge_core::TransferApi`];
//! [`HttpPlatformClient`] implements [`tunebridge_core::PlatformClient`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tunebridge_client::{ServerConfig, TransferServerClient};
//! use tunebridge_core::{Platform, PlatformClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::with_token("https://tunebridge.example.com/api", "jwt");
//!     let client = Arc::new(TransferServerClient::new(config)?);
//!
//!     let spotify = TransferServerClient::platform_client(&client, Platform::Spotify);
//!     let page = spotify.get_user_playlists(false).await?;
//!     println!("Found {} playlists", page.playlists.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod catalog;
mod client;
mod error;
mod platform;
mod transfer;
mod types;

pub use client::TransferServerClient;
pub use error::{ClientError, Result};
pub use platform::HttpPlatformClient;
pub use types::{AuthInfo, JwtInfo, LinkedAccount, ServerConfig};

// Sub-clients for direct use
pub use auth::AuthClient;
pub use catalog::CatalogClient;
pub use transfer::TransferClient;
