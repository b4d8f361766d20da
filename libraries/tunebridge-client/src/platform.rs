//! [`PlatformClient`] adapter over the transfer server.

use crate::client::TransferServerClient;
use crate::error::ClientError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use tunebridge_core::{AuthedRequest, FetchResult, Platform, PlatformClient, PlaylistPage};

/// One platform's view of a shared [`TransferServerClient`].
#[derive(Clone)]
pub struct HttpPlatformClient {
    server: Arc<TransferServerClient>,
    platform: Platform,
}

impl HttpPlatformClient {
    pub fn new(server: Arc<TransferServerClient>, platform: Platform) -> Self {
        Self { server, platform }
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn is_logged_in(&self) -> FetchResult<bool> {
        if !self.server.is_authenticated().await {
            return Ok(false);
        }
        match self.server.auth_info().await {
            Ok(info) => Ok(info.is_linked(self.platform)),
            Err(ClientError::Unauthorized { status }) => {
                debug!(platform = %self.platform, status, "Session rejected, not logged in");
                Ok(false)
            }
            Err(e) => Err(e.into_fetch(self.platform)),
        }
    }

    async fn get_user_playlists(&self, force: bool) -> FetchResult<PlaylistPage> {
        self.server
            .playlists(self.platform, force)
            .await
            .map_err(|e| e.into_fetch(self.platform))
    }

    async fn request_with_auth(&self, request: AuthedRequest) -> FetchResult<serde_json::Value> {
        self.server
            .request(&request)
            .await
            .map_err(|e| e.into_fetch(self.platform))
    }
}
