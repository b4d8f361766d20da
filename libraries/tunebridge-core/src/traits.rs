//! Boundary traits implemented by external collaborators.
//!
//! The engine never talks HTTP itself. Everything network-bound goes through
//! [`PlatformClient`] (catalog and auth state per platform) or
//! [`TransferApi`] (the transfer job queue).

use crate::error::{FetchResult, TransportResult};
use crate::types::{
    JobId, Platform, PlaylistPage, TransferBatchRequest, TransferBatchResponse,
    TransferStatusReport,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// HTTP verb for [`PlatformClient::request_with_auth`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An authenticated call a platform client performs on the caller's behalf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthedRequest {
    pub method: RequestMethod,
    /// Path relative to the API base, e.g. `/spotify/me`
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl AuthedRequest {
    /// GET request for `path`
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: RequestMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    /// POST request for `path` with a JSON body
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: RequestMethod::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Per-platform capability the catalog relies on.
///
/// Implementations own token handling; the engine only sees results.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Platform this client serves
    fn platform(&self) -> Platform;

    /// Whether the session has a linked account for this platform
    async fn is_logged_in(&self) -> FetchResult<bool>;

    /// Fetch the user's playlists. `force` bypasses any server-side cache.
    async fn get_user_playlists(&self, force: bool) -> FetchResult<PlaylistPage>;

    /// Perform an arbitrary authenticated request and return the JSON body
    async fn request_with_auth(&self, request: AuthedRequest) -> FetchResult<serde_json::Value>;
}

/// The transfer job queue on the server.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait TransferApi: Send + Sync {
    /// Submit one batch. Any transport failure fails the whole batch.
    async fn submit_batch(
        &self,
        request: &TransferBatchRequest,
    ) -> TransportResult<TransferBatchResponse>;

    /// Read the current status of one job
    async fn transfer_status(&self, job_id: &JobId) -> TransportResult<TransferStatusReport>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[tokio::test]
    async fn mock_platform_client_reports_auth_failures() {
        let mut client = MockPlatformClient::new();
        client.expect_platform().return_const(Platform::Spotify);
        client
            .expect_get_user_playlists()
            .returning(|_| Err(FetchError::Unauthorized { platform: Platform::Spotify, status: 401 }));

        let err = client.get_user_playlists(true).await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(client.platform(), Platform::Spotify);
    }

    #[test]
    fn authed_request_builders() {
        let req = AuthedRequest::post("/spotify/playlists", serde_json::json!({"name": "x"}));
        assert_eq!(req.method, RequestMethod::Post);
        assert!(req.body.is_some());
        assert_eq!(AuthedRequest::get("/auth/info").method, RequestMethod::Get);
    }
}
