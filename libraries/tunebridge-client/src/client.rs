//! Main transfer server client.

use crate::auth::AuthClient;
use crate::catalog::CatalogClient;
use crate::error::{ClientError, Result};
use crate::platform::HttpPlatformClient;
use crate::transfer::TransferClient;
use crate::types::{AuthInfo, ServerConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use tunebridge_core::{
    AuthedRequest, JobId, Platform, PlaylistPage, TransferApi, TransferBatchRequest,
    TransferBatchResponse, TransferStatusReport, TransportResult,
};
use url::Url;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build `{base}/{segments...}` with each segment percent-encoded.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ClientError::InvalidUrl(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Client for the transfer server API.
///
/// Holds the session token and hands out per-platform
/// [`PlatformClient`](tunebridge_core::PlatformClient) adapters. It implements
/// [`TransferApi`] directly so the engine can commit and poll through it.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use tunebridge_client::{ServerConfig, TransferServerClient};
/// use tunebridge_core::Platform;
///
/// let client = Arc::new(TransferServerClient::new(ServerConfig::with_token(
///     "https://tunebridge.example.com/api",
///     token,
/// ))?);
///
/// let info = client.auth_info().await?;
/// println!("Signed in as {}", info.user_id);
///
/// let spotify = TransferServerClient::platform_client(&client, Platform::Spotify);
/// ```
pub struct TransferServerClient {
    http: Client,
    config: Arc<RwLock<ServerConfig>>,
}

impl TransferServerClient {
    /// Create a new client with default timeouts.
    pub fn new(config: ServerConfig) -> Result<Self> {
        Self::with_timeouts(config, DEFAULT_REQUEST_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new client with explicit request and connect timeouts.
    pub fn with_timeouts(
        config: ServerConfig,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim().trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        Url::parse(&url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .user_agent(format!("TuneBridge/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(ServerConfig {
                url,
                access_token: config.access_token,
            })),
        })
    }

    /// Get the API base URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client has a session token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Replace the session token.
    pub async fn set_token(&self, access_token: impl Into<String>) {
        self.config.write().await.access_token = Some(access_token.into());
    }

    /// Drop the session token (sign out).
    pub async fn clear_token(&self) {
        self.config.write().await.access_token = None;
        info!("Session token cleared");
    }

    /// Adapter exposing one platform's catalog through this client.
    pub fn platform_client(this: &Arc<Self>, platform: Platform) -> HttpPlatformClient {
        HttpPlatformClient::new(Arc::clone(this), platform)
    }

    /// URL and token, or `AuthRequired` when signed out.
    async fn credentials(&self) -> Result<(String, String)> {
        let config = self.config.read().await;
        let token = config
            .access_token
            .clone()
            .ok_or(ClientError::AuthRequired)?;
        Ok((config.url.clone(), token))
    }

    /// Fetch the session's user and linked providers.
    pub async fn auth_info(&self) -> Result<AuthInfo> {
        let (url, token) = self.credentials().await?;
        AuthClient::new(&self.http, &url, &token).auth_info().await
    }

    /// Submit a transfer batch.
    pub async fn submit_transfer(
        &self,
        request: &TransferBatchRequest,
    ) -> Result<TransferBatchResponse> {
        let (url, token) = self.credentials().await?;
        TransferClient::new(&self.http, &url, &token)
            .submit(request)
            .await
    }

    /// Read one job's status.
    pub async fn job_status(&self, job_id: &JobId) -> Result<TransferStatusReport> {
        let (url, token) = self.credentials().await?;
        TransferClient::new(&self.http, &url, &token)
            .status(job_id)
            .await
    }

    /// Fetch the user's playlists on `platform`.
    pub async fn playlists(&self, platform: Platform, force: bool) -> Result<PlaylistPage> {
        let (url, token) = self.credentials().await?;
        CatalogClient::new(&self.http, &url, &token)
            .playlists(platform, force)
            .await
    }

    /// Perform an authenticated request relative to the API base.
    pub async fn request(&self, request: &AuthedRequest) -> Result<serde_json::Value> {
        let (url, token) = self.credentials().await?;
        CatalogClient::new(&self.http, &url, &token)
            .request(request)
            .await
    }
}

#[async_trait]
impl TransferApi for TransferServerClient {
    async fn submit_batch(
        &self,
        request: &TransferBatchRequest,
    ) -> TransportResult<TransferBatchResponse> {
        Ok(self.submit_transfer(request).await?)
    }

    async fn transfer_status(&self, job_id: &JobId) -> TransportResult<TransferStatusReport> {
        Ok(self.job_status(job_id).await?)
    }
}
