//! Playlist catalog and pass-through authenticated requests.

use crate::client::endpoint;
use crate::error::{ClientError, Result};
use reqwest::{Client, Method};
use tracing::debug;
use tunebridge_core::{AuthedRequest, Platform, PlaylistPage, RequestMethod};

/// Catalog client for the transfer server.
pub struct CatalogClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> CatalogClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Fetch the user's playlists on `platform`.
    ///
    /// With `force` the server re-reads the platform instead of its cache.
    pub async fn playlists(&self, platform: Platform, force: bool) -> Result<PlaylistPage> {
        let mut url = endpoint(self.base_url, &["playlists", platform.as_str()])?;
        url.query_pairs_mut()
            .append_pair("fetch", if force { "true" } else { "false" });
        debug!(url = %url, platform = %platform, "Fetching playlists");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        let mut page: PlaylistPage = response.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse playlists: {e}"))
        })?;

        // Entries are keyed by the platform they were fetched for
        for playlist in &mut page.playlists {
            playlist.platform = platform;
        }

        debug!(platform = %platform, count = page.playlists.len(), "Fetched playlists");
        Ok(page)
    }

    /// Perform an arbitrary authenticated request and return its JSON body.
    ///
    /// An empty body yields `null`.
    pub async fn request(&self, request: &AuthedRequest) -> Result<serde_json::Value> {
        let segments: Vec<&str> = request
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let url = endpoint(self.base_url, &segments)?;
        let method = match request.method {
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
            RequestMethod::Put => Method::PUT,
            RequestMethod::Delete => Method::DELETE,
        };
        debug!(url = %url, method = %method, "Authenticated request");

        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(self.access_token);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ClientError::from_send)?;
        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse response body: {e}")))
    }
}
