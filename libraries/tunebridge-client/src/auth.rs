//! Session introspection against the transfer server.

use crate::client::endpoint;
use crate::error::{ClientError, Result};
use crate::types::AuthInfo;
use reqwest::Client;
use tracing::debug;

/// Auth client for the transfer server.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Fetch the session's user id and linked OAuth providers.
    pub async fn auth_info(&self) -> Result<AuthInfo> {
        let url = endpoint(self.base_url, &["auth", "info"])?;
        debug!(url = %url, "Fetching auth info");

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

        let info: AuthInfo = response.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse auth info: {e}"))
        })?;

        debug!(
            user_id = %info.user_id,
            linked = info.oauth.len(),
            "Fetched auth info"
        );

        Ok(info)
    }
}
