//! Types for the transfer server API that never leave this crate's boundary.

use serde::{Deserialize, Serialize};
use tunebridge_core::Platform;

/// Configuration for connecting to the transfer server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// API base URL (e.g., "https://tunebridge.example.com/api")
    pub url: String,
    /// Bearer token for the session, if signed in
    pub access_token: Option<String>,
}

impl ServerConfig {
    /// Create a new server config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
        }
    }

    /// Create a config with an existing session token.
    pub fn with_token(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: Some(access_token.into()),
        }
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Session token lifetime as reported by `/auth/info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtInfo {
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Seconds until expiry
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// One OAuth provider linked to the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    /// Provider name in wire form ("spotify", "apple", "soundcloud")
    pub provider: String,
    #[serde(default)]
    pub provider_id: Option<String>,
}

impl LinkedAccount {
    /// Platform for this provider, if it is one the engine knows
    pub fn platform(&self) -> Option<Platform> {
        Platform::parse(&self.provider)
    }
}

/// Response from `GET /auth/info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub user_id: String,
    #[serde(default)]
    pub jwt: Option<JwtInfo>,
    #[serde(default)]
    pub oauth: Vec<LinkedAccount>,
}

impl AuthInfo {
    /// Platforms with a linked account
    pub fn linked_platforms(&self) -> Vec<Platform> {
        self.oauth.iter().filter_map(LinkedAccount::platform).collect()
    }

    /// Whether `platform` has a linked account
    pub fn is_linked(&self, platform: Platform) -> bool {
        self.oauth
            .iter()
            .any(|account| account.platform() == Some(platform))
    }
}
