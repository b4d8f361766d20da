//! Transfer queue endpoints: batch commit and per-job status.

use crate::client::endpoint;
use crate::error::{ClientError, Result};
use reqwest::Client;
use tracing::{debug, info};
use tunebridge_core::{JobId, TransferBatchRequest, TransferBatchResponse, TransferStatusReport};

/// Transfer client for the transfer server.
pub struct TransferClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> TransferClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Submit a batch of playlists for transfer.
    ///
    /// Any non-2xx answer fails the whole batch.
    pub async fn submit(&self, request: &TransferBatchRequest) -> Result<TransferBatchResponse> {
        let url = endpoint(self.base_url, &["transfer"])?;
        debug!(
            url = %url,
            items = request.items.len(),
            destination = %request.destination,
            "Submitting transfer batch"
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(self.access_token)
            .json(request)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        let batch: TransferBatchResponse = response.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse transfer response: {e}"))
        })?;

        info!(
            accepted = batch.results.as_ref().map_or(batch.ids.len(), Vec::len),
            failed = batch.failed_ids.len(),
            "Transfer batch accepted"
        );

        Ok(batch)
    }

    /// Read the current status of one job.
    pub async fn status(&self, job_id: &JobId) -> Result<TransferStatusReport> {
        let url = endpoint(self.base_url, &["transfer", job_id.as_str()])?;
        debug!(url = %url, "Polling transfer status");

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

        response.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse transfer status: {e}"))
        })
    }
}
