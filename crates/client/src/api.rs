//! REST client for the put.io v2 file API.
//!
//! Wraps the HTTP endpoints the janitor needs (account accounting, folder
//! and trash listings, soft and permanent deletion) using [`reqwest`].
//! Every call goes through the bounded retry wrapper; responses are
//! normalized into core types at this boundary.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use putsweep_core::types::{AccountState, FileId, RemoteEntry};

use crate::retry::{with_retry, RetryConfig};
use crate::store::{RemoteStore, StoreError};
use crate::wire::{AccountInfoResponse, FileListResponse, FileRecord};

/// HTTP client for a put.io-compatible account.
pub struct PutioStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
    retry: RetryConfig,
}

impl PutioStore {
    /// Create a client for the account behind `token`.
    ///
    /// * `base_url` - API base, e.g. `https://api.put.io/v2`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, retry: RetryConfig) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            retry,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("token {}", self.token),
            )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, StoreError> {
        let response = self
            .request(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Transient(format!("Invalid response body: {e}")))
    }

    async fn post_delete(
        &self,
        query: &'static [(&str, &str)],
        file_id: FileId,
    ) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::POST, "/files/delete")
            .query(query)
            .form(&[("file_ids", file_id.to_string())])
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for PutioStore {
    async fn account_state(&self) -> Result<AccountState, StoreError> {
        with_retry(&self.retry, "account_state", || async move {
            let resp: AccountInfoResponse = self.get_json("/account/info", &[]).await?;
            Ok(AccountState {
                disk_size: resp.info.disk.size,
                disk_used: resp.info.disk.used,
                disk_avail: resp.info.disk.avail,
                trash_size: resp.info.trash_size,
            })
        })
        .await
    }

    async fn list_children(&self, folder_id: FileId) -> Result<Vec<RemoteEntry>, StoreError> {
        with_retry(&self.retry, "list_children", || async move {
            let resp: FileListResponse = self
                .get_json("/files/list", &[("parent_id", folder_id.to_string())])
                .await?;
            Ok(resp.files.into_iter().map(FileRecord::into_entry).collect())
        })
        .await
    }

    async fn list_trash(&self) -> Result<Vec<RemoteEntry>, StoreError> {
        with_retry(&self.retry, "list_trash", || async move {
            let resp: FileListResponse = self
                .get_json("/files/list", &[("trash", "true".to_string())])
                .await?;
            Ok(resp.files.into_iter().map(FileRecord::into_entry).collect())
        })
        .await
    }

    async fn move_to_trash(&self, id: FileId) -> Result<(), StoreError> {
        with_retry(&self.retry, "move_to_trash", || self.post_delete(&[], id)).await
    }

    async fn delete_permanently(&self, id: FileId, from_trash: bool) -> Result<(), StoreError> {
        let query: &'static [(&str, &str)] = if from_trash {
            &[("trash", "true"), ("permanently", "true")]
        } else {
            &[("permanently", "true")]
        };
        with_retry(&self.retry, "delete_permanently", || {
            self.post_delete(query, id)
        })
        .await
    }
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or the mapped [`StoreError`] with the status and
/// body text on failure.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(status_error(status, &body))
}

/// Map a non-success status into the error taxonomy: auth failures are
/// fatal and never retried, everything else counts as transient.
fn status_error(status: StatusCode, body: &str) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StoreError::Auth(format!("{status}: {body}"))
        }
        _ => StoreError::Transient(format!("{status}: {body}")),
    }
}

fn transport_error(e: reqwest::Error) -> StoreError {
    StoreError::Transient(format!("HTTP request failed: {e}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
