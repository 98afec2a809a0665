//! Resource client: typed access to the backend's REST collections
//!
//! The console only talks to the backend through [`ResourceApi`], so a
//! session can run against the real HTTP client or a mock.

mod http;

pub use http::HttpApi;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ApiError;
use crate::model::{
    ForbiddenWord, ForbiddenWordPayload, JoinedGroup, Payload, Record, ResourceKind,
    UploadCategory, UsageSnapshot,
};

/// Status value that marks a successful envelope
pub const STATUS_SUCCESS: &str = "success";

/// A file ready to be sent to `/api/upload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub category: UploadCategory,
}

/// Where the server stored an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredFile {
    pub filename: String,
    /// Server-side path; becomes the record's media reference
    pub filepath: String,
}

/// Envelope returned by every mutating endpoint.
///
/// Most endpoints answer `{"status": "success"}`; the converter endpoints
/// answer `{"success": true, "message": ...}` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS || self.success == Some(true)
    }

    /// Anything but the success marker is a rejection
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_success() {
            return Ok(());
        }
        let reason = match self.error.or(self.message) {
            Some(error) if !error.is_empty() => error,
            _ if self.success == Some(false) => "success false".to_string(),
            _ if self.status.is_empty() => "missing status".to_string(),
            _ => format!("status '{}'", self.status),
        };
        Err(ApiError::Rejected(reason))
    }
}

/// Operations the console needs from the backend.
///
/// Implementations normalize every failure (network, bad body, non-2xx,
/// rejected envelope) into an `ApiError` and never touch local state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Fetch a whole collection
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Record>, ApiError>;

    async fn create(&self, payload: &Payload) -> Result<(), ApiError>;

    /// Replace a record. The payload is always complete.
    async fn update(&self, payload: &Payload) -> Result<(), ApiError>;

    async fn delete(&self, kind: ResourceKind, key: &str) -> Result<(), ApiError>;

    async fn stats(&self, days: u32) -> Result<UsageSnapshot, ApiError>;

    async fn upload(&self, request: UploadRequest) -> Result<StoredFile, ApiError>;

    /// Groups the bot account has joined, registered or not
    async fn joined_groups(&self) -> Result<Vec<JoinedGroup>, ApiError>;

    async fn forbidden_words(&self, group_jid: &str) -> Result<Vec<ForbiddenWord>, ApiError>;

    async fn add_forbidden_word(&self, payload: &ForbiddenWordPayload) -> Result<(), ApiError>;

    async fn delete_forbidden_word(&self, id: i64) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success() {
        let envelope: Envelope = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(envelope.into_result().is_ok());
    }

    #[test]
    fn test_envelope_rejection_reasons() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"status":"error","error":"duplicate keyword"}"#).unwrap();
        assert_eq!(
            envelope.into_result(),
            Err(ApiError::Rejected("duplicate keyword".into()))
        );

        let envelope: Envelope = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert_eq!(
            envelope.into_result(),
            Err(ApiError::Rejected("missing status".into()))
        );
    }

    #[test]
    fn test_envelope_success_flag() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"success":true,"message":"Converter updated successfully"}"#)
                .unwrap();
        assert!(envelope.is_success());

        let envelope: Envelope =
            serde_json::from_str(r#"{"success":false,"message":"bug host unreachable"}"#).unwrap();
        assert_eq!(
            envelope.into_result(),
            Err(ApiError::Rejected("bug host unreachable".into()))
        );

        let envelope: Envelope = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(
            envelope.into_result(),
            Err(ApiError::Rejected("success false".into()))
        );
    }
}
