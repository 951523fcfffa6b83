//! Gradio space request/response types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side path of an uploaded file. Only valid within the request that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadHandle(pub String);

impl UploadHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a submitted prediction job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// File reference inside a job's input data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileData {
    pub path: String,
}

/// Body of `POST /gradio_api/call/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub data: Vec<FileData>,
}

impl SubmitRequest {
    pub fn for_upload(handle: &UploadHandle) -> Self {
        Self {
            data: vec![FileData {
                path: handle.0.clone(),
            }],
        }
    }
}

/// Response of `POST /gradio_api/call/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub event_id: String,
}
