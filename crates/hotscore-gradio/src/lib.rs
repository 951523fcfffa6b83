//! Client for the hosted Gradio prediction space.
//!
//! The space exposes a three-step job API: upload a file, submit a job that
//! references the upload, then read the job's event stream for the result.
//! This crate wraps those calls and parses the stream.

pub mod client;
pub mod error;
pub mod event_stream;
pub mod types;

pub use client::{GradioClient, GradioClientConfig};
pub use error::{GradioError, GradioResult, Step};
pub use event_stream::{EventStreamError, EventStreamParser, PredictionReader, ServerEvent};
pub use types::{EventId, SubmitRequest, SubmitResponse, UploadHandle};
