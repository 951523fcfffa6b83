//! Shared data models for the HotScore relay.
//!
//! This crate provides:
//! - Image validation shared by the relay and the upload form
//! - Prediction values and the relay's JSON bodies
//! - The upload form state machine

pub mod image;
pub mod prediction;
pub mod upload_form;

pub use image::{
    validate_declared_type, validate_size, ImageMime, ImageValidationError, UploadedImage,
    MAX_IMAGE_BYTES,
};
pub use prediction::{ErrorResponse, PredictionResponse, PredictionValue};
pub use upload_form::UploadForm;
