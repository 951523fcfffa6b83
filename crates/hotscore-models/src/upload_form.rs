//! Client upload form state.
//!
//! Mirrors the browser page: one selected image with a preview, a loading
//! flag, the last error and the last prediction. Validation here is advisory;
//! the relay validates again.
//!
//! This models the state kept by the script in `hotscore-api/assets/index.html`.
//! The server never constructs it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::image::{ImageValidationError, UploadedImage};
use crate::prediction::{PredictionResponse, PredictionValue};

/// Local state of the upload form. Nothing survives a reset.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    selected: Option<UploadedImage>,
    preview: Option<String>,
    loading: bool,
    error: Option<String>,
    prediction: Option<PredictionValue>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a file. On rejection the previous selection is kept and the
    /// message is shown.
    pub fn select(
        &mut self,
        file_name: &str,
        declared_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ImageValidationError> {
        match UploadedImage::new(Some(file_name), Some(declared_type), bytes) {
            Ok(image) => {
                self.preview = Some(preview_url(&image));
                self.selected = Some(image);
                self.prediction = None;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.loading
    }

    /// Start a submission, returning the image to send.
    pub fn begin_submit(&mut self) -> Option<&UploadedImage> {
        if !self.can_submit() {
            return None;
        }
        self.loading = true;
        self.error = None;
        self.prediction = None;
        self.selected.as_ref()
    }

    /// Record the outcome of a submission.
    pub fn finish_submit(&mut self, outcome: Result<PredictionResponse, String>) {
        self.loading = false;
        match outcome {
            Ok(response) => self.prediction = Some(response.prediction),
            Err(message) => self.error = Some(message),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn selected(&self) -> Option<&UploadedImage> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn prediction(&self) -> Option<&PredictionValue> {
        self.prediction.as_ref()
    }
}

fn preview_url(image: &UploadedImage) -> String {
    format!("data:{};base64,{}", image.mime(), STANDARD.encode(image.bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::MAX_IMAGE_BYTES;

    #[test]
    fn test_select_builds_preview() {
        let mut form = UploadForm::new();
        form.select("face.png", "image/png", vec![0x89, 0x50]).unwrap();

        assert_eq!(form.preview(), Some("data:image/png;base64,iVA="));
        assert!(form.can_submit());
        assert!(form.error().is_none());
    }

    #[test]
    fn test_rejected_select_keeps_previous_image() {
        let mut form = UploadForm::new();
        form.select("face.jpg", "image/jpeg", vec![1]).unwrap();

        let err = form.select("anim.gif", "image/gif", vec![1]).unwrap_err();
        assert!(matches!(err, ImageValidationError::UnsupportedType(_)));
        assert_eq!(form.error(), Some("Invalid file type. Use JPG, PNG, or WebP"));
        assert_eq!(form.selected().unwrap().file_name(), "face.jpg");

        form.select("big.jpg", "image/jpeg", vec![0; MAX_IMAGE_BYTES + 1])
            .unwrap_err();
        assert_eq!(form.error(), Some("Image too large. Maximum size is 5MB"));
    }

    #[test]
    fn test_submit_lifecycle() {
        let mut form = UploadForm::new();
        assert!(form.begin_submit().is_none());

        form.select("face.webp", "image/webp", vec![1, 2]).unwrap();
        assert_eq!(form.begin_submit().unwrap().file_name(), "face.webp");
        assert!(form.is_loading());
        // No double submission while in flight
        assert!(form.begin_submit().is_none());

        form.finish_submit(Ok(PredictionResponse {
            prediction: PredictionValue::Number(7.8),
        }));
        assert!(!form.is_loading());
        assert_eq!(form.prediction(), Some(&PredictionValue::Number(7.8)));

        form.begin_submit().unwrap();
        assert!(form.prediction().is_none());
        form.finish_submit(Err("Failed to upload image".to_string()));
        assert_eq!(form.error(), Some("Failed to upload image"));
        assert!(form.prediction().is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = UploadForm::new();
        form.select("face.jpg", "image/jpeg", vec![1]).unwrap();
        form.begin_submit();
        form.reset();

        assert!(form.selected().is_none());
        assert!(form.preview().is_none());
        assert!(!form.is_loading());
        assert!(form.error().is_none());
        assert!(form.prediction().is_none());
    }
}
