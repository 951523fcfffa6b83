//! Uploaded image types and validation.
//!
//! Validation is trust-based: the MIME type is the one declared by the
//! client, and the size is the number of bytes actually received. File
//! signatures are not sniffed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum accepted image size in bytes (5 MiB, inclusive).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Image MIME types accepted by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Webp => "image/webp",
        }
    }

    /// File extension used when the client did not send a file name.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "jpg",
            ImageMime::Png => "png",
            ImageMime::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImageMime {
    type Err = ImageValidationError;

    /// Parameters such as `; charset=binary` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" => Ok(ImageMime::Jpeg),
            "image/png" => Ok(ImageMime::Png),
            "image/webp" => Ok(ImageMime::Webp),
            _ => Err(ImageValidationError::UnsupportedType(s.to_string())),
        }
    }
}

/// Reasons an upload is rejected before any outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageValidationError {
    #[error("Invalid file type. Use JPG, PNG, or WebP")]
    UnsupportedType(String),

    #[error("Image too large. Maximum size is 5MB")]
    TooLarge { size: usize },
}

/// Check a declared content type. `None` means the client sent none.
pub fn validate_declared_type(declared: Option<&str>) -> Result<ImageMime, ImageValidationError> {
    match declared {
        Some(ct) => ct.parse(),
        None => Err(ImageValidationError::UnsupportedType(String::new())),
    }
}

/// Check a byte count against [`MAX_IMAGE_BYTES`].
pub fn validate_size(size: usize) -> Result<(), ImageValidationError> {
    if size > MAX_IMAGE_BYTES {
        return Err(ImageValidationError::TooLarge { size });
    }
    Ok(())
}

/// An image that passed validation, held in memory for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    file_name: String,
    mime: ImageMime,
    bytes: Vec<u8>,
}

impl UploadedImage {
    /// Validate type then size, the same order the upload form uses.
    pub fn new(
        file_name: Option<&str>,
        declared_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, ImageValidationError> {
        let mime = validate_declared_type(declared_type)?;
        validate_size(bytes.len())?;

        let file_name = match file_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("image.{}", mime.extension()),
        };

        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_parse() {
        assert_eq!("image/jpeg".parse::<ImageMime>().unwrap(), ImageMime::Jpeg);
        assert_eq!("IMAGE/PNG".parse::<ImageMime>().unwrap(), ImageMime::Png);
        assert_eq!(
            "image/webp; charset=binary".parse::<ImageMime>().unwrap(),
            ImageMime::Webp
        );
        assert!("image/gif".parse::<ImageMime>().is_err());
        assert!("text/plain".parse::<ImageMime>().is_err());
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(validate_size(MAX_IMAGE_BYTES).is_ok());
        assert_eq!(
            validate_size(MAX_IMAGE_BYTES + 1),
            Err(ImageValidationError::TooLarge {
                size: MAX_IMAGE_BYTES + 1
            })
        );
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let err = validate_declared_type(None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid file type. Use JPG, PNG, or WebP");
    }

    #[test]
    fn test_type_checked_before_size() {
        let err = UploadedImage::new(Some("a.gif"), Some("image/gif"), vec![0; MAX_IMAGE_BYTES + 1])
            .unwrap_err();
        assert!(matches!(err, ImageValidationError::UnsupportedType(_)));
    }

    #[test]
    fn test_default_file_name() {
        let image = UploadedImage::new(None, Some("image/png"), vec![1, 2, 3]).unwrap();
        assert_eq!(image.file_name(), "image.png");
        assert_eq!(image.size(), 3);

        let image = UploadedImage::new(Some("me.jpg"), Some("image/jpeg"), vec![]).unwrap();
        assert_eq!(image.file_name(), "me.jpg");
    }
}
