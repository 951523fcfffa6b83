//! Prediction relay handler.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use hotscore_models::{
    validate_declared_type, validate_size, ImageValidationError, PredictionResponse,
    UploadedImage,
};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Accept an image upload and relay it to the prediction space.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<PredictionResponse>> {
    let result = relay_upload(&state, multipart).await;

    metrics::record_prediction(match &result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    });

    result.map(Json)
}

async fn relay_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<PredictionResponse> {
    let multipart =
        multipart.map_err(|e| ApiError::internal(format!("invalid multipart request: {}", e)))?;

    let image = read_image_field(multipart).await?;
    info!(
        file_name = %image.file_name(),
        mime = %image.mime(),
        size = image.size(),
        "Relaying prediction"
    );

    let prediction = state.relay.predict(&image).await?;

    Ok(PredictionResponse { prediction })
}

/// Find the `image` field and validate it. The declared type is checked
/// before reading, and reading stops once the size limit is exceeded.
async fn read_image_field(mut multipart: Multipart) -> ApiResult<UploadedImage> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let mime = validate_declared_type(field.content_type())?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            validate_size(bytes.len() + chunk.len())?;
            bytes.extend_from_slice(&chunk);
        }

        return Ok(UploadedImage::new(
            file_name.as_deref(),
            Some(mime.as_str()),
            bytes,
        )?);
    }

    Err(ApiError::MissingImage)
}

fn multipart_error(err: MultipartError) -> ApiError {
    // Body limit hit while streaming: the upload is over the image cap too
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ImageValidationError::TooLarge { size: usize::MAX }.into();
    }
    ApiError::internal(format!("multipart read failed: {}", err))
}
