//! Upload, submit and result relay to the prediction space.

use std::future::Future;
use std::time::Instant;

use hotscore_gradio::{GradioClient, GradioError, GradioResult, Step};
use hotscore_models::{PredictionValue, UploadedImage};
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// Runs the three space calls for one validated image. Each call depends on
/// the previous one; the first failure ends the sequence.
pub struct PredictionRelay {
    client: GradioClient,
}

impl PredictionRelay {
    pub fn new(client: GradioClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GradioClient {
        &self.client
    }

    pub async fn predict(&self, image: &UploadedImage) -> ApiResult<PredictionValue> {
        let handle = timed(Step::Upload, self.client.upload(image)).await?;
        let event_id = timed(Step::Submit, self.client.submit(&handle)).await?;
        let prediction = timed(Step::Result, self.client.fetch_result(&event_id)).await?;

        info!(event_id = %event_id, prediction = %prediction, "Prediction complete");
        Ok(prediction)
    }
}

async fn timed<T>(step: Step, call: impl Future<Output = GradioResult<T>>) -> ApiResult<T> {
    let start = Instant::now();
    let result = call.await;
    metrics::record_upstream_call(step.as_str(), result.is_ok(), start.elapsed().as_secs_f64());
    result.map_err(|e| upstream_error(step, e))
}

/// Map a space failure to the client-facing error for its step.
fn upstream_error(step: Step, err: GradioError) -> ApiError {
    error!(step = %step, error = %err, "Space call failed");

    match (step, &err) {
        (Step::Upload, GradioError::Status { .. }) => ApiError::UploadFailed,
        (Step::Submit, GradioError::Status { .. }) => ApiError::SubmitFailed,
        (Step::Result, GradioError::Status { .. } | GradioError::Network(_)) => {
            ApiError::ResultUnavailable
        }
        (Step::Result, GradioError::Stream(_)) => ApiError::UnparseableResult,
        _ => ApiError::internal(err.to_string()),
    }
}
