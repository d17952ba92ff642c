//! HTTP surface.
//!
//! One endpoint: `POST /schedule` accepting the request JSON and
//! returning the response JSON. Validation and infeasibility failures
//! map to 400 with a `{"detail": ...}` body; decoder faults map to 500.
//! The solve itself is CPU-bound and runs on the blocking pool.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::api::{solve, ScheduleRequest, ScheduleResponse};
use crate::error::ScheduleError;

/// Error body of a failed request.
#[derive(Debug, Serialize)]
struct ErrorDetail {
    detail: String,
}

struct ApiError(ScheduleError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ScheduleError::Validation(_) | ScheduleError::Infeasible(_) => {
                warn!(error = %self.0, "request rejected");
                StatusCode::BAD_REQUEST
            }
            ScheduleError::Internal(_) => {
                error!(error = %self.0, "scheduling failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorDetail {
            detail: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

/// Builds the application router.
pub fn router() -> Router {
    Router::new().route("/schedule", post(schedule_handler))
}

async fn schedule_handler(
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || solve(&request))
        .await
        .map_err(|e| {
            ApiError(ScheduleError::Internal(format!(
                "scheduler task panicked: {e}"
            )))
        })?
        .map_err(ApiError)?;
    Ok(Json(response))
}
