//! `POST /translate` handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use metrics::counter;
use parley_core::{ErrorBody, PipelineError, TranslateRequestBody};
use tracing::debug;

use crate::metrics::{PIPELINE_FAILURES_TOTAL, TRANSLATE_REQUESTS_TOTAL};
use crate::server::AppState;

/// Run the pipeline for one request and map the outcome to HTTP.
///
/// A body that is not a JSON object of the expected shape is a 400 before
/// any engine runs.
pub async fn translate_handler(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequestBody>, JsonRejection>,
) -> Response {
    counter!(TRANSLATE_REQUESTS_TOTAL).increment(1);

    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "rejected translate body");
            counter!(PIPELINE_FAILURES_TOTAL, "kind" => "invalid_request").increment(1);
            let body = ErrorBody::new(format!("Invalid JSON body: {}", rejection.body_text()));
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match state.pipeline.run(body).await {
        Ok(result) => Json(result.to_response()).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Status and `{error, hint?}` body for a pipeline failure.
pub fn error_response(err: &PipelineError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorBody::from(err))).into_response()
}
