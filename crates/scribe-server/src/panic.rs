use std::any::Any;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use transcription::ErrorResponse;

/// Render a caught handler panic as the generic `api_error` envelope
///
/// The panic payload is logged and never returned to the caller.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };

    tracing::error!(panic = %message, "Request handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal())).into_response()
}
