//! Page and prediction handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use screening::{ScreeningError, TransactionForm};

use crate::page;
use crate::AppState;

/// Failure that escapes the handler and becomes a plain error response.
#[derive(Debug)]
pub struct ApiError(ScreeningError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(error) = self;
        if matches!(error, ScreeningError::MissingField(_)) {
            tracing::warn!(%error, "bad request");
            return (StatusCode::BAD_REQUEST, error.to_string()).into_response();
        }
        tracing::error!(%error, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Input form.
pub async fn index() -> Html<String> {
    Html(page::render(None))
}

/// Screen the submitted transaction and re-render the form with the verdict.
///
/// Conversion failures are shown inline; every other failure propagates.
pub async fn predict(
    State(state): State<AppState>,
    Form(form): Form<TransactionForm>,
) -> Result<Html<String>, ApiError> {
    match state.screener.screen(&form) {
        Ok(verdict) => Ok(Html(page::render(Some(verdict.message())))),
        Err(e) if e.is_input_error() => {
            tracing::info!(error = %e, "rejected form input");
            Ok(Html(page::render(Some(&format!("Error: {e}")))))
        }
        Err(e) => Err(ApiError(e)),
    }
}
