//! HTTP mapping of [`AuthError`].

use api::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// An [`AuthError`] rendered as `{"error": "..."}` with a matching status code.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            AuthError::Validation(_) | AuthError::InvalidOrExpired | AuthError::Conflict => {
                StatusCode::BAD_REQUEST
            }
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AuthError::Delivery(_)
            | AuthError::Provider(_)
            | AuthError::Token(_)
            | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.public_message() }))).into_response()
    }
}
