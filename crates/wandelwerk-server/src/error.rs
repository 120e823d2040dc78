// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP rendering of `WandelwerkError`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use wandelwerk_core::WandelwerkError;
use wandelwerk_core::human_errors::{ErrorClass, humanize_error};

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable error kind, e.g. `UnsupportedEncoding`.
    pub error: &'static str,
    /// Plain-language explanation for the person using the front end.
    pub message: String,
    /// Technical detail for logs and bug reports.
    pub detail: String,
}

/// Error type returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub WandelwerkError);

impl From<WandelwerkError> for ApiError {
    fn from(err: WandelwerkError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &WandelwerkError) -> StatusCode {
    match err {
        WandelwerkError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        WandelwerkError::UnsupportedEncoding(_) | WandelwerkError::UnsupportedSourceFormat(_) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        WandelwerkError::DecodeError(_)
        | WandelwerkError::MalformedDocument(_)
        | WandelwerkError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WandelwerkError::NotFound(_) => StatusCode::NOT_FOUND,
        WandelwerkError::ConversionTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        WandelwerkError::ConversionFailed(_)
        | WandelwerkError::Io(_)
        | WandelwerkError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let human = humanize_error(&self.0);
        let status = status_for(&self.0);
        match human.class {
            ErrorClass::Server => tracing::error!(kind = human.kind, error = %self.0, "Request failed"),
            ErrorClass::Timeout => tracing::warn!(kind = human.kind, error = %self.0, "Request timed out"),
            ErrorClass::ClientInput | ErrorClass::NotFound => {
                tracing::debug!(kind = human.kind, error = %self.0, "Request rejected")
            }
        }

        let body = ErrorBody {
            error: human.kind,
            message: format!("{} {}", human.message, human.suggestion),
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wandelwerk_core::ArtifactId;

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (WandelwerkError::InvalidRequest("x".into()), 400),
            (WandelwerkError::UnsupportedEncoding("x".into()), 415),
            (WandelwerkError::UnsupportedSourceFormat("x".into()), 415),
            (WandelwerkError::DecodeError("x".into()), 422),
            (WandelwerkError::MalformedDocument("x".into()), 422),
            (WandelwerkError::InvalidImage("x".into()), 422),
            (WandelwerkError::NotFound(ArtifactId::new()), 404),
            (
                WandelwerkError::ConversionTimeout {
                    operation: "image conversion",
                    limit: Duration::from_secs(1),
                },
                504,
            ),
            (WandelwerkError::ConversionFailed("x".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err).as_u16(), status, "{err}");
        }
    }
}
