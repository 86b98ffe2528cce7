use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API-level failures, mapped to stable status codes and JSON bodies.
///
/// Internal detail (database errors in particular) is logged server-side;
/// clients only ever see the generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required input field is absent or empty.
    #[error("{0}")]
    MissingFields(&'static str),

    /// A payload failed structural validation.
    #[error("validation failed")]
    Invalid(Vec<FieldError>),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{message}")]
    Database {
        message: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{0}")]
    Internal(&'static str),
}

/// One entry of a validation failure report.
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl ApiError {
    /// Wrap a database error with the generic message shown to the client.
    pub fn database(message: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
        move |source| ApiError::Database { message, source }
    }

    /// Collect a garde report into field-level details.
    pub fn from_report(report: &garde::Report) -> ApiError {
        ApiError::Invalid(
            report
                .iter()
                .map(|(path, error)| FieldError {
                    field: path.to_string(),
                    message: error.to_string(),
                })
                .collect(),
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database { message, source } = &self {
            tracing::error!(error = %source, "{message}");
        }

        let status = self.status_code();
        let body = match &self {
            ApiError::Invalid(details) => ErrorBody {
                error: "Validation failed",
                details: Some(details.as_slice()),
            },
            ApiError::MissingFields(message)
            | ApiError::NotFound(message)
            | ApiError::Internal(message)
            | ApiError::Database { message, .. } => ErrorBody {
                error: message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
