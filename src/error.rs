use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::fhir::FhirError;
use crate::store::StoreError;

/// Every error leaves the API as `{"detail": "..."}` with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to fetch FHIR data: {body}")]
    Upstream { status: u16, body: String },
    #[error("FHIR server unreachable: {0}")]
    UpstreamUnreachable(String),
    #[error("FHIR server returned a body that is not JSON: {0}")]
    UpstreamNotJson(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // an upstream code outside 100..=999 cannot be relayed
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::UpstreamUnreachable(_) | ApiError::UpstreamNotJson(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<FhirError> for ApiError {
    fn from(e: FhirError) -> Self {
        match e {
            FhirError::InvalidPatientId(_) => ApiError::BadRequest(e.to_string()),
            FhirError::Transport(message) => {
                error!("FHIR request failed: {}", message);
                ApiError::UpstreamUnreachable(message)
            }
            FhirError::BaseUrl(_) => {
                error!("{}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::PatientNotFound(_) => ApiError::NotFound(e.to_string()),
            StoreError::Database(err) => {
                error!("Database error: {}", err);
                ApiError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_kept() {
        let err = ApiError::Upstream { status: 404, body: "gone".to_string() };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Failed to fetch FHIR data: gone");

        let err = ApiError::Upstream { status: 42, body: String::new() };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn fhir_errors_map_by_variant() {
        let err: ApiError = FhirError::Transport("connection refused".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "FHIR server unreachable: connection refused");

        let err: ApiError = FhirError::InvalidPatientId("..".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid patient id '..'");

        let err: ApiError = FhirError::BaseUrl("nope".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn database_errors_do_not_leak() {
        let err: ApiError = StoreError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");

        let err: ApiError = StoreError::PatientNotFound(7).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Patient 7 not found");
    }
}
