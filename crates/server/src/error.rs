use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quotebook_core::errors::{ApplicationError, InterfaceError};
use quotebook_db::RepositoryError;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Handler error. Each handler picks the status explicitly through the
/// constructors so the per-route status table stays visible at the call site.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

impl ApiError {
    pub fn bad_request(error: impl Into<ApplicationError>) -> Self {
        Self(InterfaceError::BadRequest {
            message: error.into().to_string(),
            correlation_id: correlation_id(),
        })
    }

    pub fn not_found(error: impl Into<ApplicationError>) -> Self {
        Self(InterfaceError::NotFound {
            message: error.into().to_string(),
            correlation_id: correlation_id(),
        })
    }

    pub fn store(operation: &'static str, source: RepositoryError) -> Self {
        let interface = ApplicationError::from(source).into_interface(correlation_id());
        error!(
            event_name = "api.quote.store_failed",
            operation,
            correlation_id = %interface.correlation_id(),
            error = %interface.message(),
            "quote store call failed"
        );
        Self(interface)
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = if self.0.is_client_error() {
            self.0.message().to_string()
        } else {
            self.0.user_message().to_string()
        };
        let body = ErrorBody { error, correlation_id: self.0.correlation_id().to_string() };
        (self.status(), Json(body)).into_response()
    }
}

fn correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}
