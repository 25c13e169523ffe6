use crate::credentials::CredentialError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crm::client::CrmError;
use serde::Serialize;

/// Failures terminal for one find-or-create request. Search failures never
/// reach this type; the CRM client folds them into a miss.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    #[error("invalid_request")]
    InvalidRequest,
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Crm(#[from] CrmError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            // Credential problems are client-attributable configuration
            // errors, matching how callers already consume this endpoint.
            BridgeError::InvalidRequest | BridgeError::Credential(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: self.to_string(),
                    details: None,
                },
            ),
            // Upstream create failures surface the raw response text.
            BridgeError::Crm(CrmError::CreateFailed { body, .. }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: body.clone(),
                    details: None,
                },
            ),
            BridgeError::Crm(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "server_error".to_string(),
                    details: Some(e.to_string()),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
