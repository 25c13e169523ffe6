use crate::credentials::CredentialStore;
use crate::errors::BridgeError;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use crm::client::CrmClient;
use crm::types::{ContactQuery, ContactRecord, CreateOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handles for one running service. Built once at startup, immutable
/// afterwards, cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub crm: CrmClient,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/tools/find_or_create_contact", post(find_or_create_contact))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn index() -> &'static str {
    "contact-bridge: find_or_create_contact tool server"
}

#[derive(Deserialize, Debug, Default)]
pub struct ToolRequest {
    #[serde(default)]
    client_id: String,
    phone: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

impl ToolRequest {
    /// Validation gate: a tenant id plus at least one match key, before any
    /// outbound call is made.
    fn validate(self) -> Result<(String, ContactQuery), BridgeError> {
        if self.client_id.is_empty() {
            return Err(BridgeError::InvalidRequest);
        }
        let query = ContactQuery {
            phone: self.phone,
            email: self.email,
            name: self.name,
        };
        if query.match_key().is_none() {
            return Err(BridgeError::InvalidRequest);
        }
        Ok((self.client_id, query))
    }
}

#[derive(Serialize, Debug)]
pub struct ToolResponse {
    #[serde(rename = "contactId")]
    contact_id: Option<String>,
    existed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    duplicate: Option<bool>,
    contact: Option<ContactRecord>,
}

impl ToolResponse {
    fn found(contact: ContactRecord) -> Self {
        ToolResponse {
            contact_id: contact.id.clone(),
            existed: true,
            duplicate: None,
            contact: Some(contact),
        }
    }

    fn created(contact: ContactRecord) -> Self {
        ToolResponse {
            contact_id: contact.id.clone(),
            existed: false,
            duplicate: None,
            contact: Some(contact),
        }
    }

    /// The conflict path: only the id is known, the CRM does not return the
    /// record, so `contact` stays null.
    fn duplicate(contact_id: String) -> Self {
        ToolResponse {
            contact_id: Some(contact_id),
            existed: true,
            duplicate: Some(true),
            contact: None,
        }
    }
}

impl IntoResponse for ToolResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// The whole pipeline: validate, resolve credentials, search, and create on
/// a miss. Terminal on the first failure, no retries anywhere.
async fn find_or_create_contact(
    State(state): State<AppState>,
    request: Result<Json<ToolRequest>, JsonRejection>,
) -> Result<ToolResponse, BridgeError> {
    let Json(request) = request.map_err(|_| BridgeError::InvalidRequest)?;
    let (tenant_id, query) = request.validate()?;

    let credentials = state.store.resolve(&tenant_id).await?;

    if let Some(contact) = state.crm.find_contact(&credentials, &query).await? {
        return Ok(ToolResponse::found(contact));
    }

    match state.crm.create_contact(&credentials, &query).await? {
        CreateOutcome::Created { contact } => Ok(ToolResponse::created(contact)),
        CreateOutcome::Duplicate { contact_id } => Ok(ToolResponse::duplicate(contact_id)),
    }
}
