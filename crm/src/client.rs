use crate::types::{ContactQuery, ContactRecord, CreateOutcome, Credentials};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum CrmError {
    #[error("invalid CRM URL: {0}")]
    InvalidUrl(String),
    #[error("CRM request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("contact creation failed ({status}): {body}")]
    CreateFailed { status: StatusCode, body: String },
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    contacts: Vec<ContactRecord>,
}

#[derive(Deserialize, Default)]
struct CreateResponse {
    contact: Option<ContactRecord>,
}

#[derive(Deserialize)]
struct DuplicateMeta {
    #[serde(rename = "contactId")]
    contact_id: String,
}

#[derive(Deserialize)]
struct DuplicateResponse {
    meta: DuplicateMeta,
}

/// Client for the CRM's contact API.
///
/// Targets the API generation that scopes requests with a `LocationId`
/// header; the create body carries `locationId` as well. The two scoping
/// styles must not be mixed against a live account.
#[derive(Clone)]
pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
}

impl CrmClient {
    pub fn new(base_url: &str) -> Self {
        CrmClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn contacts_url(&self) -> Result<Url, CrmError> {
        Url::parse(&format!("{}/contacts/", self.base_url))
            .map_err(|e| CrmError::InvalidUrl(e.to_string()))
    }

    /// Search for an existing contact by the query's match key.
    ///
    /// Any search failure, transport or non-success status, degrades to a
    /// miss: some CRM API keys lack search scope but retain create scope,
    /// so a 403 here must not block the create fallback.
    pub async fn find_contact(
        &self,
        credentials: &Credentials,
        query: &ContactQuery,
    ) -> Result<Option<ContactRecord>, CrmError> {
        let mut url = self.contacts_url()?;
        if let Some((key, value)) = query.match_key() {
            url.query_pairs_mut().append_pair(key, value);
        }

        let response = match self
            .client
            .get(url)
            .bearer_auth(&credentials.api_token)
            .header("LocationId", &credentials.location_id)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "contact search failed, falling back to create");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "contact search returned non-success, falling back to create"
            );
            return Ok(None);
        }

        let body = match response.json::<SearchResponse>().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "could not decode contact search response");
                return Ok(None);
            }
        };

        // First result is authoritative; later matches are ignored.
        Ok(body.contacts.into_iter().next())
    }

    /// Create a contact, reclassifying the CRM's duplicate-conflict response
    /// (HTTP 400 with a `meta.contactId` body) as success-by-duplicate.
    pub async fn create_contact(
        &self,
        credentials: &Credentials,
        query: &ContactQuery,
    ) -> Result<CreateOutcome, CrmError> {
        let body = serde_json::json!({
            "locationId": credentials.location_id,
            "phone": query.phone,
            "email": query.email,
            "name": query.name,
        });

        let response = self
            .client
            .post(self.contacts_url()?)
            .bearer_auth(&credentials.api_token)
            .header("LocationId", &credentials.location_id)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            // Status is authoritative; an unparseable body folds to an
            // empty record instead of failing the request.
            let parsed = serde_json::from_str::<CreateResponse>(&text).unwrap_or_default();
            return Ok(CreateOutcome::Created {
                contact: parsed.contact.unwrap_or_default(),
            });
        }

        if status == StatusCode::BAD_REQUEST {
            if let Ok(conflict) = serde_json::from_str::<DuplicateResponse>(&text) {
                return Ok(CreateOutcome::Duplicate {
                    contact_id: conflict.meta.contact_id,
                });
            }
        }

        Err(CrmError::CreateFailed { status, body: text })
    }
}
