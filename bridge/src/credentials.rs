use async_trait::async_trait;
use crm::types::Credentials;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum CredentialError {
    #[error("no credentials found for tenant {0}")]
    NotFound(String),
    #[error("multiple credential records match tenant {0}")]
    MultipleMatches(String),
    #[error("tenant {0} is missing an API token or location id")]
    Misconfigured(String),
    #[error("credential lookup failed: {0}")]
    Lookup(String),
}

/// Read-only source of per-tenant CRM credentials. One shared handle is
/// constructed at startup and injected into the request handlers; it must be
/// safe for concurrent use. There is no caching: every request re-resolves,
/// which is acceptable at this tool's QPS and keeps the store authoritative.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn resolve(&self, tenant_id: &str) -> Result<Credentials, CredentialError>;
}

#[derive(Deserialize)]
struct TenantRecord {
    #[serde(default)]
    api_token: String,
    #[serde(default)]
    location_id: String,
}

#[derive(Deserialize)]
struct TenantRecords {
    #[serde(default)]
    records: Vec<TenantRecord>,
}

/// Credential store backed by the central tenant record store. A lookup is
/// one filtered read returning a `records` array; exactly one record must
/// match the tenant id.
pub struct HttpCredentialStore {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpCredentialStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        HttpCredentialStore {
            client: reqwest::Client::new(),
            url: format!("{}/tenants", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl CredentialStore for HttpCredentialStore {
    async fn resolve(&self, tenant_id: &str) -> Result<Credentials, CredentialError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("tenant_id", tenant_id)])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| CredentialError::Lookup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CredentialError::Lookup(format!(
                "record store returned {}",
                response.status()
            )));
        }

        let mut records = response
            .json::<TenantRecords>()
            .await
            .map_err(|e| CredentialError::Lookup(e.to_string()))?
            .records;

        match records.len() {
            0 => return Err(CredentialError::NotFound(tenant_id.to_string())),
            1 => {}
            _ => return Err(CredentialError::MultipleMatches(tenant_id.to_string())),
        }

        let record = records.remove(0);
        if record.api_token.is_empty() || record.location_id.is_empty() {
            return Err(CredentialError::Misconfigured(tenant_id.to_string()));
        }

        Ok(Credentials {
            api_token: record.api_token,
            location_id: record.location_id,
        })
    }
}

/// In-process credential store for tests and local development.
#[derive(Default)]
pub struct MemoryCredentialStore {
    tenants: HashMap<String, Credentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I>(&mut self, tenant_id: I, credentials: Credentials)
    where
        I: Into<String>,
    {
        self.tenants.insert(tenant_id.into(), credentials);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn resolve(&self, tenant_id: &str) -> Result<Credentials, CredentialError> {
        self.tenants
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| CredentialError::NotFound(tenant_id.to_string()))
    }
}
