use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-tenant CRM credentials. Both fields are guaranteed non-empty by the
/// resolution step; no CRM call is attempted without them.
#[derive(Clone, Debug, PartialEq)]
pub struct Credentials {
    pub api_token: String,
    pub location_id: String,
}

impl Credentials {
    pub fn new<T, L>(api_token: T, location_id: L) -> Self
    where
        T: Into<String>,
        L: Into<String>,
    {
        Credentials {
            api_token: api_token.into(),
            location_id: location_id.into(),
        }
    }
}

/// One contact lookup/creation request. Phone is the preferred match key
/// when both phone and email are given; name is only used on creation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactQuery {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl ContactQuery {
    /// The primary match key as a query-parameter pair. Empty strings count
    /// as absent.
    pub fn match_key(&self) -> Option<(&'static str, &str)> {
        match (self.phone.as_deref(), self.email.as_deref()) {
            (Some(phone), _) if !phone.is_empty() => Some(("phone", phone)),
            (_, Some(email)) if !email.is_empty() => Some(("email", email)),
            _ => None,
        }
    }
}

/// A contact record as the CRM returns it. Only `id` is interpreted; every
/// other field is carried opaquely so callers can echo the raw record.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ContactRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

/// Outcome of a create call. `Duplicate` is the CRM's conflict response
/// reclassified as success: the contact already exists and only its id is
/// known, since the CRM does not return the record on that path.
#[derive(Clone, Debug, PartialEq)]
pub enum CreateOutcome {
    Created { contact: ContactRecord },
    Duplicate { contact_id: String },
}
