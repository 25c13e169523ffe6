pub mod client;
pub mod types;

pub use client::{CrmClient, CrmError};
pub use types::{ContactQuery, ContactRecord, CreateOutcome, Credentials};
