use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[derive(Deserialize, Debug)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// The tenant record store holding per-tenant CRM credentials.
#[derive(Deserialize, Debug)]
pub struct CredentialStoreConfig {
    pub base_url: Url,
    pub api_key: String,
}

#[derive(Deserialize, Debug)]
pub struct CrmConfig {
    pub base_url: Url,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    pub credential_store: CredentialStoreConfig,
    pub crm: CrmConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}
