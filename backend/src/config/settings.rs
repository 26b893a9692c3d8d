//! Data backend settings loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_SCHEMA: &str = "public";

/// Errors raised while interpreting [`DataApiSettings`].
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// A value the adapter cannot run without was not supplied.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// The endpoint is not an absolute URL.
    #[error("invalid data API url '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Connection settings for the hosted database's REST interface.
///
/// Values come from `--url`/`--key` style flags, `DATA_API_*` environment
/// variables or a config file, in that order of precedence.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DATA_API")]
pub struct DataApiSettings {
    /// Project URL, for example `https://abc.supabase.co`.
    pub url: Option<String>,
    /// API key sent as `apikey` and bearer token.
    pub key: Option<String>,
    /// Request timeout in seconds.
    #[ortho_config(default = 30)]
    pub timeout_secs: u64,
    /// Database schema exposed through the REST interface.
    pub schema: Option<String>,
}

impl DataApiSettings {
    /// Parsed project URL.
    ///
    /// # Errors
    ///
    /// Fails when the URL is absent or malformed.
    pub fn endpoint(&self) -> Result<Url, SettingsError> {
        let raw = self
            .url
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or(SettingsError::Missing { name: "url" })?;
        Url::parse(raw.trim()).map_err(|source| SettingsError::InvalidUrl {
            value: raw.to_owned(),
            source,
        })
    }

    /// API key.
    ///
    /// # Errors
    ///
    /// Fails when the key is absent or blank.
    pub fn api_key(&self) -> Result<&str, SettingsError> {
        self.key
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SettingsError::Missing { name: "key" })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }
}
