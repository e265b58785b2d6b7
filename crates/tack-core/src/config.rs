//! Session configuration.
//!
//! The host hands over a flat set of named options ([`Settings`]) once at
//! setup time. They are resolved into an immutable [`Config`] that the upload
//! engine owns for its lifetime.

use serde::Deserialize;

use crate::error::ConfigError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const DEFAULT_MAX_FILE_SIZE_MB: f64 = 20.0;

/// Language used for placeholder, failure and alert text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

/// Raw options as supplied by the host. Everything is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    #[serde(deserialize_with = "deserialize_megabytes")]
    pub max_file_size_mb: Option<f64>,
    pub endpoint: Option<String>,
    pub assets_prefix: Option<String>,
    pub auth_code: Option<String>,
    pub server_compress: Option<bool>,
    pub upload_channel: Option<String>,
    pub upload_name_type: Option<String>,
    pub auto_retry: Option<bool>,
    pub return_format: Option<String>,
    pub upload_folder: Option<String>,
    pub api_token: Option<String>,
    pub locale: Locale,
}

/// Accepts a number or a numeric string. Text that isn't a number becomes NaN
/// and falls back to the default limit.
fn deserialize_megabytes<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Megabytes {
        Number(f64),
        Text(String),
    }

    let value: Option<Megabytes> = Deserialize::deserialize(deserializer)?;
    Ok(value.map(|mb| match mb {
        Megabytes::Number(mb) => mb,
        Megabytes::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
    }))
}

impl Settings {
    /// Parse settings from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Query parameters sent with every upload request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadParams {
    pub auth_code: Option<String>,
    pub server_compress: Option<bool>,
    pub upload_channel: Option<String>,
    pub upload_name_type: Option<String>,
    pub auto_retry: Option<bool>,
    pub return_format: Option<String>,
    pub upload_folder: Option<String>,
}

impl UploadParams {
    /// Wire name/value pairs, skipping absent and empty values.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let text = |name, value: &Option<String>| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (name, v.to_owned()))
        };
        let flag = |name, value: Option<bool>| value.map(|v| (name, v.to_string()));

        [
            text("authCode", &self.auth_code),
            flag("serverCompress", self.server_compress),
            text("uploadChannel", &self.upload_channel),
            text("uploadNameType", &self.upload_name_type),
            flag("autoRetry", self.auto_retry),
            text("returnFormat", &self.return_format),
            text("uploadFolder", &self.upload_folder),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Resolved, immutable configuration for one composition session.
#[derive(Clone, Debug)]
pub struct Config {
    pub debug: bool,
    /// Maximum accepted file size in bytes.
    pub max_file_size: u64,
    pub endpoint: String,
    /// Prepended to relative `src` values returned by the endpoint.
    pub assets_prefix: String,
    pub params: UploadParams,
    pub api_token: Option<String>,
    pub locale: Locale,
}

impl Config {
    /// Create a config with defaults for everything but the endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            debug: false,
            max_file_size: mb_to_bytes(DEFAULT_MAX_FILE_SIZE_MB),
            endpoint: endpoint.into(),
            assets_prefix: String::new(),
            params: UploadParams::default(),
            api_token: None,
            locale: Locale::default(),
        }
    }

    /// Resolve host settings. The endpoint is the only required option.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let endpoint = settings
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;

        // Zero and non-numbers fall back to the default; anything else is
        // clamped to at least one megabyte.
        let max_mb = settings
            .max_file_size_mb
            .filter(|mb| mb.is_finite() && *mb != 0.0)
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB)
            .max(1.0);

        Ok(Self {
            debug: settings.debug,
            max_file_size: mb_to_bytes(max_mb),
            endpoint,
            assets_prefix: settings.assets_prefix.unwrap_or_default(),
            params: UploadParams {
                auth_code: settings.auth_code,
                server_compress: settings.server_compress,
                upload_channel: settings.upload_channel,
                upload_name_type: settings.upload_name_type,
                auto_retry: settings.auto_retry,
                return_format: settings.return_format,
                upload_folder: settings.upload_folder,
            },
            api_token: settings.api_token.filter(|t| !t.is_empty()),
            locale: settings.locale,
        })
    }

    /// Parse and resolve settings from JSON in one step.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_settings(Settings::from_json(json)?)
    }

    /// Size limit in whole megabytes, for messages.
    pub fn max_file_size_mb(&self) -> f64 {
        self.max_file_size as f64 / BYTES_PER_MB
    }

    /// Value for the `Authorization` header, if a token is configured.
    pub fn authorization(&self) -> Option<String> {
        self.api_token.as_deref().map(|token| {
            if token.starts_with("Bearer ") {
                token.to_owned()
            } else {
                format!("Bearer {token}")
            }
        })
    }
}

fn mb_to_bytes(mb: f64) -> u64 {
    (mb * BYTES_PER_MB) as u64
}
