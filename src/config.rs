//! Credential and bucket configuration.
//!
//! A single JSON record at a tool-owned path, written wholesale by
//! `setup-config` and loaded once per invocation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{Result, SyncError};

static ACCESS_KEY_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{20}$").expect("valid regex"));
static SECRET_ACCESS_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9/+]{40}$").expect("valid regex"));
static REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}-[a-z]+-\d$").expect("valid regex"));
static ENDPOINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("valid regex"));

/// Bucket identity and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket: String,
    /// Custom endpoint for S3-compatible providers. `None` means AWS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Config {
    /// Trim every field and check it against the format rules.
    pub fn new(
        access_key_id: &str,
        secret_access_key: &str,
        region: &str,
        bucket: &str,
    ) -> Result<Self> {
        let config = Self {
            access_key_id: validate_access_key_id(access_key_id)?,
            secret_access_key: validate_secret_access_key(secret_access_key)?,
            region: validate_region(region)?,
            bucket: validate_bucket(bucket)?,
            endpoint: None,
        };
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_access_key_id(&self.access_key_id)?;
        validate_secret_access_key(&self.secret_access_key)?;
        validate_region(&self.region)?;
        validate_bucket(&self.bucket)?;
        if let Some(ref endpoint) = self.endpoint {
            validate_endpoint(endpoint)?;
        }
        Ok(())
    }
}

pub fn validate_access_key_id(value: &str) -> Result<String> {
    check(value, &ACCESS_KEY_ID_RE, "access key id", "Please provide valid AWS Access Key Id!")
}

pub fn validate_secret_access_key(value: &str) -> Result<String> {
    check(
        value,
        &SECRET_ACCESS_KEY_RE,
        "secret access key",
        "Please provide valid AWS Secret Access Key!",
    )
}

pub fn validate_region(value: &str) -> Result<String> {
    check(value, &REGION_RE, "region", "Please provide valid AWS region")
}

pub fn validate_bucket(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SyncError::Validation {
            field: "bucket".to_string(),
            message: "Please provide AWS bucket".to_string(),
        });
    }
    Ok(value.to_string())
}

pub fn validate_endpoint(value: &str) -> Result<String> {
    check(value, &ENDPOINT_RE, "endpoint", "Please provide a valid http(s) endpoint URL")
}

fn check(value: &str, re: &Regex, field: &str, message: &str) -> Result<String> {
    let value = value.trim();
    if re.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(SyncError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        })
    }
}

/// Default config location: `<config dir>/save-sync/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("save-sync")
        .join("config.json")
}

/// Reads and writes the config record at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored record as text, or `None` when not configured.
    pub fn read_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::from_io_error(e, "reading config", Some(self.path.clone()))),
        }
    }

    pub fn load(&self) -> Result<Config> {
        let text = self.read_raw()?.ok_or_else(|| SyncError::ConfigMissing {
            path: self.path.clone(),
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|e| SyncError::ConfigParse {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %self.path.display(), bucket = %config.bucket, "loaded config");
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SyncError::from_io_error(e, "creating config directory", Some(parent.to_path_buf()))
            })?;
        }
        let text = serde_json::to_string_pretty(config).map_err(|e| SyncError::ConfigParse {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&self.path, text)
            .map_err(|e| SyncError::from_io_error(e, "writing config", Some(self.path.clone())))?;
        tracing::info!(path = %self.path.display(), "config saved");
        Ok(())
    }
}
