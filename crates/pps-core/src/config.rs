//! Import configuration.
//!
//! All fields have defaults, so an empty JSON object (`{}`) is a valid config.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::EntityKind;

/// Default upload size limit applied by callers before import (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },
}

/// What to do with a row whose key is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Leave the stored record untouched and count the row as skipped.
    #[default]
    SkipIfExists,
    /// Overwrite the stored record with the row.
    Upsert,
}

impl ImportPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportPolicy::SkipIfExists => "skip_if_exists",
            ImportPolicy::Upsert => "upsert",
        }
    }
}

impl fmt::Display for ImportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "skip_if_exists" | "skip" => Ok(ImportPolicy::SkipIfExists),
            "upsert" => Ok(ImportPolicy::Upsert),
            _ => Err(ConfigError::InvalidValue {
                field: "policy",
                value: s.to_string(),
            }),
        }
    }
}

/// How CSV columns are matched to record fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderBinding {
    /// Always use the fixed column positions.
    Positional,
    /// Bind by header name when every expected header is present, else positional.
    #[default]
    Auto,
    /// Require every expected header; fail the import otherwise.
    Strict,
}

impl FromStr for HeaderBinding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" => Ok(HeaderBinding::Positional),
            "auto" => Ok(HeaderBinding::Auto),
            "strict" => Ok(HeaderBinding::Strict),
            _ => Err(ConfigError::InvalidValue {
                field: "header_binding",
                value: s.to_string(),
            }),
        }
    }
}

/// Whether each child entity's key identifies at most one stored row.
///
/// Every key is unique unless a deployment opts out. Patients are always
/// unique: they are the target of every parent lookup. A non-unique entity
/// still skips stored keys under [`ImportPolicy::SkipIfExists`]; under
/// [`ImportPolicy::Upsert`] its rows are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyUniqueness {
    pub antibiotics: bool,
    pub antibiotic_details: bool,
    pub indications: bool,
    pub optional_vars: bool,
    pub specimens: bool,
}

impl Default for KeyUniqueness {
    fn default() -> Self {
        Self {
            antibiotics: true,
            antibiotic_details: true,
            indications: true,
            optional_vars: true,
            specimens: true,
        }
    }
}

impl KeyUniqueness {
    pub fn is_unique(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Patient => true,
            EntityKind::Antibiotic => self.antibiotics,
            EntityKind::AntibioticDetails => self.antibiotic_details,
            EntityKind::Indication => self.indications,
            EntityKind::OptionalVar => self.optional_vars,
            EntityKind::Specimen => self.specimens,
        }
    }
}

/// Import configuration for one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub policy: ImportPolicy,
    pub header_binding: HeaderBinding,
    pub key_uniqueness: KeyUniqueness,
    /// Write a ledger entry for every completed import
    pub record_runs: bool,
    /// Upload size limit enforced by the caller before handing over the payload
    pub max_upload_bytes: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            policy: ImportPolicy::default(),
            header_binding: HeaderBinding::default(),
            key_uniqueness: KeyUniqueness::default(),
            record_runs: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ImportConfig {
    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn with_policy(mut self, policy: ImportPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_header_binding(mut self, binding: HeaderBinding) -> Self {
        self.header_binding = binding;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = ImportConfig::from_json("{}").unwrap();
        assert_eq!(config, ImportConfig::default());
        assert_eq!(config.policy, ImportPolicy::SkipIfExists);
        assert_eq!(config.header_binding, HeaderBinding::Auto);
        assert!(config.record_runs);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_partial_override() {
        let config = ImportConfig::from_json(
            r#"{"policy": "upsert", "key_uniqueness": {"optional_vars": false}}"#,
        )
        .unwrap();
        assert_eq!(config.policy, ImportPolicy::Upsert);
        assert!(!config.key_uniqueness.optional_vars);
        assert!(config.key_uniqueness.antibiotics);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(ImportConfig::from_json(r#"{"policy": "merge"}"#).is_err());
        assert!("merge".parse::<ImportPolicy>().is_err());
        assert_eq!(
            "skip-if-exists".parse::<ImportPolicy>().unwrap(),
            ImportPolicy::SkipIfExists
        );
        assert_eq!("STRICT".parse::<HeaderBinding>().unwrap(), HeaderBinding::Strict);
    }

    #[test]
    fn test_default_uniqueness() {
        let keys = KeyUniqueness::default();
        assert!(keys.is_unique(EntityKind::Patient));
        assert!(keys.is_unique(EntityKind::Antibiotic));
        assert!(keys.is_unique(EntityKind::OptionalVar));

        let appending: KeyUniqueness =
            serde_json::from_str(r#"{"optional_vars": false}"#).unwrap();
        assert!(!appending.is_unique(EntityKind::OptionalVar));
        assert!(appending.is_unique(EntityKind::Specimen));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ImportConfig::load("/nonexistent/pps.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
