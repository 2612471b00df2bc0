//! Configuration management and validation.
//!
//! Provides the inspector configuration: segment codes that drive record
//! splitting, the first message identifier, the PID fields masked when
//! producing redacted output, and listing defaults. Values come from a TOML
//! file located via the command line, the environment, or the user config
//! directory, in that order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{
    APP_NAME, CONFIG_FILE_NAME, DEFAULT_FIRST_MESSAGE_ID, DEFAULT_MASKED_PATIENT_FIELDS,
    DEFAULT_PAGE_SIZE, DEFAULT_PRESENCE_FIELDS, ENV_CONFIG_PATH, FIELD_DELIMITER,
    HEADER_SEGMENT, PATIENT_SEGMENT,
};
use crate::error::{Hl7Error, Result};

/// Global configuration for feed inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Segment type that opens a message record
    pub sentinel: String,

    /// Segment type carrying patient identification
    pub patient_segment: String,

    /// Identifier assigned to the first parsed message
    pub first_message_id: u64,

    /// Patient segment field numbers masked by `redact`
    pub masked_patient_fields: Vec<usize>,

    /// Field labels checked by the presence report
    pub presence_fields: Vec<String>,

    /// Rows per page for message listings
    pub page_size: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            sentinel: HEADER_SEGMENT.to_string(),
            patient_segment: PATIENT_SEGMENT.to_string(),
            first_message_id: DEFAULT_FIRST_MESSAGE_ID,
            masked_patient_fields: DEFAULT_MASKED_PATIENT_FIELDS.to_vec(),
            presence_fields: DEFAULT_PRESENCE_FIELDS
                .iter()
                .map(|label| label.to_string())
                .collect(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl InspectorConfig {
    /// Use a different header segment code
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Use a different patient segment code
    pub fn with_patient_segment(mut self, patient_segment: impl Into<String>) -> Self {
        self.patient_segment = patient_segment.into();
        self
    }

    /// Start message numbering at `first_message_id`
    pub fn with_first_message_id(mut self, first_message_id: u64) -> Self {
        self.first_message_id = first_message_id;
        self
    }

    /// Set the masked patient fields
    pub fn with_masked_patient_fields(mut self, fields: Vec<usize>) -> Self {
        self.masked_patient_fields = fields;
        self
    }

    /// Set the page size for listings
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Check segment codes and sizes for usable values
    pub fn validate(&self) -> Result<()> {
        check_segment_code("sentinel", &self.sentinel)?;
        check_segment_code("patient_segment", &self.patient_segment)?;

        if self.sentinel == self.patient_segment {
            return Err(Hl7Error::configuration(format!(
                "sentinel and patient_segment must differ (both '{}')",
                self.sentinel
            )));
        }

        if self.page_size == 0 {
            return Err(Hl7Error::configuration("page_size must be at least 1"));
        }

        if self.masked_patient_fields.contains(&0) {
            return Err(Hl7Error::configuration(
                "masked_patient_fields are 1-based; 0 is not a field",
            ));
        }

        Ok(())
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Hl7Error::configuration(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file path
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Hl7Error::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Hl7Error::io(format!("Failed to read config {}", path.display()), e)
        })?;

        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve configuration from the command line, the environment, or the
    /// user config directory, falling back to defaults.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
        Self::resolve_from(cli_path, env_path.as_deref(), default_config_path().as_deref())
    }

    /// Resolution with every source passed explicitly.
    ///
    /// Explicit paths (command line or environment) must exist. The default
    /// location is optional.
    pub fn resolve_from(
        cli_path: Option<&Path>,
        env_path: Option<&Path>,
        default_path: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = cli_path.or(env_path) {
            return Self::load(path);
        }

        match default_path {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// `<config dir>/hl7-inspector/config.toml`, when a config dir exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
}

fn check_segment_code(name: &str, code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(Hl7Error::configuration(format!("{} must not be empty", name)));
    }
    if code.contains(FIELD_DELIMITER) {
        return Err(Hl7Error::configuration(format!(
            "{} '{}' must not contain the field delimiter '{}'",
            name, code, FIELD_DELIMITER
        )));
    }
    Ok(())
}
