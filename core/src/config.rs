//! Configuration for the geoid tools
//!
//! A [GeoidConfig] names where the coefficient table comes from, how logging is set up and
//! how batch queries are run. It can be stored as JSON, YAML or TOML; the format is picked
//! from the file extension. Every section has a default so partial files are accepted.
//!
//! ```toml
//! [coefficients]
//! format = "nga"
//! harmonics = "data/EGM96"
//! corrections = "data/CORRCOEF"
//!
//! [logging]
//! level = "debug"
//!
//! [batch]
//! parallel = true
//! ```
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::coefficients::CoefficientTable;

/// Default location of the packed coefficient table
pub const DEFAULT_COEFFICIENTS: &str = "data/egm96_coefficients.csv";

/// Where to load the coefficient table from
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum CoefficientSource {
    /// Packed CSV written by [CoefficientTable::to_csv]
    Csv { path: PathBuf },
    /// NGA distribution files (`EGM96` and `CORRCOEF`)
    Nga {
        harmonics: PathBuf,
        corrections: PathBuf,
    },
}

impl Default for CoefficientSource {
    fn default() -> Self {
        CoefficientSource::Csv {
            path: PathBuf::from(DEFAULT_COEFFICIENTS),
        }
    }
}

impl CoefficientSource {
    /// Load the coefficient table
    pub fn load(&self) -> Result<CoefficientTable> {
        match self {
            CoefficientSource::Csv { path } => CoefficientTable::from_csv(path),
            CoefficientSource::Nga {
                harmonics,
                corrections,
            } => CoefficientTable::from_nga_files(harmonics, corrections),
        }
    }
}

/// Log verbosity
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logging section
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    /// Append log lines to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Batch processing section
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Evaluate queries on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

/// Top level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoidConfig {
    #[serde(default)]
    pub coefficients: CoefficientSource,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Serialization format of a configuration file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension (.json, .yaml/.yml, .toml)
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(ConfigFormat::Json),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported configuration file {}", path.display()),
            )),
        }
    }
}

impl GeoidConfig {
    /// Render the configuration as text (JSON is pretty-printed)
    pub fn to_text(&self, format: ConfigFormat) -> io::Result<String> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(io::Error::other),
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(io::Error::other),
            ConfigFormat::Toml => toml::to_string(self).map_err(io::Error::other),
        }
    }
    /// Parse a configuration; missing sections take their defaults
    pub fn from_text(text: &str, format: ConfigFormat) -> io::Result<Self> {
        match format {
            ConfigFormat::Json => serde_json::from_str(text).map_err(io::Error::other),
            ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(io::Error::other),
            ConfigFormat::Toml => toml::from_str(text).map_err(io::Error::other),
        }
    }
    /// Write the configuration in the format implied by the file extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        let text = self.to_text(ConfigFormat::from_path(path)?)?;
        fs::write(path, text)
    }
    /// Read a configuration in the format implied by the file extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        Self::from_text(&fs::read_to_string(path)?, format)
    }
}
