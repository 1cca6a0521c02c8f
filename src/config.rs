//! Configuration for the coercion engine.
//!
//! [`CoercionConfig`] controls the default candidate chain, the encoding used
//! to scan undecodable input in lossy mode, and a couple of switches. It can be
//! built in code or loaded from YAML.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: 1
//! default_chain: ["UTF-8", "windows-1252"]
//! lossy_fallback: "windows-1252"
//! detect_bom: true
//! escape_control_chars: false
//! ```
//!
//! Every field is optional; missing fields take their defaults.
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::EncodingId;

/// Current configuration format version.
pub const CONFIG_VERSION: u32 = 1;

/// Errors raised while building or loading a [`CoercionConfig`].
///
/// These are configuration-time issues, meant to surface at start-up rather
/// than while coercing text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown encoding label: {0:?}")]
    UnknownEncoding(String),

    #[error("default_chain must name at least one encoding")]
    EmptyCandidateChain,

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(u32),

    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Runtime configuration for strict and lossy coercion.
///
/// # Examples
///
/// ```rust
/// use utf8_coerce::{CoercionConfig, EncodingId};
///
/// let config = CoercionConfig::default();
/// assert_eq!(config.default_chain, vec![EncodingId::UTF_8, EncodingId::WINDOWS_1252]);
/// assert_eq!(config.lossy_fallback, EncodingId::WINDOWS_1252);
/// assert!(config.detect_bom);
/// assert!(!config.escape_control_chars);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoercionConfig {
    /// Configuration format version.
    ///
    /// Default: `1`
    pub version: u32,

    /// Encodings tried, in order, after the caller's preferred encoding.
    ///
    /// Default: `[UTF-8, windows-1252]`
    pub default_chain: Vec<EncodingId>,

    /// Encoding used to scan input that no candidate decodes as a whole
    /// when lossy coercion was given no preferred encoding.
    ///
    /// Default: `windows-1252`
    pub lossy_fallback: EncodingId,

    /// Treat a leading UTF-8/UTF-16 byte-order mark as authoritative.
    ///
    /// When disabled, BOM bytes go through the candidate chain like any other
    /// input.
    ///
    /// Default: `true`
    pub detect_bom: bool,

    /// Escape C0 control characters (except TAB, LF and CR) and DEL in lossy
    /// output, using the same `0xHH` token as unmappable bytes.
    ///
    /// Strict coercion is lossless and ignores this flag.
    ///
    /// Default: `false`
    pub escape_control_chars: bool,
}

impl Default for CoercionConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            default_chain: vec![EncodingId::UTF_8, EncodingId::WINDOWS_1252],
            lossy_fallback: EncodingId::WINDOWS_1252,
            detect_bom: true,
            escape_control_chars: false,
        }
    }
}

impl CoercionConfig {
    /// Loads and validates a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parses and validates a YAML configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: CoercionConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks internal consistency. Cheap; call it once at start-up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if self.default_chain.is_empty() {
            return Err(ConfigError::EmptyCandidateChain);
        }
        Ok(())
    }
}

/// Process-wide defaults used by the operations that take no config.
pub(crate) fn default_config() -> &'static CoercionConfig {
    static DEFAULT: OnceLock<CoercionConfig> = OnceLock::new();
    DEFAULT.get_or_init(CoercionConfig::default)
}
