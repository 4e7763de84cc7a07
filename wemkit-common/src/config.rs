//! Configuration loading and resolution
//!
//! Config file resolution follows this priority order:
//! 1. Command-line `--config` argument (highest priority)
//! 2. `WEMKIT_CONFIG` environment variable
//! 3. Platform config file (`<config dir>/wemkit/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file never terminates the program. A config file that
//! exists but does not parse is reported as [`Error::Config`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WEMKIT_CONFIG";

/// Environment variable overriding the decoder command
pub const DECODER_ENV_VAR: &str = "WEMKIT_DECODER";

/// Languages the localization database ships with
pub const DEFAULT_SUPPORTED_LANGUAGES: [&str; 12] = [
    "en_US",
    "fr_FR",
    "de_DE",
    "it_IT",
    "es_ES",
    "ja_JP",
    "ru_RU",
    "pl_PL",
    "ko_KR",
    "zh_Hant_HK",
    "zh_Hans_CN",
    "pt_BR",
];

/// Complete TOML configuration
///
/// Every section is optional in the file; absent sections take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub decoder: DecoderConfig,
    pub convert: ConvertConfig,
    pub localization: LocalizationConfig,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// External decoder section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Decoder executable (name on PATH or absolute path)
    pub command: String,
    /// Maximum concurrent decoder processes per bank
    pub workers: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            command: "vgmstream-cli".to_string(),
            workers: 1,
        }
    }
}

/// Asset tree conversion section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Extension of bank-description documents (without dot)
    pub description_extension: String,
    /// Extension of raw streamed audio assets (without dot)
    pub source_extension: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            description_extension: "xml".to_string(),
            source_extension: "wem".to_string(),
        }
    }
}

/// Gameplay database localization section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    pub target_language: String,
    pub gameplay_db: PathBuf,
    pub localization_db: PathBuf,
    pub supported_languages: Vec<String>,
    /// Rows per rewrite transaction
    pub batch_size: usize,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            target_language: "zh_Hans_CN".to_string(),
            gameplay_db: PathBuf::from("./civ6_db/DebugGameplay.sqlite"),
            localization_db: PathBuf::from("./civ6_db/DebugLocalization.sqlite"),
            supported_languages: DEFAULT_SUPPORTED_LANGUAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            batch_size: 5000,
        }
    }
}

impl LocalizationConfig {
    pub fn is_supported(&self, language: &str) -> bool {
        self.supported_languages.iter().any(|l| l == language)
    }

    /// [`Error::InvalidInput`] listing the supported codes when `language` is not one of them
    pub fn check_language(&self, language: &str) -> Result<()> {
        if self.is_supported(language) {
            return Ok(());
        }
        Err(Error::InvalidInput(format!(
            "unsupported target language '{}', supported languages: {}",
            language,
            self.supported_languages.join(", ")
        )))
    }
}

impl TomlConfig {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.decoder.command.trim().is_empty() {
            return Err(Error::Config("decoder.command must not be empty".to_string()));
        }
        if self.decoder.workers == 0 {
            return Err(Error::Config("decoder.workers must be at least 1".to_string()));
        }
        if self.convert.description_extension.is_empty() || self.convert.source_extension.is_empty() {
            return Err(Error::Config("convert extensions must not be empty".to_string()));
        }
        if self.localization.batch_size == 0 {
            return Err(Error::Config("localization.batch_size must be at least 1".to_string()));
        }
        if !self.localization.is_supported(&self.localization.target_language) {
            return Err(Error::Config(format!(
                "localization.target_language '{}' is not in supported_languages",
                self.localization.target_language
            )));
        }
        Ok(())
    }

    /// Apply environment variable overrides on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(command) = std::env::var(DECODER_ENV_VAR) {
            if !command.trim().is_empty() {
                debug!(command = %command, "Decoder command overridden from environment");
                self.decoder.command = command;
            }
        }
    }
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Resolves which config file to use and loads it
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<&Path>) -> Self {
        Self {
            cli_path: cli_path.map(Path::to_path_buf),
        }
    }

    /// Config file that would be read, if any
    pub fn config_path(&self) -> Result<Option<PathBuf>> {
        // Priority 1: Command-line argument (must exist)
        if let Some(path) = &self.cli_path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path.clone()));
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
            warn!(
                "{} points to missing file {}, ignoring",
                CONFIG_ENV_VAR,
                path.display()
            );
        }

        // Priority 3: Platform config file
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Load the resolved configuration, env overrides applied and validated
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match self.config_path()? {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                load_toml_config(&path)?
            }
            None => {
                debug!("No config file found, using compiled defaults");
                TomlConfig::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Platform config file location (`~/.config/wemkit/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wemkit").join("config.toml"))
}
