use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Codec options passed explicitly into the scan and decode entry points.
///
/// `strict = false` is the "force" mode: truncated or non-conformant
/// metadata yields a partial (possibly empty) model instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Fail on truncated or malformed metadata instead of recovering.
    pub strict: bool,
    /// Log hex dumps of the raw resource and dataset streams at `trace` level.
    pub trace_hex: bool,
    /// Encoding of documents that carry no 1:90 declaration, as a WHATWG
    /// label such as `"iso-8859-2"`. `None` reads them as ISO-8859-1.
    pub input_charset: Option<&'static Encoding>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            strict: true,
            trace_hex: false,
            input_charset: None,
        }
    }
}

impl Options {
    /// Options for the lenient ("force") read mode.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Strict options when `force` is false, lenient otherwise.
    pub fn from_force(force: bool) -> Self {
        if force { Self::lenient() } else { Self::default() }
    }
}

/// Top-level configuration for the CLI and batch pipeline.
///
/// # Loading
///
/// ```rust,no_run
/// use iptc_info::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.options.strict = false;
/// config.output.backup_originals = false;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan/decode behavior.
    pub options: Options,
    /// Output behavior (dry run, backups, logging).
    pub output: OutputConfig,
}

/// Output and behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, report what would change without modifying any files.
    pub dry_run: bool,
    /// If `true`, create a `.bak` backup before modifying an image.
    pub backup_originals: bool,
    /// Optional path to a log file. When set, log output is appended there
    /// instead of going to stderr.
    pub log_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup_originals: true,
            log_file: None,
        }
    }
}

impl Config {
    /// Resolve the config file path: the directory of the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}
