// LogPeek - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::discovery::{CatalogConfig, ListingOrder};
use crate::core::parser::ParseConfig;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogPeek configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logpeek/ or %APPDATA%\LogPeek\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub catalog: CatalogSection,
    pub limits: LimitsSection,
    pub server: ServerSection,
    pub logging: LoggingSection,
}

/// `[catalog]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Directory holding the log files.
    pub log_dir: Option<String>,
    /// Filename glob selecting log files.
    pub file_pattern: Option<String>,
    /// "listing" or "modified".
    pub order: Option<String>,
}

/// `[limits]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    pub max_log_size_bytes: Option<u64>,
    pub max_message_chars: Option<usize>,
    pub max_records: Option<usize>,
}

/// `[server]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Socket address, e.g. "0.0.0.0:8080".
    pub bind: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub parse: ParseConfig,
    /// Size guard threshold in bytes.
    pub max_log_size: u64,
    pub bind: String,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            parse: ParseConfig::default(),
            max_log_size: constants::DEFAULT_MAX_LOG_SIZE,
            bind: constants::DEFAULT_BIND_ADDR.to_string(),
            log_level: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings; an unreadable or
/// unparseable file yields defaults and a warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let (config, parse_warnings) = parse_config(&content, config_path);
    warnings.extend(parse_warnings);
    (config, warnings)
}

/// Parse and validate config.toml text. `origin` is only used in messages.
pub fn parse_config(content: &str, origin: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let raw: RawConfig = match toml::from_str(content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: origin.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %origin.display(), "Loaded config.toml");

    let mut config = AppConfig::default();

    // -- Catalog: log_dir --
    if let Some(ref dir) = raw.catalog.log_dir {
        if dir.trim().is_empty() {
            warnings.push(format!(
                "[catalog] log_dir is empty. Using default ({}).",
                constants::DEFAULT_LOG_DIR
            ));
        } else {
            config.catalog.log_dir = PathBuf::from(dir);
        }
    }

    // -- Catalog: file_pattern --
    if let Some(ref pattern) = raw.catalog.file_pattern {
        if pattern.is_empty() || pattern.contains('/') || pattern.contains('\\') {
            warnings.push(format!(
                "[catalog] file_pattern = \"{pattern}\" must be a non-empty file name glob. \
                 Using default ({}).",
                constants::DEFAULT_FILE_PATTERN
            ));
        } else if let Err(e) = glob::Pattern::new(pattern) {
            warnings.push(format!(
                "[catalog] file_pattern = \"{pattern}\" is not a valid glob ({e}). \
                 Using default ({}).",
                constants::DEFAULT_FILE_PATTERN
            ));
        } else {
            config.catalog.file_pattern = pattern.clone();
        }
    }

    // -- Catalog: order --
    if let Some(ref order) = raw.catalog.order {
        match order.to_lowercase().as_str() {
            "listing" => config.catalog.order = ListingOrder::Listing,
            "modified" => config.catalog.order = ListingOrder::Modified,
            other => warnings.push(format!(
                "[catalog] order = \"{other}\" is not recognised. \
                 Expected \"listing\" or \"modified\". Using default (listing).",
            )),
        }
    }

    // -- Limits: max_log_size_bytes --
    if let Some(size) = raw.limits.max_log_size_bytes {
        if (constants::MIN_MAX_LOG_SIZE..=constants::ABSOLUTE_MAX_LOG_SIZE).contains(&size) {
            config.max_log_size = size;
        } else {
            warnings.push(out_of_range(
                "[limits] max_log_size_bytes",
                size,
                constants::MIN_MAX_LOG_SIZE,
                constants::ABSOLUTE_MAX_LOG_SIZE,
                constants::DEFAULT_MAX_LOG_SIZE,
            ));
        }
    }

    // -- Limits: max_message_chars --
    if let Some(chars) = raw.limits.max_message_chars {
        if (constants::MIN_MAX_MESSAGE_CHARS..=constants::ABSOLUTE_MAX_MESSAGE_CHARS)
            .contains(&chars)
        {
            config.parse.max_message_chars = chars;
        } else {
            warnings.push(out_of_range(
                "[limits] max_message_chars",
                chars,
                constants::MIN_MAX_MESSAGE_CHARS,
                constants::ABSOLUTE_MAX_MESSAGE_CHARS,
                constants::DEFAULT_MAX_MESSAGE_CHARS,
            ));
        }
    }

    // -- Limits: max_records --
    if let Some(records) = raw.limits.max_records {
        if (constants::MIN_MAX_RECORDS..=constants::ABSOLUTE_MAX_RECORDS).contains(&records) {
            config.parse.max_records = records;
        } else {
            warnings.push(out_of_range(
                "[limits] max_records",
                records,
                constants::MIN_MAX_RECORDS,
                constants::ABSOLUTE_MAX_RECORDS,
                constants::DEFAULT_MAX_RECORDS,
            ));
        }
    }

    // -- Server: bind --
    if let Some(ref bind) = raw.server.bind {
        if bind.parse::<std::net::SocketAddr>().is_ok() {
            config.bind = bind.clone();
        } else {
            warnings.push(format!(
                "[server] bind = \"{bind}\" is not a socket address. Using default ({}).",
                constants::DEFAULT_BIND_ADDR
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

fn out_of_range<T: std::fmt::Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
    default: T,
) -> String {
    let err = ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: format!("{min}-{max}"),
    };
    format!("{err}. Using default ({default}).")
}
