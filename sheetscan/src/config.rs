//! Runtime configuration.
//!
//! Defaults are overridden by environment variables (a `.env` file in the
//! working directory is loaded first by the binary), then by CLI flags.
//!
//! | Variable               | Meaning                                        |
//! |------------------------|------------------------------------------------|
//! | `SHEETSCAN_DELIMITER`  | force the CSV delimiter (`,` `;` `\t` `|` ...) |
//! | `SHEETSCAN_LOG`        | minimum log level: info, success, warning, error |
//! | `SHEETSCAN_PLACEHOLDER`| `false` to return `[]` instead of `[""]` when nothing matches |

use crate::error::{ConfigError, ConfigResult};
use crate::logs::LogLevel;
use crate::lookup::ScanOptions;

pub const ENV_DELIMITER: &str = "SHEETSCAN_DELIMITER";
pub const ENV_LOG: &str = "SHEETSCAN_LOG";
pub const ENV_PLACEHOLDER: &str = "SHEETSCAN_PLACEHOLDER";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Forced delimiter; auto-detected when `None`.
    pub delimiter: Option<char>,
    pub log_level: LogLevel,
    pub empty_placeholder: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delimiter: None,
            log_level: LogLevel::Info,
            empty_placeholder: true,
        }
    }
}

impl Settings {
    /// Load from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(raw) = lookup(ENV_DELIMITER) {
            settings.delimiter = Some(parse_delimiter(&raw).map_err(|message| {
                ConfigError::InvalidValue {
                    key: ENV_DELIMITER,
                    value: raw.clone(),
                    message,
                }
            })?);
        }

        if let Some(raw) = lookup(ENV_LOG) {
            settings.log_level = raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: ENV_LOG,
                value: raw.clone(),
                message,
            })?;
        }

        if let Some(raw) = lookup(ENV_PLACEHOLDER) {
            settings.empty_placeholder = parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: ENV_PLACEHOLDER,
                value: raw.clone(),
                message: "expected true or false".to_string(),
            })?;
        }

        Ok(settings)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            empty_placeholder: self.empty_placeholder,
        }
    }
}

/// Parse a delimiter argument; `\t` and `tab` mean a tab.
pub fn parse_delimiter(raw: &str) -> Result<char, String> {
    if matches!(raw, "\\t" | "tab") {
        return Ok('\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err("expected a single ASCII character".to_string()),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
