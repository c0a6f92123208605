//! Configuration loading for extvet services
//!
//! Settings come from a TOML file discovered with priority:
//! 1. Explicit path (command-line argument, highest priority)
//! 2. `EXTVET_CONFIG` environment variable
//! 3. Platform config directory (`~/.config/extvet/extvet.toml` on Linux)
//!
//! A missing file is not an error: services start with defaults. The Gemini
//! credential resolves separately with ENV → TOML priority so deployments can
//! keep the key out of the file.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the Gemini API credential
pub const GEMINI_API_KEY_ENV: &str = "EXTVET_GEMINI_API_KEY";

/// Environment variable pointing at the TOML config file
pub const CONFIG_PATH_ENV: &str = "EXTVET_CONFIG";

/// Service settings from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Gemini API credential (ENV takes priority, see [`resolve_gemini_api_key`])
    pub gemini_api_key: Option<String>,
    /// HTTP listen port override
    pub port: Option<u16>,
    /// Catalog JSON file replacing the embedded seed data
    pub catalog_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings following the documented path priority.
    ///
    /// An explicitly named file (argument or `EXTVET_CONFIG`) must exist and
    /// parse; the platform-default file is optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Settings> {
        if let Some(path) = explicit_path {
            info!("Loading config from {} (command line)", path.display());
            return Settings::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            info!("Loading config from {} ({})", path, CONFIG_PATH_ENV);
            return Settings::from_file(Path::new(&path));
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                info!("Loading config from {}", path.display());
                return Settings::from_file(&path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Settings::default())
    }

    /// Parse a settings file
    pub fn from_file(path: &Path) -> Result<Settings> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("extvet").join("extvet.toml"))
}

/// Resolve the Gemini API credential with ENV → TOML priority.
///
/// Warns when the key is present in multiple sources (potential
/// misconfiguration). Returns `None` when no valid key is configured; that is
/// not fatal — AI-path requests resolve fail-closed until a provider is
/// configured at runtime.
pub fn resolve_gemini_api_key(settings: &Settings) -> Option<String> {
    let mut sources = Vec::new();

    let env_key = std::env::var(GEMINI_API_KEY_ENV).ok();
    if let Some(key) = &env_key {
        if is_valid_key(key) {
            sources.push("environment");
        }
    }

    let toml_key = settings.gemini_api_key.as_ref();
    if let Some(key) = toml_key {
        if is_valid_key(key) {
            sources.push("TOML");
        }
    }

    if sources.len() > 1 {
        warn!(
            "Gemini API key found in multiple sources: {}. Using environment (highest priority).",
            sources.join(", ")
        );
    }

    if let Some(key) = env_key {
        if is_valid_key(&key) {
            info!("Gemini API key loaded from environment variable");
            return Some(key);
        }
    }

    if let Some(key) = toml_key {
        if is_valid_key(key) {
            info!("Gemini API key loaded from TOML config");
            return Some(key.clone());
        }
    }

    warn!(
        "Gemini API key not configured. Set {} or add gemini_api_key to extvet.toml; \
         until then AI-path requests resolve as rejected.",
        GEMINI_API_KEY_ENV
    );
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
