//! Terminal configuration loaded from TOML.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration load or validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// File path.
        path: String,
        /// I/O error text.
        message: String,
    },
    /// The document is not valid TOML for [`TerminalConfig`].
    #[error("failed to parse terminal config: {0}")]
    Parse(String),
    /// The document parsed but violates a constraint.
    #[error("invalid terminal config: {0}")]
    Invalid(String),
}

/// Prompt shown before the input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// User segment.
    pub user: String,
    /// Host segment.
    pub host: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            user: "guest".to_string(),
            host: "portfolio".to_string(),
        }
    }
}

/// Banner printed by `welcome` and after `clear`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WelcomeConfig {
    /// First line.
    pub title: String,
    /// Line under the title.
    pub tagline: String,
    /// Extra lines, printed as-is.
    pub lines: Vec<String>,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            title: "Welcome to my terminal portfolio.".to_string(),
            tagline: "Explore my work from the command line.".to_string(),
            lines: Vec::new(),
        }
    }
}

/// History retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum entries kept in the session and in storage.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 200 }
    }
}

/// Cosmetic catalogs and their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Color themes.
    pub themes: Vec<String>,
    /// Cursor styles.
    pub cursors: Vec<String>,
    /// Background wallpapers.
    pub wallpapers: Vec<String>,
    /// Theme used when nothing is saved.
    pub default_theme: String,
    /// Cursor used when nothing is saved.
    pub default_cursor: String,
    /// Wallpaper used when nothing is saved.
    pub default_wallpaper: String,
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            themes: names(&["default", "dracula", "nord", "solarized", "matrix"]),
            cursors: names(&["block", "underline", "bar"]),
            wallpapers: names(&["none", "aurora", "grid", "stars"]),
            default_theme: "default".to_string(),
            default_cursor: "block".to_string(),
            default_wallpaper: "none".to_string(),
        }
    }
}

/// Top-level terminal configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Portfolio owner's display name.
    pub owner: String,
    /// Prompt segments.
    pub prompt: PromptConfig,
    /// Welcome banner.
    pub welcome: WelcomeConfig,
    /// History retention.
    pub history: HistoryConfig,
    /// Appearance catalogs.
    pub appearance: AppearanceConfig,
    /// Link name to URL, used by `open`.
    pub links: BTreeMap<String, String>,
}

impl TerminalConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and [`ConfigError::Invalid`] when a
    /// constraint is violated.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.links = fold_link_names(config.links)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Fails like [`TerminalConfig::from_toml_str`], or with [`ConfigError::Read`] when the file
    /// is unreadable.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&body)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "history.max_entries must be greater than zero".to_string(),
            ));
        }
        let appearance = &self.appearance;
        let catalogs = [
            ("theme", &appearance.themes, &appearance.default_theme),
            ("cursor", &appearance.cursors, &appearance.default_cursor),
            ("wallpaper", &appearance.wallpapers, &appearance.default_wallpaper),
        ];
        for (kind, options, default) in catalogs {
            if options.is_empty() {
                return Err(ConfigError::Invalid(format!("appearance.{kind}s is empty")));
            }
            if !options.contains(default) {
                return Err(ConfigError::Invalid(format!(
                    "appearance.default_{kind} `{default}` is not in appearance.{kind}s"
                )));
            }
        }
        for (name, url) in &self.links {
            if *name != name.to_lowercase() {
                return Err(ConfigError::Invalid(format!("links.{name} must be lowercase")));
            }
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::Invalid(format!(
                    "links.{name} must be an http(s) URL"
                )));
            }
        }
        Ok(())
    }

    /// Prompt string, for example `guest@portfolio:~$`.
    pub fn prompt(&self) -> String {
        format!("{}@{}:~$", self.prompt.user, self.prompt.host)
    }
}

/// Link names are matched case-insensitively by `open`, so they are stored lowercase.
fn fold_link_names(
    links: BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut folded = BTreeMap::new();
    for (name, url) in links {
        let key = name.to_lowercase();
        if folded.contains_key(&key) {
            return Err(ConfigError::Invalid(format!(
                "links.{name} collides with another link of the same name"
            )));
        }
        folded.insert(key, url);
    }
    Ok(folded)
}
