//! Site configuration store.
//!
//! Configuration is a flat mapping of named options, set during
//! initialization and read-only afterwards. Values come from stock defaults
//! overridden by one or more `config.toml` layers (the site file supersedes
//! the defaults, a later layer supersedes an earlier one).
//!
//! ## Two Views of the Same Data
//!
//! - [`ConfigStore`] is the untyped, name-addressed view used while loading.
//!   `set` overwrites (last write wins) and `get` returns the exact literal
//!   that was written, falling back to the declared default.
//! - [`SiteConfig`] is the typed, immutable struct built once from the store
//!   and passed by reference into every component that needs it.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml              # Site config (overrides stock defaults)
//! └── templates/
//!     ├── layouts/
//!     ├── sections/
//!     └── partials/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//! debugMode = false
//! useFunctionsApiStyle = true
//! usePageSubclassing = true
//! useMarkupRegions = true
//! prependHookFile = "_init.html"
//! appendHookFile = "_main.html"
//! compileTemplates = false
//! tableSaltValue = ""
//! defaultAdminThemeName = "AdminThemeUikit"
//! liveReloadEnabled = false
//! assetsUrl = "/site/assets/"
//! templatesUrl = "/site/templates/"
//! lang = "en"
//! ```
//!
//! Values are never coerced: `liveReloadEnabled = 1` is rejected because the
//! key is a boolean. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Undefined config key: {0}")]
    Undefined(String),
    #[error("Config key {key} holds a {kind}; only booleans, integers and strings are allowed")]
    UnsupportedValue { key: String, kind: &'static str },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Keys whose values must never be printed or logged.
pub const SECRET_KEYS: &[&str] = &["tableSaltValue"];

/// Placeholder shown in place of secret values.
const REDACTED: &str = "********";

/// A literal configuration value, kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ConfigValue {
    /// Convert a scalar TOML value. Tables, arrays, floats and datetimes are rejected.
    pub fn from_toml(key: &str, value: toml::Value) -> Result<Self, ConfigError> {
        let kind = match value {
            toml::Value::Boolean(b) => return Ok(Self::Bool(b)),
            toml::Value::Integer(i) => return Ok(Self::Int(i)),
            toml::Value::String(s) => return Ok(Self::Str(s)),
            toml::Value::Float(_) => "float",
            toml::Value::Datetime(_) => "datetime",
            toml::Value::Array(_) => "array",
            toml::Value::Table(_) => "table",
        };
        Err(ConfigError::UnsupportedValue {
            key: key.to_string(),
            kind,
        })
    }

    pub fn to_toml(&self) -> toml::Value {
        match self {
            Self::Bool(b) => toml::Value::Boolean(*b),
            Self::Int(i) => toml::Value::Integer(*i),
            Self::Str(s) => toml::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Name-addressed configuration entries, populated during initialization.
///
/// Freeze it into a [`SiteConfig`] with [`ConfigStore::build`] once loading
/// is done; nothing reads the store after that.
#[derive(Clone, Default)]
pub struct ConfigStore {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an entry, returning the value it replaced (last write wins).
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.entries.insert(name.into(), value.into())
    }

    /// Look up an entry, falling back to its declared default.
    pub fn get(&self, name: &str) -> Result<ConfigValue, ConfigError> {
        if let Some(value) = self.entries.get(name) {
            return Ok(value.clone());
        }
        declared_default(name)?.ok_or_else(|| ConfigError::Undefined(name.to_string()))
    }

    /// Whether an entry was explicitly set (defaults don't count).
    pub fn is_set(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Explicitly set entry names, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Apply `config.toml` from `dir` on top of the current entries.
    ///
    /// Returns `Ok(false)` when the directory has no `config.toml`.
    pub fn load_file(&mut self, dir: &Path) -> Result<bool, ConfigError> {
        let Some(value) = load_raw_config(dir)? else {
            return Ok(false);
        };
        if let toml::Value::Table(table) = value {
            for (key, val) in table {
                let literal = ConfigValue::from_toml(&key, val)?;
                self.set(key, literal);
            }
        }
        Ok(true)
    }

    /// Merge the entries over stock defaults, deserialize and validate.
    pub fn build(&self) -> Result<SiteConfig, ConfigError> {
        let overlay: toml::map::Map<String, toml::Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_toml()))
            .collect();
        resolve_config(stock_defaults_value(), Some(toml::Value::Table(overlay)))
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.entries {
            if SECRET_KEYS.contains(&key.as_str()) {
                map.entry(key, &REDACTED);
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

fn declared_default(name: &str) -> Result<Option<ConfigValue>, ConfigError> {
    match stock_defaults_value() {
        toml::Value::Table(mut table) => table
            .remove(name)
            .map(|v| ConfigValue::from_toml(name, v))
            .transpose(),
        _ => Ok(None),
    }
}

/// A string that never shows up in `Debug` or `Display` output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({REDACTED})")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Immutable site configuration, built once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct SiteConfig {
    /// Verbose logging and the live-reload client.
    pub debug_mode: bool,
    /// Host flag: templates use the functions API instead of variables.
    pub use_functions_api_style: bool,
    /// Host flag: pages are backed by per-type classes.
    pub use_page_subclassing: bool,
    /// Apply region edits registered by partials.
    pub use_markup_regions: bool,
    /// Host hook file run before each page template.
    pub prepend_hook_file: String,
    /// Host hook file run after each page template.
    pub append_hook_file: String,
    /// Host flag: compile templates before running them.
    pub compile_templates: bool,
    /// Host hashing salt. Never printed.
    pub table_salt_value: Secret,
    /// Theme the host admin interface starts with.
    pub default_admin_theme_name: String,
    /// Inject the live-reload client (only honored in debug mode).
    pub live_reload_enabled: bool,
    /// URL prefix for site assets such as favicons. Must end with `/`.
    pub assets_url: String,
    /// URL prefix for template files and discovered assets. Must end with `/`.
    pub templates_url: String,
    /// Document language for `<html lang>`.
    pub lang: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            use_functions_api_style: true,
            use_page_subclassing: true,
            use_markup_regions: true,
            prepend_hook_file: "_init.html".to_string(),
            append_hook_file: "_main.html".to_string(),
            compile_templates: false,
            table_salt_value: Secret::default(),
            default_admin_theme_name: "AdminThemeUikit".to_string(),
            live_reload_enabled: false,
            assets_url: "/site/assets/".to_string(),
            templates_url: "/site/templates/".to_string(),
            lang: "en".to_string(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_admin_theme_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "defaultAdminThemeName must not be empty".into(),
            ));
        }
        for (key, file) in [
            ("prependHookFile", &self.prepend_hook_file),
            ("appendHookFile", &self.append_hook_file),
        ] {
            if file.contains('/') || file.contains('\\') {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a file name, not a path: {file}"
                )));
            }
        }
        for (key, url) in [
            ("assetsUrl", &self.assets_url),
            ("templatesUrl", &self.templates_url),
        ] {
            if !url.ends_with('/') {
                return Err(ConfigError::Validation(format!(
                    "{key} must end with '/': {url}"
                )));
            }
        }
        if self.lang.is_empty() {
            return Err(ConfigError::Validation("lang must not be empty".into()));
        }
        Ok(())
    }

    /// Whether the live-reload client should be injected.
    pub fn live_reload(&self) -> bool {
        self.debug_mode && self.live_reload_enabled
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// The `config.toml` in `dir`, if there is one.
pub fn config_file(dir: &Path) -> Option<PathBuf> {
    let config_path = dir.join("config.toml");
    config_path.is_file().then_some(config_path)
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let Some(config_path) = config_file(dir) else {
        return Ok(None);
    };
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    load_config_layers(&[dir])
}

/// Load config from several directories; later layers override earlier ones.
pub fn load_config_layers(dirs: &[&Path]) -> Result<SiteConfig, ConfigError> {
    let mut store = ConfigStore::new();
    for dir in dirs {
        if store.load_file(dir)? {
            log::debug!("loaded {}", dir.join("config.toml").display());
        }
    }
    store.build()
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Site Shell Configuration
# ========================
# All settings are optional. Values shown below are the defaults.
# Values are taken literally: a boolean key needs true/false, not 1/0.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
# Verbose logging and, together with liveReloadEnabled, the live-reload client.
debugMode = false

# Apply region edits (prepend/append/before/after/replace/remove) that
# partials register against named regions of the main document.
useMarkupRegions = true

# Inject the live-reload client script. Only honored when debugMode is on.
liveReloadEnabled = false

# Document language for <html lang>.
lang = "en"

# ---------------------------------------------------------------------------
# URLs
# ---------------------------------------------------------------------------
# Prefix for site assets (favicons, manifest). Must end with '/'.
assetsUrl = "/site/assets/"

# Prefix for template files and assets found in the default folders.
templatesUrl = "/site/templates/"

# ---------------------------------------------------------------------------
# Host CMS
# ---------------------------------------------------------------------------
# These are read by the host and passed through unchanged.
useFunctionsApiStyle = true
usePageSubclassing = true
compileTemplates = false
prependHookFile = "_init.html"
appendHookFile = "_main.html"
defaultAdminThemeName = "AdminThemeUikit"

# Hashing salt. Keep it out of version control; it is never printed.
tableSaltValue = ""
"##
}
