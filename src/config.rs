//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the project root overrides any subset
//! of them.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── config.toml      # Overrides stock defaults
//! ├── fallback.toml    # Optional fallback content overrides
//! ├── data/            # Content store tables (store.data_dir)
//! └── storage/         # Uploaded images (storage.dir)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name_primary = "SyncMind"       # Logo, first part
//! name_secondary = "Tech"         # Logo, accent-colored part
//! tagline = "Web Design & Development Agency"
//! footer_blurb = "..."
//! base_url = "/"                  # Prefix for every internal link
//!
//! [colors.light]
//! background = "#ffffff"
//! surface = "#f5f5f7"             # Cards and alternating sections
//! text = "#0f172a"
//! text_muted = "#64748b"
//! border = "#e2e8f0"
//! accent = "#7c3aed"
//! accent_hover = "#6d28d9"
//!
//! [colors.dark]
//! # same keys as [colors.light]
//!
//! [store]
//! data_dir = "data"
//!
//! [storage]
//! dir = "storage"
//! bucket = "cms-images"
//! public_url = "/storage"
//!
//! [cache]
//! stale_secs = 300                # Fresh window
//! gc_secs = 1800                  # Retention window, >= stale_secs
//!
//! [contact]
//! service_id = ""                 # Email relay ids; empty disables the form
//! template_id = ""
//! public_key = ""
//! endpoint = "https://api.emailjs.com/api/v1.0/email/send"
//!
//! [chat]
//! whatsapp_number = ""            # Used when contact_info has none
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [colors.dark]
//! accent = "#a78bfa"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::cache::CachePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Brand and link settings.
    pub site: SiteInfo,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    pub store: StoreConfig,
    /// Object storage for uploaded images.
    pub storage: StorageConfig,
    /// Content query cache windows.
    pub cache: CacheConfig,
    /// Email relay used by the contact form.
    pub contact: ContactConfig,
    pub chat: ChatConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.gc_secs < self.cache.stale_secs {
            return Err(ConfigError::Validation(
                "cache.gc_secs must be >= cache.stale_secs".into(),
            ));
        }
        if self.storage.bucket.is_empty() || self.storage.bucket.contains('/') {
            return Err(ConfigError::Validation(
                "storage.bucket must be a non-empty name without '/'".into(),
            ));
        }
        if !self.chat.whatsapp_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Validation(
                "chat.whatsapp_number must contain digits only".into(),
            ));
        }
        if self.contact.is_configured()
            && !(self.contact.endpoint.starts_with("https://")
                || self.contact.endpoint.starts_with("http://"))
        {
            return Err(ConfigError::Validation(
                "contact.endpoint must be an http(s) URL".into(),
            ));
        }
        for (name, scheme) in [("light", &self.colors.light), ("dark", &self.colors.dark)] {
            if let Some(key) = scheme.first_empty() {
                return Err(ConfigError::Validation(format!(
                    "colors.{name}.{key} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Content store directory, relative paths resolved against `root`.
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.store.data_dir)
    }

    /// Object storage directory, relative paths resolved against `root`.
    pub fn storage_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.storage.dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// First part of the wordmark.
    pub name_primary: String,
    /// Second part of the wordmark, rendered in the accent color.
    pub name_secondary: String,
    pub tagline: String,
    pub footer_blurb: String,
    /// Prefix for internal links. `/` for a site at the domain root.
    pub base_url: String,
}

impl SiteInfo {
    pub fn name(&self) -> String {
        format!("{}{}", self.name_primary, self.name_secondary)
    }

    /// Absolute site path for a relative one (`"blog/"` → `"/blog/"`).
    pub fn link(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name_primary: "SyncMind".to_string(),
            name_secondary: "Tech".to_string(),
            tagline: "Web Design & Development Agency".to_string(),
            footer_blurb: "We craft digital experiences that captivate and convert. \
                           WordPress, Webflow, Shopify, SEO and Figma design."
                .to_string(),
            base_url: "/".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background color.
    pub background: String,
    /// Card and alternate-section background.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Muted/secondary text color (subtitles, meta lines, footer).
    pub text_muted: String,
    /// Border color.
    pub border: String,
    /// Brand accent (buttons, highlights, links).
    pub accent: String,
    pub accent_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            surface: "#f5f5f7".to_string(),
            text: "#0f172a".to_string(),
            text_muted: "#64748b".to_string(),
            border: "#e2e8f0".to_string(),
            accent: "#7c3aed".to_string(),
            accent_hover: "#6d28d9".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0b0b12".to_string(),
            surface: "#15151f".to_string(),
            text: "#f1f5f9".to_string(),
            text_muted: "#94a3b8".to_string(),
            border: "#27273a".to_string(),
            accent: "#8b5cf6".to_string(),
            accent_hover: "#a78bfa".to_string(),
        }
    }

    fn first_empty(&self) -> Option<&'static str> {
        [
            ("background", &self.background),
            ("surface", &self.surface),
            ("text", &self.text),
            ("text_muted", &self.text_muted),
            ("border", &self.border),
            ("accent", &self.accent),
            ("accent_hover", &self.accent_hover),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding one `<table>.json` per table.
    pub data_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding buckets.
    pub dir: String,
    pub bucket: String,
    /// URL prefix the bucket is served under. The build copies the bucket to
    /// `<output>/storage/`, so the default works for a site at the domain root.
    pub public_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: "storage".to_string(),
            bucket: "cms-images".to_string(),
            public_url: "/storage".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Seconds a fetched value is reused without asking the store.
    pub stale_secs: u64,
    /// Seconds an unused entry is kept before eviction.
    pub gc_secs: u64,
}

impl CacheConfig {
    pub fn policy(&self) -> CachePolicy {
        CachePolicy {
            stale_time: Duration::from_secs(self.stale_secs),
            gc_time: Duration::from_secs(self.gc_secs),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_secs: 5 * 60,
            gc_secs: 30 * 60,
        }
    }
}

/// Transactional email relay settings (EmailJS-compatible).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    pub service_id: String,
    pub template_id: String,
    /// Relay account key sent as `user_id`. Public by design of the relay.
    pub public_key: String,
    pub endpoint: String,
}

impl ContactConfig {
    /// All three relay ids are set.
    pub fn is_configured(&self) -> bool {
        !self.service_id.is_empty() && !self.template_id.is_empty() && !self.public_key.is_empty()
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            service_id: String::new(),
            template_id: String::new(),
            public_key: String::new(),
            endpoint: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatConfig {
    /// Digits only, international format without `+`.
    pub whatsapp_number: String,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
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

/// Load a TOML file from a directory as a raw value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_toml(dir: &Path, file_name: &str) -> Result<Option<toml::Value>, ConfigError> {
    let path = dir.join(file_name);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load `config.toml` from a directory as a raw TOML value.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    load_raw_toml(root, "config.toml")
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
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(root = %root.display(), "loaded config");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Agency Site Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Brand
# ---------------------------------------------------------------------------
[site]
# Wordmark, rendered as <primary><secondary> with the second part accented.
name_primary = "SyncMind"
name_secondary = "Tech"
tagline = "Web Design & Development Agency"
footer_blurb = "We craft digital experiences that captivate and convert. WordPress, Webflow, Shopify, SEO and Figma design."
# Prefix for every internal link. Change when serving from a subdirectory.
base_url = "/"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
surface = "#f5f5f7"       # Cards, alternating sections
text = "#0f172a"
text_muted = "#64748b"    # Subtitles, meta lines, footer
border = "#e2e8f0"
accent = "#7c3aed"        # Buttons, highlights, links
accent_hover = "#6d28d9"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0b0b12"
surface = "#15151f"
text = "#f1f5f9"
text_muted = "#94a3b8"
border = "#27273a"
accent = "#8b5cf6"
accent_hover = "#a78bfa"

# ---------------------------------------------------------------------------
# Content store
# ---------------------------------------------------------------------------
[store]
# One <table>.json file per table. Relative to the project root.
data_dir = "data"

# ---------------------------------------------------------------------------
# Image storage
# ---------------------------------------------------------------------------
[storage]
# Buckets live under this directory. Relative to the project root.
dir = "storage"
bucket = "cms-images"
# URL prefix uploaded images are served under.
public_url = "/storage"

# ---------------------------------------------------------------------------
# Content cache
# ---------------------------------------------------------------------------
[cache]
# A fetched section is reused for this many seconds without a store read.
stale_secs = 300
# An entry nobody asked for in this many seconds is dropped.
# Must be >= stale_secs.
gc_secs = 1800

# ---------------------------------------------------------------------------
# Contact form email relay (EmailJS-compatible)
# ---------------------------------------------------------------------------
[contact]
# Leave any of the three ids empty to render the form without a relay.
service_id = ""
template_id = ""
public_key = ""
endpoint = "https://api.emailjs.com/api/v1.0/email/send"

# ---------------------------------------------------------------------------
# Chat button
# ---------------------------------------------------------------------------
[chat]
# Digits only, international format. contact_info.whatsapp_number wins when
# set. Empty hides the button.
whatsapp_number = ""
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    fn vars(scheme: &ColorScheme, indent: &str) -> String {
        [
            ("bg", &scheme.background),
            ("surface", &scheme.surface),
            ("text", &scheme.text),
            ("text-muted", &scheme.text_muted),
            ("border", &scheme.border),
            ("accent", &scheme.accent),
            ("accent-hover", &scheme.accent_hover),
        ]
        .iter()
        .map(|(name, value)| format!("{indent}--color-{name}: {value};"))
        .collect::<Vec<_>>()
        .join("\n")
    }

    format!(
        ":root {{\n{light}\n}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{dark}\n    }}\n}}",
        light = vars(&colors.light, "    "),
        dark = vars(&colors.dark, "        "),
    )
}
