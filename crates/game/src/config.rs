//! Static configuration for the map description banner.
//!
//! Parameters arrive the way plugin parameters do: a flat JSON object whose
//! values are strings (numbers and booleans are accepted and stringified).
//! Nothing here interprets the values; `style::StyleResolver` turns them into
//! typed settings and applies the documented fallbacks.

use bevy::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

// =============================================================================
// Layout constants
// =============================================================================

/// Opacity change per frame while fading in or out.
pub const FADE_STEP: u8 = 16;

/// Height of one line of banner text in pixels.
pub const LINE_HEIGHT: f32 = 36.0;

/// Padding between the window frame and its contents.
pub const STANDARD_PADDING: f32 = 18.0;

/// Inset of the description text inside the painted background.
pub const TEXT_PADDING: f32 = 6.0;

/// Font size of the description text.
pub const FONT_SIZE: f32 = 28.0;

// =============================================================================
// Parameter keys
// =============================================================================

pub const KEY_FILL_TYPE: &str = "fillType";
pub const KEY_SOLID_COLOR: &str = "solidColor";
pub const KEY_GRADIENT_COLOR_1: &str = "gradientColor1";
pub const KEY_GRADIENT_COLOR_2: &str = "gradientColor2";
pub const KEY_GRADIENT_MIDPOINT: &str = "gradientMidpoint";
pub const KEY_BANNER_HEIGHT_LINES: &str = "bannerHeightLines";
pub const KEY_DISPLAY_DURATION_FRAMES: &str = "displayDurationFrames";
pub const KEY_HIDE_IF_SEEN: &str = "hideIfSeen";

/// Long parameter names used by older configuration files, mapped to the
/// short keys above.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("Map Description Background Fill Type", KEY_FILL_TYPE),
    ("Map Description Window Color", KEY_SOLID_COLOR),
    ("Map Description Window Gradient Color 1", KEY_GRADIENT_COLOR_1),
    ("Map Description Window Gradient Color 2", KEY_GRADIENT_COLOR_2),
    ("Map Description Window Gradient Midpoint", KEY_GRADIENT_MIDPOINT),
    ("Map Description Window Height", KEY_BANNER_HEIGHT_LINES),
    ("Map Name and Description Display Time", KEY_DISPLAY_DURATION_FRAMES),
];

/// Default value for every recognized key.
pub const DEFAULTS: &[(&str, &str)] = &[
    (KEY_FILL_TYPE, "solid"),
    (KEY_SOLID_COLOR, "rgba(0, 0, 0, 0.6)"),
    (KEY_GRADIENT_COLOR_1, "rgba(0, 0, 0, 0.6)"),
    (KEY_GRADIENT_COLOR_2, "rgba(0, 0, 0, 0)"),
    (KEY_GRADIENT_MIDPOINT, "50"),
    (KEY_BANNER_HEIGHT_LINES, "3"),
    (KEY_DISPLAY_DURATION_FRAMES, "150"),
    (KEY_HIDE_IF_SEEN, "off"),
];

/// Look up the built-in default for `key`.
pub fn default_for(key: &str) -> &'static str {
    DEFAULTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or("")
}

// =============================================================================
// ConfigError
// =============================================================================

/// Errors from reading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid JSON.
    Json(serde_json::Error),
    /// The JSON is valid but the top level is not an object.
    NotAnObject,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {e}"),
            ConfigError::Json(e) => write!(f, "invalid JSON: {e}"),
            ConfigError::NotAnObject => write!(f, "expected a JSON object of parameters"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::NotAnObject => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

// =============================================================================
// DescriptionConfig
// =============================================================================

/// Raw parameter strings keyed by their short name.
///
/// Immutable once built; missing keys read as their default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptionConfig {
    params: BTreeMap<String, String>,
}

impl DescriptionConfig {
    /// Build from key/value pairs. Legacy long names are folded into short keys;
    /// unknown keys are kept but never read.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let params = pairs
            .into_iter()
            .map(|(k, v)| {
                let key: String = k.into();
                (canonical_key(&key).to_string(), v.into())
            })
            .collect();
        Self { params }
    }

    /// Parse a JSON object of parameters.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(map) = value else {
            return Err(ConfigError::NotAnObject);
        };
        Ok(Self::from_pairs(
            map.into_iter().map(|(k, v)| (k, value_to_param(v))),
        ))
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Like [`load`](Self::load), but a missing or broken file yields the
    /// defaults. A missing file is expected and only logged at `info`.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded map description config from {}", path.display());
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "No map description config at {}, using defaults",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                warn!(
                    "Map description config {}: {e}; using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// The configured value for `key`, or its built-in default.
    pub fn get(&self, key: &str) -> &str {
        self.params
            .get(key)
            .map(String::as_str)
            .unwrap_or_else(|| default_for(key))
    }

    /// Whether `key` was explicitly provided.
    pub fn is_set(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }
}

fn canonical_key(key: &str) -> &str {
    LEGACY_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == key)
        .map(|(_, short)| *short)
        .unwrap_or(key)
}

fn value_to_param(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_read_defaults() {
        let config = DescriptionConfig::default();
        assert_eq!(config.get(KEY_FILL_TYPE), "solid");
        assert_eq!(config.get(KEY_DISPLAY_DURATION_FRAMES), "150");
        assert_eq!(config.get(KEY_HIDE_IF_SEEN), "off");
        assert!(!config.is_set(KEY_FILL_TYPE));
    }

    #[test]
    fn test_json_values_are_stringified() {
        let config = DescriptionConfig::from_json_str(
            r#"{"fillType": "Gradient", "gradientMidpoint": 25, "hideIfSeen": true}"#,
        )
        .unwrap();
        assert_eq!(config.get(KEY_FILL_TYPE), "Gradient");
        assert_eq!(config.get(KEY_GRADIENT_MIDPOINT), "25");
        assert_eq!(config.get(KEY_HIDE_IF_SEEN), "true");
    }

    #[test]
    fn test_legacy_names_map_to_short_keys() {
        let config = DescriptionConfig::from_json_str(
            r#"{"Map Name and Description Display Time": "90",
                "Map Description Window Gradient Color 2": "rgba(10, 20, 30, 0.5)"}"#,
        )
        .unwrap();
        assert_eq!(config.get(KEY_DISPLAY_DURATION_FRAMES), "90");
        assert_eq!(config.get(KEY_GRADIENT_COLOR_2), "rgba(10, 20, 30, 0.5)");
        assert!(config.is_set(KEY_DISPLAY_DURATION_FRAMES));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        let err = DescriptionConfig::from_json_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject), "got: {err}");
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = DescriptionConfig::from_json_str("{ fillType: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)), "got: {err}");
        assert!(format!("{err}").contains("invalid JSON"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let path = std::env::temp_dir().join("map_descriptions_config_does_not_exist.json");
        let _ = std::fs::remove_file(&path);
        assert_eq!(
            DescriptionConfig::load_or_default(&path),
            DescriptionConfig::default()
        );
    }

    #[test]
    fn test_load_reads_file() {
        let dir = std::env::temp_dir().join("map_descriptions_config_test_load");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"bannerHeightLines": "2"}"#).unwrap();

        let config = DescriptionConfig::load(&path).unwrap();
        assert_eq!(config.get(KEY_BANNER_HEIGHT_LINES), "2");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_error_source() {
        let err = ConfigError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(format!("{err}").contains("boom"));
    }
}
