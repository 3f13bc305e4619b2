//! Configuration persistence for stepguide settings

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::ShapeStyle;

/// Annotation colour, stored as a CSS hex string (`#rrggbb`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShapeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for ShapeColor {
    fn default() -> Self {
        // Indigo, the editor's initial colour
        Self::rgb(0x63, 0x66, 0xf1)
    }
}

impl ShapeColor {
    pub const RED: ShapeColor = ShapeColor::rgb(0xff, 0x00, 0x00);
    pub const WHITE: ShapeColor = ShapeColor::rgb(0xff, 0xff, 0xff);
    pub const BLACK: ShapeColor = ShapeColor::rgb(0x00, 0x00, 0x00);
    /// Badge colour used by the editor preview when an annotation has none
    pub const ORANGE: ShapeColor = ShapeColor::rgb(0xf9, 0x73, 0x16);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Hex form without alpha, e.g. `#6366f1`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error for colour strings that are neither hex nor a known name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised colour {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for ShapeColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "red" => return Ok(Self::RED),
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            "orange" => return Ok(Self::ORANGE),
            _ => {}
        }

        let err = || ParseColorError(s.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize, len: usize| u8::from_str_radix(&hex[i..i + len], 16);
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(0, 2).map_err(|_| err())?,
                channel(2, 2).map_err(|_| err())?,
                channel(4, 2).map_err(|_| err())?,
            )),
            // #rgb shorthand: each digit is doubled
            3 => {
                let short = |i: usize| channel(i, 1).map(|v| v * 17).map_err(|_| err());
                Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for ShapeColor {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShapeColor> for String {
    fn from(c: ShapeColor) -> Self {
        c.to_hex()
    }
}

/// Deserialize an optional colour, treating unparseable strings as absent.
///
/// Annotation colours can come from imported documents; one bad colour must
/// not reject the whole guide.
pub(crate) fn deserialize_lenient_color<'de, D>(deserializer: D) -> Result<Option<ShapeColor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse::<ShapeColor>() {
        Ok(color) => Some(color),
        Err(err) => {
            log::warn!("Ignoring annotation colour: {}", err);
            None
        }
    }))
}

/// Annotation editor tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Number,
    Text,
    Rect,
    Circle,
    Arrow,
    Crop,
}

impl Tool {
    /// Tools that create their annotation on pointer-down without a drag phase
    pub fn is_click_tool(self) -> bool {
        matches!(self, Tool::Number | Tool::Text)
    }

    /// Whether existing annotations can be grabbed while this tool is active
    pub fn allows_move(self) -> bool {
        self != Tool::Crop
    }

    /// Single-letter keyboard shortcut for this tool
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'n' => Some(Tool::Number),
            't' => Some(Tool::Text),
            'r' => Some(Tool::Rect),
            'c' => Some(Tool::Circle),
            'a' => Some(Tool::Arrow),
            'x' => Some(Tool::Crop),
            _ => None,
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tool selected when the editor opens
    pub default_tool: Tool,
    /// Colour for new annotations
    pub default_color: ShapeColor,
    /// Style for new rectangles and circles
    pub default_style: ShapeStyle,
    /// How long a capture may wait for the first frame
    pub capture_timeout_ms: u64,
    /// How often a capture source is polled for readiness
    pub capture_poll_interval_ms: u64,
    /// Upper bound for a single AI assist call
    pub assist_timeout_ms: u64,
    /// Model name passed to the AI service
    pub assist_model: String,
    /// Where guides and projects are stored (None = platform data dir)
    pub data_dir: Option<PathBuf>,
    /// Whether exports include a table of contents by default
    pub include_toc: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_tool: Tool::Number,
            default_color: ShapeColor::default(),
            default_style: ShapeStyle::Outline,
            capture_timeout_ms: 2000,
            capture_poll_interval_ms: 50,
            assist_timeout_ms: 30_000,
            assist_model: "gemini-3-flash-preview".to_string(),
            data_dir: None,
            include_toc: true,
        }
    }
}

impl EditorConfig {
    /// Application directory name under the platform config/data dirs
    pub const APP_DIR: &'static str = "stepguide";

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file, or return defaults
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("No config directory available for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Directory holding the guide store
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(Self::APP_DIR)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!("#6366f1".parse::<ShapeColor>().unwrap(), ShapeColor::default());
        assert_eq!("#f00".parse::<ShapeColor>().unwrap(), ShapeColor::RED);
        assert_eq!("white".parse::<ShapeColor>().unwrap(), ShapeColor::WHITE);
        assert!("#12345".parse::<ShapeColor>().is_err());
        assert!("6366f1".parse::<ShapeColor>().is_err());
        assert!("#zzzzzz".parse::<ShapeColor>().is_err());
    }

    #[test]
    fn test_color_serializes_as_hex() {
        let json = serde_json::to_string(&ShapeColor::rgb(1, 2, 255)).unwrap();
        assert_eq!(json, "\"#0102ff\"");
        let back: ShapeColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ShapeColor::rgb(1, 2, 255));
    }

    #[test]
    fn test_tool_keys() {
        assert_eq!(Tool::from_key('A'), Some(Tool::Arrow));
        assert_eq!(Tool::from_key('x'), Some(Tool::Crop));
        assert_eq!(Tool::from_key('q'), None);
        assert!(!Tool::Crop.allows_move());
        assert!(Tool::Text.is_click_tool());
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = EditorConfig {
            default_tool: Tool::Arrow,
            capture_timeout_ms: 500,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(EditorConfig::load_from(&path), config);
    }

    #[test]
    fn test_config_missing_or_broken_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(EditorConfig::load_from(&missing), EditorConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(EditorConfig::load_from(&broken), EditorConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"default_tool":"crop"}"#).unwrap();
        assert_eq!(config.default_tool, Tool::Crop);
        assert_eq!(config.capture_timeout_ms, 2000);
    }
}
