use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Instrument-format constants
// ---------------------------------------------------------------------------

/// Lines of opaque instrument header preceding the scanned table.
pub const PREAMBLE_LINES: usize = 31;

/// Raw lines kept for the preview panel.
pub const PREVIEW_LINES: usize = 30;

/// Columns 0..3 hold identifier and two auxiliary fields; values start here.
pub const FIRST_VALUE_COLUMN: usize = 3;

pub const ANCHOR_MARKER: &str = "x-axis";
pub const TARE_MARKER: &str = "Tare";

/// Environment variable pointing at an optional JSON [`FormatConfig`] override.
pub const FORMAT_ENV_VAR: &str = "STRAIN_VIEWER_FORMAT";

// ---------------------------------------------------------------------------
// FormatConfig
// ---------------------------------------------------------------------------

/// Layout of a measurement export. The defaults describe the instrument's
/// tab-separated export; everything here is a format constant rather than a
/// general truth about tabular data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub preamble_lines: usize,
    pub preview_lines: usize,
    pub first_value_column: usize,
    pub anchor_marker: String,
    pub tare_marker: String,
    pub delimiter: char,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            preamble_lines: PREAMBLE_LINES,
            preview_lines: PREVIEW_LINES,
            first_value_column: FIRST_VALUE_COLUMN,
            anchor_marker: ANCHOR_MARKER.to_string(),
            tare_marker: TARE_MARKER.to_string(),
            delimiter: '\t',
        }
    }
}

impl FormatConfig {
    /// Read a JSON override. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading format config {}", path.display()))?;
        serde_json::from_str(&text).context("parsing format config")
    }

    /// Resolve the config from [`FORMAT_ENV_VAR`], falling back to defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(FORMAT_ENV_VAR) else {
            return Self::default();
        };
        match Self::from_json_file(Path::new(&path)) {
            Ok(cfg) => {
                log::info!("Using format config from {}", Path::new(&path).display());
                cfg
            }
            Err(e) => {
                log::warn!("Ignoring format config: {e:#}");
                Self::default()
            }
        }
    }

    /// The delimiter as a single byte for the csv reader; non-ASCII falls back to tab.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b'\t'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: FormatConfig = serde_json::from_str(r#"{ "preamble_lines": 5 }"#).unwrap();
        assert_eq!(cfg.preamble_lines, 5);
        assert_eq!(cfg.first_value_column, FIRST_VALUE_COLUMN);
        assert_eq!(cfg.anchor_marker, "x-axis");
        assert_eq!(cfg.delimiter_byte(), b'\t');
    }

    #[test]
    fn reads_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{ "delimiter": ",", "tare_marker": "Zero" }"#)
            .unwrap();
        let cfg = FormatConfig::from_json_file(file.path()).unwrap();
        assert_eq!(cfg.delimiter_byte(), b',');
        assert_eq!(cfg.tare_marker, "Zero");
        assert_eq!(cfg.preamble_lines, PREAMBLE_LINES);
    }
}
