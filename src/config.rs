use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SheetError};
use crate::layout::requests::Color;

const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Styling and protection settings injected into the layout builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Header band colors; groups alternate between the two by index parity
    pub banding_palette: [Color; 2],
    /// Background of protected column regions
    pub protected_background: Color,
    /// Users allowed to edit protected columns
    pub protected_range_editors: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            banding_palette: [Color::from_rgb8(150, 52, 18), Color::from_rgb8(18, 97, 150)],
            protected_background: Color::from_rgb8(217, 217, 217),
            protected_range_editors: Vec::new(),
        }
    }
}

/// Domain-wide permission granted on newly created spreadsheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainPermission {
    pub domain: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "writer".to_string()
}

/// Grid window used when a sheet's capacity is unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridWindow {
    pub rows: u32,
    pub columns: u32,
}

impl Default for GridWindow {
    fn default() -> Self {
        GridWindow {
            rows: 1000,
            columns: 26,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub sheets_base_url: String,
    pub drive_base_url: String,
    pub request_timeout_secs: u64,
    pub layout: LayoutConfig,
    pub sharing: Option<DomainPermission>,
    pub default_window: GridWindow,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        SheetsConfig {
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
            request_timeout_secs: 30,
            layout: LayoutConfig::default(),
            sharing: None,
            default_window: GridWindow::default(),
        }
    }
}

impl SheetsConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: SheetsConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.default_window.rows == 0 || self.default_window.columns == 0 {
            return Err(SheetError::Config(
                "default_window must have at least one row and one column".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(SheetError::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SheetsConfig::from_json_str(
            r#"{
                "sharing": { "domain": "example.com" },
                "layout": { "protected_range_editors": ["owner@example.com"] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.sheets_base_url, DEFAULT_SHEETS_BASE_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.default_window, GridWindow { rows: 1000, columns: 26 });
        let sharing = config.sharing.unwrap();
        assert_eq!(sharing.domain, "example.com");
        assert_eq!(sharing.role, "writer");
        assert_eq!(config.layout.protected_range_editors, vec!["owner@example.com"]);
        assert_eq!(config.layout.banding_palette, LayoutConfig::default().banding_palette);
    }

    #[test]
    fn test_rejects_empty_window() {
        let result = SheetsConfig::from_json_str(r#"{ "default_window": { "rows": 0, "columns": 5 } }"#);
        assert!(matches!(result, Err(SheetError::Config(_))));
    }
}
