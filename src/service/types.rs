use serde::{Deserialize, Serialize};

pub use crate::layout::requests::ValueRange;

/// How the remote service interprets written values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    Raw,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
        }
    }
}

/// Spreadsheet resource, used both as creation payload and metadata response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SpreadsheetProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sheets: Vec<SheetResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub developer_metadata: Vec<DeveloperMetadata>,
}

impl SpreadsheetResource {
    pub fn title(&self) -> Option<&str> {
        self.properties.as_ref()?.title.as_deref()
    }

    /// Value of a spreadsheet-level developer metadata entry
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.developer_metadata
            .iter()
            .find(|m| m.metadata_key == key)
            .and_then(|m| m.metadata_value.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetResource {
    #[serde(default)]
    pub properties: SheetResourceProperties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub developer_metadata: Vec<DeveloperMetadata>,
}

impl SheetResource {
    /// Value of a developer metadata entry located on this sheet
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.developer_metadata
            .iter()
            .find(|m| m.metadata_key == key)
            .and_then(|m| m.metadata_value.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetResourceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_row_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperMetadata {
    pub metadata_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<MetadataLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

impl DeveloperMetadata {
    /// Document-visible entry attached to the whole spreadsheet
    pub fn spreadsheet(key: impl Into<String>, value: impl Into<String>) -> Self {
        DeveloperMetadata {
            metadata_key: key.into(),
            metadata_value: Some(value.into()),
            location: Some(MetadataLocation {
                spreadsheet: Some(true),
                sheet_id: None,
            }),
            visibility: Some("DOCUMENT".to_string()),
        }
    }

    /// Document-visible entry attached to one sheet
    pub fn sheet(sheet_id: i64, key: impl Into<String>, value: impl Into<String>) -> Self {
        DeveloperMetadata {
            metadata_key: key.into(),
            metadata_value: Some(value.into()),
            location: Some(MetadataLocation {
                sheet_id: Some(sheet_id),
                ..Default::default()
            }),
            visibility: Some("DOCUMENT".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchUpdateValuesRequest<'a> {
    pub value_input_option: ValueInputOption,
    pub data: &'a [ValueRange],
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BatchUpdateRequest<'a> {
    pub requests: &'a [crate::layout::requests::Request],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<u32>,
    #[serde(default)]
    pub updated_cells: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesResponse {
    #[serde(default)]
    pub total_updated_rows: Option<u32>,
    #[serde(default)]
    pub total_updated_cells: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateSpreadsheetResponse {
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
}

/// File permission granted through the file-sharing service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl Permission {
    pub fn domain(domain: impl Into<String>, role: impl Into<String>) -> Self {
        Permission {
            kind: "domain".to_string(),
            role: role.into(),
            domain: Some(domain.into()),
        }
    }
}
