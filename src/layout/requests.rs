//! Structured `spreadsheets.batchUpdate` request payloads.
//!
//! Field names and enum literals mirror the Sheets v4 REST schema; every
//! type serializes to exactly the JSON the remote service expects.

use serde::{Deserialize, Serialize};

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    /// Build from 0-255 channel values
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Color {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
        }
    }
}

/// Zero-based, end-exclusive grid rectangle. Missing bounds are unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

impl GridRange {
    /// Rows `[start_row, end_row)` across every column
    pub fn rows(sheet_id: i64, start_row: u32, end_row: u32) -> Self {
        GridRange {
            sheet_id,
            start_row_index: Some(start_row),
            end_row_index: Some(end_row),
            start_column_index: None,
            end_column_index: None,
        }
    }

    /// Rows `[start_row, end_row)` restricted to columns `[start_col, end_col)`
    pub fn block(sheet_id: i64, start_row: u32, end_row: u32, start_col: u32, end_col: u32) -> Self {
        GridRange {
            sheet_id,
            start_row_index: Some(start_row),
            end_row_index: Some(end_row),
            start_column_index: Some(start_col),
            end_column_index: Some(end_col),
        }
    }

    /// Every row from `start_row` down, in the single column `column`
    pub fn column_from(sheet_id: i64, start_row: u32, column: u32) -> Self {
        GridRange {
            sheet_id,
            start_row_index: Some(start_row),
            end_row_index: None,
            start_column_index: Some(column),
            end_column_index: Some(column + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFormat {
    pub bold: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HorizontalAlign {
    Center,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_format: Option<TextFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<HorizontalAlign>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    OneOfList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionValue {
    pub user_entered_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanCondition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub values: Vec<ConditionValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValidationRule {
    pub condition: BooleanCondition,
    pub strict: bool,
    pub show_custom_ui: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_entered_format: Option<CellFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_validation: Option<DataValidationRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub values: Vec<CellData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatCellRequest {
    pub range: GridRange,
    pub cell: CellData,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCellsRequest {
    pub range: GridRange,
    pub rows: Vec<RowData>,
    pub fields: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeType {
    MergeAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCellsRequest {
    pub range: GridRange,
    pub merge_type: MergeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Editors {
    pub users: Vec<String>,
    pub domain_users_can_edit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedRange {
    pub range: GridRange,
    pub description: String,
    pub warning_only: bool,
    pub editors: Editors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProtectedRangeRequest {
    pub protected_range: ProtectedRange,
}

/// A block of cell values addressed by an A1 range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    pub fn new(range: impl Into<String>, values: Vec<Vec<serde_json::Value>>) -> Self {
        ValueRange {
            range: Some(range.into()),
            major_dimension: None,
            values,
        }
    }
}

/// One entry of a `spreadsheets.batchUpdate` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    RepeatCell(RepeatCellRequest),
    UpdateCells(UpdateCellsRequest),
    MergeCells(MergeCellsRequest),
    AddProtectedRange(AddProtectedRangeRequest),
}

impl Request {
    /// Target rectangle of the request
    pub fn range(&self) -> &GridRange {
        match self {
            Request::RepeatCell(r) => &r.range,
            Request::UpdateCells(r) => &r.range,
            Request::MergeCells(r) => &r.range,
            Request::AddProtectedRange(r) => &r.protected_range.range,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Request::RepeatCell(r) if r.cell.data_validation.is_some())
    }
}
