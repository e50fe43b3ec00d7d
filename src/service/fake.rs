//! Recording in-memory stand-in for both remote services.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::types::*;
use super::{DriveApi, GoogleServices, SheetsApi};
use crate::error::{Result, SheetError};
use crate::layout::requests::Request;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetSpreadsheet(String),
    CreateSpreadsheet(SpreadsheetResource),
    GetValues(String),
    UpdateValues { range: String, values: Vec<Vec<Value>> },
    BatchUpdateValues(Vec<ValueRange>),
    AppendValues { range: String, values: Vec<Vec<Value>> },
    BatchUpdate(Vec<Request>),
    GrantPermission { file_id: String, permission: Permission },
}

#[derive(Default)]
pub struct FakeGoogle {
    calls: Mutex<Vec<Call>>,
    /// Returned by `get_spreadsheet`; `None` answers 404
    pub metadata: Mutex<Option<SpreadsheetResource>>,
    /// Values returned by `get_values`, keyed by the requested range
    pub values: Mutex<HashMap<String, Vec<Vec<Value>>>>,
    /// Status and body every call fails with, when set
    pub failure: Mutex<Option<(u16, String)>>,
}

impl FakeGoogle {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeGoogle::default())
    }

    pub fn services(self: &Arc<Self>) -> GoogleServices {
        GoogleServices::new(self.clone(), self.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn set_metadata(&self, metadata: SpreadsheetResource) {
        *self.metadata.lock().unwrap() = Some(metadata);
    }

    pub fn set_values(&self, range: &str, values: Vec<Vec<Value>>) {
        self.values.lock().unwrap().insert(range.to_string(), values);
    }

    pub fn fail_with(&self, status: u16, body: &str) {
        *self.failure.lock().unwrap() = Some((status, body.to_string()));
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_ref() {
            Some((status, body)) => Err(SheetError::remote(*status, body.clone())),
            None => Ok(()),
        }
    }
}

/// Metadata for a spreadsheet whose sheets get ids 100, 101, ... and carry
/// no sheet-level metadata
pub fn metadata_for(spreadsheet_id: &str, title: &str, sheets: &[(&str, u32, u32)]) -> SpreadsheetResource {
    SpreadsheetResource {
        spreadsheet_id: Some(spreadsheet_id.to_string()),
        properties: Some(SpreadsheetProperties {
            title: Some(title.to_string()),
        }),
        sheets: sheets
            .iter()
            .enumerate()
            .map(|(i, (name, rows, columns))| SheetResource {
                properties: SheetResourceProperties {
                    sheet_id: Some(100 + i as i64),
                    title: Some(name.to_string()),
                    index: Some(i as u32),
                    grid_properties: Some(GridProperties {
                        row_count: Some(*rows),
                        column_count: Some(*columns),
                        frozen_row_count: None,
                    }),
                },
                developer_metadata: Vec::new(),
            })
            .collect(),
        developer_metadata: Vec::new(),
    }
}

#[async_trait]
impl SheetsApi for FakeGoogle {
    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetResource> {
        self.record(Call::GetSpreadsheet(spreadsheet_id.to_string()))?;
        self.metadata
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SheetError::remote(404, "Requested entity was not found."))
    }

    async fn create_spreadsheet(&self, spreadsheet: &SpreadsheetResource) -> Result<SpreadsheetResource> {
        self.record(Call::CreateSpreadsheet(spreadsheet.clone()))?;
        let mut created = spreadsheet.clone();
        created.spreadsheet_id = Some("created-id".to_string());
        for (i, sheet) in created.sheets.iter_mut().enumerate() {
            sheet.properties.sheet_id.get_or_insert(100 + i as i64);
        }
        Ok(created)
    }

    async fn get_values(&self, _spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        self.record(Call::GetValues(range.to_string()))?;
        let values = self.values.lock().unwrap().get(range).cloned().unwrap_or_default();
        Ok(ValueRange::new(range, values))
    }

    async fn update_values(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        _input: ValueInputOption,
    ) -> Result<UpdateValuesResponse> {
        self.record(Call::UpdateValues {
            range: range.to_string(),
            values,
        })?;
        Ok(UpdateValuesResponse::default())
    }

    async fn batch_update_values(
        &self,
        _spreadsheet_id: &str,
        data: Vec<ValueRange>,
        _input: ValueInputOption,
    ) -> Result<BatchUpdateValuesResponse> {
        self.record(Call::BatchUpdateValues(data))?;
        Ok(BatchUpdateValuesResponse::default())
    }

    async fn append_values(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        _input: ValueInputOption,
    ) -> Result<AppendValuesResponse> {
        self.record(Call::AppendValues {
            range: range.to_string(),
            values,
        })?;
        Ok(AppendValuesResponse::default())
    }

    async fn batch_update(
        &self,
        _spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        self.record(Call::BatchUpdate(requests))?;
        Ok(BatchUpdateSpreadsheetResponse::default())
    }
}

#[async_trait]
impl DriveApi for FakeGoogle {
    async fn grant_permission(&self, file_id: &str, permission: &Permission) -> Result<()> {
        self.record(Call::GrantPermission {
            file_id: file_id.to_string(),
            permission: permission.clone(),
        })
    }
}
