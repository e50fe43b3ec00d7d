use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SheetsConfig;
use crate::error::{Result, SheetError};
use crate::layout::{generate_range, qualify, SheetLayout};
use crate::schema::{Column, ColumnGroup, GroupHeaderConfig, GroupSpan, SheetProperties};
use crate::service::{GoogleServices, ValueInputOption, ValueRange};

/// One data row keyed by column name
pub type RowRecord = IndexMap<String, Value>;

static EMPTY_CELL: Value = Value::Null;

/// Handle on a bound spreadsheet passed to sheet operations.
///
/// Carries the spreadsheet's remote id and services without owning the
/// spreadsheet itself.
#[derive(Debug, Clone)]
pub struct SpreadsheetContext {
    spreadsheet_id: String,
    services: GoogleServices,
    config: Arc<SheetsConfig>,
}

impl SpreadsheetContext {
    pub fn new(spreadsheet_id: impl Into<String>, services: GoogleServices, config: Arc<SheetsConfig>) -> Self {
        SpreadsheetContext {
            spreadsheet_id: spreadsheet_id.into(),
            services,
            config,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }
}

/// A sheet's schema, remote binding and cached values
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    sheet_id: Option<i64>,
    columns: Vec<Column>,
    headers: Vec<String>,
    /// `None` until data is loaded or written
    rows: Option<Vec<Vec<Value>>>,
    group_header: GroupHeaderConfig,
    properties: Option<SheetProperties>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            sheet_id: None,
            columns: Vec::new(),
            headers: Vec::new(),
            rows: None,
            group_header: GroupHeaderConfig::default(),
            properties: None,
        }
    }

    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.add_columns(columns);
        self
    }

    pub fn with_column_groups(mut self, groups: impl IntoIterator<Item = ColumnGroup>) -> Self {
        self.add_column_groups(groups);
        self
    }

    pub fn with_properties(mut self, properties: SheetProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn add_column(&mut self, column: Column) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn add_columns(&mut self, columns: impl IntoIterator<Item = Column>) -> &mut Self {
        self.columns.extend(columns);
        self
    }

    /// Append the group's columns and record their span under the group name.
    /// Enables group headers for the whole sheet. Empty groups are ignored.
    pub fn add_column_group(&mut self, group: ColumnGroup) -> &mut Self {
        if group.columns.is_empty() {
            warn!(sheet = %self.name, group = %group.name, "ignoring empty column group");
            return self;
        }

        let start = self.columns.len() as u32;
        self.columns.extend(group.columns);
        let end = self.columns.len() as u32 - 1;
        self.group_header.push(GroupSpan {
            name: group.name,
            start,
            end,
        });
        self
    }

    pub fn add_column_groups(&mut self, groups: impl IntoIterator<Item = ColumnGroup>) -> &mut Self {
        for group in groups {
            self.add_column_group(group);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheet_id(&self) -> Option<i64> {
        self.sheet_id
    }

    pub fn is_bound(&self) -> bool {
        self.sheet_id.is_some()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Header names as last written or loaded
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Cached rows; empty when nothing was loaded
    pub fn rows(&self) -> &[Vec<Value>] {
        self.rows.as_deref().unwrap_or_default()
    }

    pub fn group_header(&self) -> &GroupHeaderConfig {
        &self.group_header
    }

    pub fn properties(&self) -> Option<SheetProperties> {
        self.properties
    }

    pub(crate) fn set_properties(&mut self, properties: SheetProperties) {
        self.properties = Some(properties);
    }

    pub(crate) fn enable_group_header(&mut self) {
        self.group_header.enable();
    }

    /// Record the remote id. A bound sheet keeps its first id.
    pub(crate) fn bind(&mut self, sheet_id: i64) {
        match self.sheet_id {
            None => {
                debug!(sheet = %self.name, sheet_id, "sheet bound");
                self.sheet_id = Some(sheet_id);
            }
            Some(existing) if existing != sheet_id => {
                warn!(sheet = %self.name, existing, ignored = sheet_id, "sheet already bound");
            }
            Some(_) => {}
        }
    }

    fn require_id(&self) -> Result<i64> {
        self.sheet_id.ok_or_else(|| {
            SheetError::precondition(format!("sheet identifier not available for '{}'", self.name))
        })
    }

    /// Layout of this sheet; requires a bound sheet
    pub fn layout<'a>(&'a self, config: &'a SheetsConfig) -> Result<SheetLayout<'a>> {
        let sheet_id = self.require_id()?;
        Ok(SheetLayout::new(sheet_id, &self.columns, &self.group_header, &config.layout))
    }

    /// Names used as row keys: loaded headers, or the schema when nothing was loaded
    fn field_names(&self) -> Vec<&str> {
        if self.headers.is_empty() {
            self.column_names()
        } else {
            self.headers.iter().map(String::as_str).collect()
        }
    }

    fn read_width(&self, config: &SheetsConfig) -> u32 {
        self.properties
            .map(|p| p.column_count)
            .filter(|&c| c > 0)
            .unwrap_or(config.default_window.columns)
    }

    fn read_height(&self, config: &SheetsConfig) -> u32 {
        self.properties
            .map(|p| p.row_count)
            .unwrap_or(config.default_window.rows)
    }

    /// Write the header rows
    pub async fn add_headers(&mut self, ctx: &SpreadsheetContext) -> Result<()> {
        let layout = self.layout(ctx.config())?;
        if self.columns.is_empty() {
            return Err(SheetError::precondition(format!("sheet '{}' has no columns", self.name)));
        }

        let blocks = layout.header_values()?;
        let api = &ctx.services.sheets;
        if self.group_header.enabled {
            let data: Vec<ValueRange> = blocks
                .into_iter()
                .map(|block| ValueRange {
                    range: block.range.map(|r| qualify(&self.name, &r)),
                    ..block
                })
                .collect();
            api.batch_update_values(ctx.spreadsheet_id(), data, ValueInputOption::Raw)
                .await?;
        } else {
            for block in blocks {
                let range = qualify(&self.name, block.range.as_deref().unwrap_or_default());
                api.update_values(ctx.spreadsheet_id(), &range, block.values, ValueInputOption::Raw)
                    .await?;
            }
        }

        self.headers = self.columns.iter().map(|c| c.name.clone()).collect();
        info!(sheet = %self.name, columns = self.headers.len(), "headers added");
        Ok(())
    }

    /// Apply header styling, protections and validations in one batch
    pub async fn add_formatting_and_validations(&self, ctx: &SpreadsheetContext) -> Result<()> {
        let requests = self.layout(ctx.config())?.requests();
        debug!(sheet = %self.name, requests = requests.len(), "submitting formatting");
        ctx.services
            .sheets
            .batch_update(ctx.spreadsheet_id(), requests)
            .await?;
        info!(sheet = %self.name, "formatting and validations added");
        Ok(())
    }

    /// Overwrite the data region with `rows`, starting at the first data row
    pub async fn add_data(&mut self, ctx: &SpreadsheetContext, rows: Vec<Vec<Value>>) -> Result<()> {
        let layout = self.layout(ctx.config())?;
        if rows.is_empty() {
            return Ok(());
        }
        let width = self.columns.len();
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() > width) {
            return Err(SheetError::invalid_range(format!(
                "row {} has {} values but sheet '{}' has {} columns",
                index,
                row.len(),
                self.name,
                width
            )));
        }

        let range = qualify(&self.name, &layout.data_range(rows.len() as u32)?);
        ctx.services
            .sheets
            .update_values(ctx.spreadsheet_id(), &range, rows.clone(), ValueInputOption::Raw)
            .await?;

        info!(sheet = %self.name, rows = rows.len(), "data written");
        self.rows = Some(rows);
        Ok(())
    }

    /// Append keyed rows after the existing data.
    ///
    /// Every row is checked against the column names before anything is sent.
    pub async fn append_rows(&mut self, ctx: &SpreadsheetContext, rows: &[RowRecord]) -> Result<()> {
        let layout = self.layout(ctx.config())?;
        let names = self.column_names();

        for (index, row) in rows.iter().enumerate() {
            let unknown: Vec<String> = row
                .keys()
                .filter(|key| !names.contains(&key.as_str()))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(SheetError::UnknownColumn {
                    row: index,
                    columns: unknown,
                });
            }
        }
        if rows.is_empty() {
            return Ok(());
        }

        let values: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                names
                    .iter()
                    .map(|name| row.get(*name).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        let range = qualify(&self.name, &layout.header_range()?);
        ctx.services
            .sheets
            .append_values(ctx.spreadsheet_id(), &range, values.clone(), ValueInputOption::Raw)
            .await?;

        info!(sheet = %self.name, rows = values.len(), "rows appended");
        self.rows.get_or_insert_with(Vec::new).extend(values);
        Ok(())
    }

    /// Read the column-name row into the header cache.
    ///
    /// A sheet without a local schema rebuilds its columns from the result.
    pub async fn load_header(&mut self, ctx: &SpreadsheetContext) -> Result<()> {
        let row = self.group_header.header_row_index() + 1;
        let range = qualify(&self.name, &generate_range(self.read_width(ctx.config()), row, row)?);
        let response = ctx.services.sheets.get_values(ctx.spreadsheet_id(), &range).await?;

        self.headers = response
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|value| match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect();

        if self.columns.is_empty() {
            self.columns = self.headers.iter().map(Column::new).collect();
        }
        debug!(sheet = %self.name, headers = self.headers.len(), "header loaded");
        Ok(())
    }

    /// Read every data row within the sheet's capacity into the row cache
    pub async fn load_data(&mut self, ctx: &SpreadsheetContext) -> Result<()> {
        let first = self.group_header.data_row_index() + 1;
        let last = self.read_height(ctx.config());
        if last < first {
            self.rows = Some(Vec::new());
            return Ok(());
        }

        let range = qualify(
            &self.name,
            &generate_range(self.read_width(ctx.config()), last, first)?,
        );
        let response = ctx.services.sheets.get_values(ctx.spreadsheet_id(), &range).await?;
        debug!(sheet = %self.name, rows = response.values.len(), "data loaded");
        self.rows = Some(response.values);
        Ok(())
    }

    fn loaded_rows(&self, index: usize) -> Result<&[Vec<Value>]> {
        self.rows
            .as_deref()
            .ok_or(SheetError::RowOutOfBounds { index, len: 0 })
    }

    /// Cached row by zero-based data-row index
    pub fn get_row(&self, index: usize) -> Result<&[Value]> {
        let rows = self.loaded_rows(index)?;
        rows.get(index)
            .map(Vec::as_slice)
            .ok_or(SheetError::RowOutOfBounds {
                index,
                len: rows.len(),
            })
    }

    /// Cached cell; cells trimmed off the end of a row read as null
    pub fn get_cell(&self, row: usize, column: usize) -> Result<&Value> {
        let values = self.get_row(row)?;
        let width = self.field_names().len().max(values.len());
        if column >= width {
            return Err(SheetError::invalid_range(format!(
                "column {} is outside sheet '{}' ({} columns)",
                column, self.name, width
            )));
        }
        Ok(values.get(column).unwrap_or(&EMPTY_CELL))
    }

    /// Cached row keyed by column name
    pub fn get_formatted_row(&self, index: usize) -> Result<RowRecord> {
        let values = self.get_row(index)?;
        Ok(self.format_row(values))
    }

    /// Every cached row keyed by column name; fails before any load
    pub fn get_formatted_data(&self) -> Result<Vec<RowRecord>> {
        let rows = self.loaded_rows(0)?;
        Ok(rows.iter().map(|row| self.format_row(row)).collect())
    }

    fn format_row(&self, values: &[Value]) -> RowRecord {
        self.field_names()
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                (
                    name.to_string(),
                    values.get(i).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataValidation;
    use crate::service::fake::{Call, FakeGoogle};
    use crate::layout::Request;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context(fake: &Arc<FakeGoogle>) -> SpreadsheetContext {
        SpreadsheetContext::new("sheet-doc", fake.services(), Arc::new(SheetsConfig::default()))
    }

    fn contracts() -> Sheet {
        Sheet::new("Contracts").with_columns([
            Column::new("name"),
            Column::new("status").with_validation(DataValidation::one_of(["ACTIVE", "INACTIVE"])),
        ])
    }

    fn record(pairs: &[(&str, Value)]) -> RowRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_add_column_group_records_span() {
        let mut sheet = Sheet::new("Lanes");
        sheet
            .add_column(Column::new("id"))
            .add_column_group(ColumnGroup::new(
                "Route",
                vec![Column::new("origin"), Column::new("destination")],
            ))
            .add_column_group(ColumnGroup::new("Empty", vec![]));

        let config = sheet.group_header();
        assert!(config.enabled);
        assert_eq!(
            config.groups,
            vec![GroupSpan {
                name: "Route".to_string(),
                start: 1,
                end: 2
            }]
        );
        assert_eq!(sheet.column_names(), vec!["id", "origin", "destination"]);
    }

    #[test]
    fn test_bind_happens_once() {
        let mut sheet = Sheet::new("A");
        assert!(!sheet.is_bound());
        sheet.bind(4);
        sheet.bind(9);
        assert_eq!(sheet.sheet_id(), Some(4));
    }

    #[tokio::test]
    async fn test_unbound_sheet_rejects_remote_operations() {
        let fake = FakeGoogle::new();
        let ctx = context(&fake);
        let mut sheet = contracts();

        let results = [
            sheet.add_headers(&ctx).await,
            sheet.add_formatting_and_validations(&ctx).await,
            sheet.add_data(&ctx, vec![vec![json!("a")]]).await,
            sheet.append_rows(&ctx, &[record(&[("name", json!("a"))])]).await,
        ];
        for result in results {
            assert!(matches!(result, Err(SheetError::PreconditionFailed(_))));
        }
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_headers_and_formatting_for_plain_sheet() {
        let fake = FakeGoogle::new();
        let ctx = context(&fake);
        let mut sheet = contracts();
        sheet.bind(0);

        sheet.add_headers(&ctx).await.unwrap();
        sheet.add_formatting_and_validations(&ctx).await.unwrap();

        let calls = fake.calls();
        assert_eq!(
            calls[0],
            Call::UpdateValues {
                range: "'Contracts'!A1:B1".to_string(),
                values: vec![vec![json!("name"), json!("status")]],
            }
        );
        match &calls[1] {
            Call::BatchUpdate(requests) => {
                let validations: Vec<&Request> = requests.iter().filter(|r| r.is_validation()).collect();
                assert_eq!(validations.len(), 1);
                assert_eq!(validations[0].range().start_column_index, Some(1));
                assert_eq!(validations[0].range().start_row_index, Some(1));
            }
            other => panic!("unexpected call {:?}", other),
        }
        assert_eq!(sheet.headers(), &["name".to_string(), "status".to_string()]);
    }

    #[tokio::test]
    async fn test_grouped_headers_use_batch_write() {
        let fake = FakeGoogle::new();
        let ctx = context(&fake);
        let mut sheet = Sheet::new("Lanes").with_column_groups([ColumnGroup::new(
            "Route",
            vec![Column::new("origin"), Column::new("destination")],
        )]);
        sheet.bind(3);

        sheet.add_headers(&ctx).await.unwrap();

        match &fake.calls()[0] {
            Call::BatchUpdateValues(data) => {
                let ranges: Vec<_> = data.iter().map(|d| d.range.clone().unwrap()).collect();
                assert_eq!(ranges, vec!["'Lanes'!A1:B1", "'Lanes'!A2:B2"]);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_append_rows_rejects_unknown_columns_without_writing() {
        let fake = FakeGoogle::new();
        let ctx = context(&fake);
        let mut sheet = contracts();
        sheet.bind(0);

        let rows = vec![
            record(&[("name", json!("ok"))]),
            record(&[("name", json!("x")), ("colour", json!("red"))]),
        ];
        let err = sheet.append_rows(&ctx, &rows).await.unwrap_err();

        match err {
            SheetError::UnknownColumn { row, columns } => {
                assert_eq!(row, 1);
                assert_eq!(columns, vec!["colour"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(fake.call_count(), 0);
        assert!(sheet.rows().is_empty());
    }

    #[tokio::test]
    async fn test_append_rows_projects_in_column_order() {
        let fake = FakeGoogle::new();
        let ctx = context(&fake);
        let mut sheet = contracts();
        sheet.bind(0);

        let rows = vec![
            record(&[("status", json!("ACTIVE")), ("name", json!("Acme"))]),
            record(&[("name", json!("Globex"))]),
        ];
        sheet.append_rows(&ctx, &rows).await.unwrap();

        assert_eq!(
            fake.calls(),
            vec![Call::AppendValues {
                range: "'Contracts'!A1:B1".to_string(),
                values: vec![
                    vec![json!("Acme"), json!("ACTIVE")],
                    vec![json!("Globex"), Value::Null],
                ],
            }]
        );
        assert_eq!(sheet.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_add_data_writes_below_header() {
        let fake = FakeGoogle::new();
        let ctx = context(&fake);
        let mut sheet = contracts();
        sheet.bind(0);

        sheet
            .add_data(&ctx, vec![vec![json!("Acme"), json!("ACTIVE")], vec![json!("Globex")]])
            .await
            .unwrap();
        assert_eq!(
            fake.calls()[0],
            Call::UpdateValues {
                range: "'Contracts'!A2:B3".to_string(),
                values: vec![vec![json!("Acme"), json!("ACTIVE")], vec![json!("Globex")]],
            }
        );

        let too_wide = sheet
            .add_data(&ctx, vec![vec![json!(1), json!(2), json!(3)]])
            .await;
        assert!(matches!(too_wide, Err(SheetError::InvalidRange(_))));
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_load_and_read_cache() {
        let fake = FakeGoogle::new();
        let ctx = context(&fake);
        fake.set_values("'Imported'!A1:C1", vec![vec![json!("id"), json!("carrier"), json!("price")]]);
        fake.set_values(
            "'Imported'!A2:C4",
            vec![vec![json!("1"), json!("DHL"), json!("10")], vec![json!("2"), json!("UPS")]],
        );

        let mut sheet = Sheet::new("Imported").with_properties(SheetProperties {
            row_count: 4,
            column_count: 3,
        });
        assert!(matches!(sheet.get_row(0), Err(SheetError::RowOutOfBounds { .. })));

        sheet.load_header(&ctx).await.unwrap();
        sheet.load_data(&ctx).await.unwrap();

        assert_eq!(sheet.column_names(), vec!["id", "carrier", "price"]);
        assert_eq!(sheet.get_row(1).unwrap(), &[json!("2"), json!("UPS")]);
        assert_eq!(sheet.get_cell(1, 2).unwrap(), &Value::Null);
        assert!(sheet.get_cell(1, 3).is_err());

        let formatted = sheet.get_formatted_row(0).unwrap();
        assert_eq!(formatted.get("carrier"), Some(&json!("DHL")));
        let all = sheet.get_formatted_data().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].get("price"), Some(&Value::Null));
        assert!(matches!(sheet.get_row(2), Err(SheetError::RowOutOfBounds { index: 2, len: 2 })));
    }

    #[tokio::test]
    async fn test_formatted_data_requires_a_load() {
        let fake = FakeGoogle::new();
        let ctx = context(&fake);
        let mut sheet = contracts().with_properties(SheetProperties {
            row_count: 10,
            column_count: 2,
        });

        assert!(matches!(
            sheet.get_formatted_data(),
            Err(SheetError::RowOutOfBounds { index: 0, len: 0 })
        ));

        sheet.load_data(&ctx).await.unwrap();
        assert_eq!(sheet.get_formatted_data().unwrap(), Vec::<RowRecord>::new());
        assert_eq!(fake.calls(), vec![Call::GetValues("'Contracts'!A2:B10".to_string())]);
    }

    #[tokio::test]
    async fn test_load_uses_default_window_when_capacity_unknown() {
        let fake = FakeGoogle::new();
        let ctx = context(&fake);
        let mut sheet = Sheet::new("Unknown");

        sheet.load_header(&ctx).await.unwrap();
        sheet.load_data(&ctx).await.unwrap();

        assert_eq!(
            fake.calls(),
            vec![
                Call::GetValues("'Unknown'!A1:Z1".to_string()),
                Call::GetValues("'Unknown'!A2:Z1000".to_string()),
            ]
        );
    }
}
