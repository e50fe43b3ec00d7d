use serde_json::Value;

use super::range::{bounded_range, generate_range};
use super::requests::*;
use crate::config::LayoutConfig;
use crate::error::{Result, SheetError};
use crate::schema::{Column, GroupHeaderConfig, ValidationType};

const FORMAT_FIELDS: &str = "userEnteredFormat(backgroundColor,textFormat)";
const ALIGNMENT_FIELDS: &str = "userEnteredFormat.horizontalAlignment";

/// Pure projection of a sheet schema onto header values and batch requests.
///
/// Building twice from the same inputs yields identical output.
#[derive(Debug, Clone, Copy)]
pub struct SheetLayout<'a> {
    sheet_id: i64,
    columns: &'a [Column],
    groups: &'a GroupHeaderConfig,
    config: &'a LayoutConfig,
}

impl<'a> SheetLayout<'a> {
    pub fn new(
        sheet_id: i64,
        columns: &'a [Column],
        groups: &'a GroupHeaderConfig,
        config: &'a LayoutConfig,
    ) -> Self {
        SheetLayout {
            sheet_id,
            columns,
            groups,
            config,
        }
    }

    fn column_count(&self) -> u32 {
        self.columns.len() as u32
    }

    fn indexed_columns(&self) -> impl Iterator<Item = (u32, &'a Column)> {
        self.columns.iter().enumerate().map(|(i, c)| (i as u32, c))
    }

    /// Header cell values, one block per remote write.
    ///
    /// Without groups this is a single row of names at row 1. With groups,
    /// each group name is written at row 1 over its span and every column
    /// name goes on row 2; columns outside any group leave row 1 blank.
    pub fn header_values(&self) -> Result<Vec<ValueRange>> {
        if self.columns.is_empty() {
            return Err(SheetError::invalid_range("sheet has no columns"));
        }

        let names: Vec<Value> = self
            .columns
            .iter()
            .map(|c| Value::String(c.name.clone()))
            .collect();

        if !self.groups.enabled {
            let range = generate_range(self.column_count(), 1, 1)?;
            return Ok(vec![ValueRange::new(range, vec![names])]);
        }

        let mut blocks = Vec::with_capacity(self.groups.groups.len() + 1);
        for group in &self.groups.groups {
            let range = bounded_range(group.start as i64, group.end as i64 + 1, 0, 1)?;
            blocks.push(ValueRange::new(
                range,
                vec![vec![Value::String(group.name.clone())]],
            ));
        }

        let sub_header_row = self.groups.header_row_index() + 1;
        let range = generate_range(self.column_count(), sub_header_row, sub_header_row)?;
        blocks.push(ValueRange::new(range, vec![names]));

        Ok(blocks)
    }

    /// Range of the row holding individual column names
    pub fn header_range(&self) -> Result<String> {
        let row = self.groups.header_row_index() + 1;
        generate_range(self.column_count(), row, row)
    }

    /// Range covering `row_count` data rows below the headers
    pub fn data_range(&self, row_count: u32) -> Result<String> {
        if row_count == 0 {
            return Err(SheetError::invalid_range("row count must be positive"));
        }
        let first = self.groups.data_row_index() + 1;
        generate_range(self.column_count(), first + row_count - 1, first)
    }

    /// Notes attached to header cells
    pub fn header_notes(&self) -> Vec<Request> {
        let row = self.groups.header_row_index();
        self.indexed_columns()
            .filter_map(|(index, column)| {
                let note = column.note.as_ref()?;
                Some(Request::UpdateCells(UpdateCellsRequest {
                    range: GridRange::block(self.sheet_id, row, row + 1, index, index + 1),
                    rows: vec![RowData {
                        values: vec![CellData {
                            note: Some(note.clone()),
                            ..Default::default()
                        }],
                    }],
                    fields: "note".to_string(),
                }))
            })
            .collect()
    }

    /// Bold, colored first row. Emitted regardless of grouping.
    pub fn header_format(&self) -> Vec<Request> {
        vec![self.band(GridRange::rows(self.sheet_id, 0, 1), self.config.banding_palette[0])]
    }

    /// Group banding, alignment and merges, or the plain second-row band
    /// when grouping is disabled.
    pub fn banding(&self) -> Vec<Request> {
        if !self.groups.enabled {
            return vec![self.band(
                GridRange::rows(self.sheet_id, 1, 2),
                self.config.banding_palette[0],
            )];
        }

        let mut requests = Vec::with_capacity(self.groups.groups.len() * 3);
        for (index, group) in self.groups.groups.iter().enumerate() {
            let color = self.config.banding_palette[index % 2];
            let (start, end) = (group.start, group.end + 1);

            requests.push(self.band(GridRange::block(self.sheet_id, 0, 2, start, end), color));
            requests.push(Request::RepeatCell(RepeatCellRequest {
                range: GridRange::block(self.sheet_id, 0, 1, start, end),
                cell: CellData {
                    user_entered_format: Some(CellFormat {
                        horizontal_alignment: Some(HorizontalAlign::Center),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                fields: ALIGNMENT_FIELDS.to_string(),
            }));
            requests.push(Request::MergeCells(MergeCellsRequest {
                range: GridRange::block(self.sheet_id, 0, 1, start, end),
                merge_type: MergeType::MergeAll,
            }));
        }
        requests
    }

    /// Protected range plus gray styling for every protected column
    pub fn protections(&self) -> Vec<Request> {
        let first_data_row = self.groups.data_row_index();
        let mut requests = Vec::new();

        for (index, column) in self.indexed_columns().filter(|(_, c)| c.is_protected) {
            let range = GridRange::column_from(self.sheet_id, first_data_row, index);
            requests.push(Request::AddProtectedRange(AddProtectedRangeRequest {
                protected_range: ProtectedRange {
                    range: range.clone(),
                    description: format!("Protected column {}", column.name),
                    warning_only: false,
                    editors: Editors {
                        users: self.config.protected_range_editors.clone(),
                        domain_users_can_edit: false,
                    },
                },
            }));
            requests.push(Request::RepeatCell(RepeatCellRequest {
                range,
                cell: CellData {
                    user_entered_format: Some(CellFormat {
                        background_color: Some(self.config.protected_background),
                        text_format: Some(TextFormat { bold: false }),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                fields: FORMAT_FIELDS.to_string(),
            }));
        }
        requests
    }

    /// Dropdown validations over the data rows
    pub fn validations(&self) -> Vec<Request> {
        let first_data_row = self.groups.data_row_index();

        self.indexed_columns()
            .filter_map(|(index, column)| {
                let validation = column.validation.as_ref()?;
                let condition_type = match validation.validation_type {
                    ValidationType::OneOfList => ConditionType::OneOfList,
                };
                Some(Request::RepeatCell(RepeatCellRequest {
                    range: GridRange::column_from(self.sheet_id, first_data_row, index),
                    cell: CellData {
                        data_validation: Some(DataValidationRule {
                            condition: BooleanCondition {
                                condition_type,
                                values: validation
                                    .values
                                    .iter()
                                    .map(|v| ConditionValue {
                                        user_entered_value: v.clone(),
                                    })
                                    .collect(),
                            },
                            strict: true,
                            show_custom_ui: true,
                        }),
                        ..Default::default()
                    },
                    fields: "dataValidation".to_string(),
                }))
            })
            .collect()
    }

    /// Notes, header styling, banding and protections, in that order
    pub fn formatting(&self) -> Vec<Request> {
        let mut requests = self.header_notes();
        requests.extend(self.header_format());
        requests.extend(self.banding());
        requests.extend(self.protections());
        requests
    }

    /// Everything issued in one `batchUpdate`: formatting, then validations
    pub fn requests(&self) -> Vec<Request> {
        let mut requests = self.formatting();
        requests.extend(self.validations());
        requests
    }

    fn band(&self, range: GridRange, color: Color) -> Request {
        Request::RepeatCell(RepeatCellRequest {
            range,
            cell: CellData {
                user_entered_format: Some(CellFormat {
                    background_color: Some(color),
                    text_format: Some(TextFormat { bold: true }),
                    ..Default::default()
                }),
                ..Default::default()
            },
            fields: FORMAT_FIELDS.to_string(),
        })
    }
}
