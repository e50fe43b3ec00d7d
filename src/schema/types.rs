use serde::{Deserialize, Serialize};

/// Kind of constraint a validation descriptor applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationType {
    /// Value must be one of a fixed list of strings
    OneOfList,
}

/// Validation attached to a column's data cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidation {
    pub validation_type: ValidationType,
    pub values: Vec<String>,
}

impl DataValidation {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DataValidation {
            validation_type: ValidationType::OneOfList,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single column of a sheet.
///
/// Built by value: each `with_*` method consumes the column and returns the
/// configured copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub validation: Option<DataValidation>,
    pub note: Option<String>,
    pub is_protected: bool,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            validation: None,
            note: None,
            is_protected: false,
        }
    }

    pub fn with_validation(mut self, validation: DataValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn protected(mut self) -> Self {
        self.is_protected = true;
        self
    }
}

/// Columns sharing one merged super-header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnGroup {
    pub name: String,
    pub columns: Vec<Column>,
}

impl ColumnGroup {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        ColumnGroup {
            name: name.into(),
            columns,
        }
    }
}

/// Grid capacity of a remote sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetProperties {
    pub row_count: u32,
    pub column_count: u32,
}

/// Column span of one group, zero-based and inclusive on both ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpan {
    pub name: String,
    pub start: u32,
    pub end: u32,
}

/// Group-header state of a sheet. Once enabled it stays enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupHeaderConfig {
    pub enabled: bool,
    pub groups: Vec<GroupSpan>,
}

impl GroupHeaderConfig {
    pub(crate) fn enable(&mut self) {
        self.enabled = true;
    }

    pub(crate) fn push(&mut self, span: GroupSpan) {
        self.enabled = true;
        self.groups.push(span);
    }

    /// Zero-based index of the row holding individual column names
    pub fn header_row_index(&self) -> u32 {
        if self.enabled {
            1
        } else {
            0
        }
    }

    /// Zero-based index of the first data row
    pub fn data_row_index(&self) -> u32 {
        self.header_row_index() + 1
    }
}
