//! Declarative spreadsheet builder backed by the Google Sheets API.
//!
//! Sheets are described as ordered columns, optionally grouped under merged
//! super-headers. The layout engine turns that description into A1 ranges,
//! header values and formatting/validation requests; the [`Spreadsheet`] and
//! [`Sheet`] aggregates submit them through the [`SheetsApi`]/[`DriveApi`]
//! collaborators.

pub mod config;
pub mod error;
pub mod layout;
pub mod schema;
pub mod service;
pub mod sheet;
pub mod spreadsheet;

pub use config::{DomainPermission, GridWindow, LayoutConfig, SheetsConfig};
pub use error::{Result, SheetError};
pub use layout::{Color, Request, SheetLayout, ValueRange};
pub use schema::{Column, ColumnGroup, DataValidation, GroupHeaderConfig, GroupSpan, SheetProperties, ValidationType};
pub use service::{DriveApi, GoogleAuth, GoogleServices, HttpDriveClient, HttpSheetsClient, SheetsApi};
pub use sheet::{RowRecord, Sheet, SpreadsheetContext};
pub use spreadsheet::{Spreadsheet, GROUPING_METADATA_KEY, VERSION_METADATA_KEY};
