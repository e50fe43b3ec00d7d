//! Remote collaborators: the spreadsheet service and the file-sharing service.
//!
//! The aggregates only talk to the `SheetsApi`/`DriveApi` traits, so any
//! transport can stand in for the HTTP clients.

pub mod auth;
pub mod http_client;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::SheetsConfig;
use crate::error::Result;
use crate::layout::requests::Request;

pub use auth::GoogleAuth;
pub use http_client::{HttpDriveClient, HttpSheetsClient};
pub use types::*;

/// Spreadsheet service operations
#[async_trait]
pub trait SheetsApi: Send + Sync {
    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetResource>;

    async fn create_spreadsheet(&self, spreadsheet: &SpreadsheetResource) -> Result<SpreadsheetResource>;

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange>;

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse>;

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        data: Vec<ValueRange>,
        input: ValueInputOption,
    ) -> Result<BatchUpdateValuesResponse>;

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
    ) -> Result<AppendValuesResponse>;

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateSpreadsheetResponse>;
}

/// File-sharing service operations
#[async_trait]
pub trait DriveApi: Send + Sync {
    async fn grant_permission(&self, file_id: &str, permission: &Permission) -> Result<()>;
}

/// Both remote services, shared by a spreadsheet and its sheet contexts
#[derive(Clone)]
pub struct GoogleServices {
    pub sheets: Arc<dyn SheetsApi>,
    pub drive: Arc<dyn DriveApi>,
}

impl GoogleServices {
    pub fn new(sheets: Arc<dyn SheetsApi>, drive: Arc<dyn DriveApi>) -> Self {
        GoogleServices { sheets, drive }
    }

    /// HTTP clients for both services, signed with the same credential
    pub fn http(auth: &GoogleAuth, config: &SheetsConfig) -> Result<Self> {
        Ok(GoogleServices {
            sheets: Arc::new(HttpSheetsClient::new(auth, config)?),
            drive: Arc::new(HttpDriveClient::new(auth, config)?),
        })
    }
}

impl std::fmt::Debug for GoogleServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleServices").finish_non_exhaustive()
    }
}
