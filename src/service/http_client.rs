use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::auth::GoogleAuth;
use super::types::*;
use super::{DriveApi, SheetsApi};
use crate::config::SheetsConfig;
use crate::error::{Result, SheetError};
use crate::layout::requests::Request;

fn build_client(config: &SheetsConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?)
}

fn parse_base(base_url: &str) -> Result<Url> {
    Url::parse(base_url.trim_end_matches('/'))
        .map_err(|e| SheetError::Config(format!("Invalid base URL '{}': {}", base_url, e)))
}

/// Append percent-encoded path segments to a base URL
fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SheetError::Config(format!("Base URL '{}' cannot carry a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Send with the bearer token and decode a JSON body, mapping non-2xx
/// answers to `RemoteServiceFailure` with the body kept verbatim.
async fn send_json<T: DeserializeOwned>(auth: &GoogleAuth, request: RequestBuilder) -> Result<T> {
    let response = request
        .header("Authorization", auth.authorization_header())
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SheetError::remote(status.as_u16(), body));
    }

    Ok(response.json::<T>().await?)
}

/// Sheets v4 REST client
#[derive(Debug)]
pub struct HttpSheetsClient {
    client: reqwest::Client,
    base_url: Url,
    auth: GoogleAuth,
}

impl HttpSheetsClient {
    pub fn new(auth: &GoogleAuth, config: &SheetsConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: parse_base(&config.sheets_base_url)?,
            auth: auth.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = vec!["spreadsheets"];
        all.extend_from_slice(segments);
        join_segments(&self.base_url, &all)
    }
}

#[async_trait]
impl SheetsApi for HttpSheetsClient {
    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetResource> {
        debug!(spreadsheet_id, "fetching spreadsheet metadata");
        let url = self.url(&[spreadsheet_id])?;
        send_json(
            &self.auth,
            self.client.get(url).query(&[("includeGridData", "false")]),
        )
        .await
    }

    async fn create_spreadsheet(&self, spreadsheet: &SpreadsheetResource) -> Result<SpreadsheetResource> {
        debug!(sheets = spreadsheet.sheets.len(), "creating spreadsheet");
        let url = self.url(&[])?;
        send_json(&self.auth, self.client.post(url).json(spreadsheet)).await
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        debug!(spreadsheet_id, range, "reading values");
        let url = self.url(&[spreadsheet_id, "values", range])?;
        send_json(&self.auth, self.client.get(url)).await
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse> {
        debug!(spreadsheet_id, range, rows = values.len(), "updating values");
        let url = self.url(&[spreadsheet_id, "values", range])?;
        let body = ValueRange::new(range, values);
        send_json(
            &self.auth,
            self.client
                .put(url)
                .query(&[("valueInputOption", input.as_str())])
                .json(&body),
        )
        .await
    }

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        data: Vec<ValueRange>,
        input: ValueInputOption,
    ) -> Result<BatchUpdateValuesResponse> {
        debug!(spreadsheet_id, blocks = data.len(), "batch updating values");
        let url = self.url(&[spreadsheet_id, "values:batchUpdate"])?;
        let body = BatchUpdateValuesRequest {
            value_input_option: input,
            data: &data,
        };
        send_json(&self.auth, self.client.post(url).json(&body)).await
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
    ) -> Result<AppendValuesResponse> {
        debug!(spreadsheet_id, range, rows = values.len(), "appending values");
        let append = format!("{}:append", range);
        let url = self.url(&[spreadsheet_id, "values", append.as_str()])?;
        let body = ValueRange::new(range, values);
        send_json(
            &self.auth,
            self.client
                .post(url)
                .query(&[
                    ("valueInputOption", input.as_str()),
                    ("insertDataOption", "INSERT_ROWS"),
                ])
                .json(&body),
        )
        .await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        debug!(spreadsheet_id, requests = requests.len(), "batch update");
        let target = format!("{}:batchUpdate", spreadsheet_id);
        let url = self.url(&[target.as_str()])?;
        let body = BatchUpdateRequest {
            requests: &requests,
        };
        send_json(&self.auth, self.client.post(url).json(&body)).await
    }
}

/// Drive v3 REST client, used only for sharing
#[derive(Debug)]
pub struct HttpDriveClient {
    client: reqwest::Client,
    base_url: Url,
    auth: GoogleAuth,
}

impl HttpDriveClient {
    pub fn new(auth: &GoogleAuth, config: &SheetsConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: parse_base(&config.drive_base_url)?,
            auth: auth.clone(),
        })
    }
}

#[async_trait]
impl DriveApi for HttpDriveClient {
    async fn grant_permission(&self, file_id: &str, permission: &Permission) -> Result<()> {
        debug!(file_id, role = %permission.role, "granting permission");
        let url = join_segments(&self.base_url, &["files", file_id, "permissions"])?;
        let _: Value = send_json(
            &self.auth,
            self.client
                .post(url)
                .query(&[("fields", "id")])
                .json(permission),
        )
        .await?;
        Ok(())
    }
}
