use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SheetsConfig;
use crate::error::{Result, SheetError};
use crate::schema::SheetProperties;
use crate::service::{
    DeveloperMetadata, GoogleServices, GridProperties, Permission, SheetResource,
    SheetResourceProperties, SpreadsheetProperties, SpreadsheetResource,
};
use crate::sheet::{Sheet, SpreadsheetContext};

/// Developer metadata key holding the spreadsheet version string
pub const VERSION_METADATA_KEY: &str = "sheetBuilderVersion";
/// Developer metadata key flagging group headers (`"true"`/`"false"`).
/// Written once per sheet and once for the whole document.
pub const GROUPING_METADATA_KEY: &str = "groupHeaderEnabled";

/// An ordered collection of sheets backed by one remote document
#[derive(Debug)]
pub struct Spreadsheet {
    title: String,
    version: String,
    spreadsheet_id: Option<String>,
    sheets: Vec<Sheet>,
    group_header_enabled: bool,
    services: GoogleServices,
    config: Arc<SheetsConfig>,
}

impl Spreadsheet {
    pub fn new(title: impl Into<String>, services: GoogleServices, config: SheetsConfig) -> Self {
        Spreadsheet {
            title: title.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            spreadsheet_id: None,
            sheets: Vec::new(),
            group_header_enabled: false,
            services,
            config: Arc::new(config),
        }
    }

    /// Title made of `prefix` and the current UTC time, e.g. `tcm-2024-01-30T10:00:00`
    pub fn timestamped_title(prefix: &str) -> String {
        format!("{}-{}", prefix, Utc::now().format("%Y-%m-%dT%H:%M:%S"))
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id.as_deref()
    }

    pub fn is_created(&self) -> bool {
        self.spreadsheet_id.is_some()
    }

    /// Whether any sheet carries group headers
    pub fn group_header_enabled(&self) -> bool {
        self.group_header_enabled || self.sheets.iter().any(|s| s.group_header().enabled)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Register an empty sheet and return it for configuration
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Result<&mut Sheet> {
        self.push_sheet(Sheet::new(name))
    }

    /// Register a configured sheet. Names are unique within a spreadsheet.
    pub fn push_sheet(&mut self, sheet: Sheet) -> Result<&mut Sheet> {
        if self.sheet(sheet.name()).is_some() {
            return Err(SheetError::precondition(format!(
                "sheet '{}' already exists",
                sheet.name()
            )));
        }
        self.sheets.push(sheet);
        let last = self.sheets.len() - 1;
        Ok(&mut self.sheets[last])
    }

    /// Handle for sheet operations; requires a created or loaded spreadsheet
    pub fn context(&self) -> Result<SpreadsheetContext> {
        let id = self
            .spreadsheet_id
            .as_ref()
            .ok_or_else(|| SheetError::precondition("spreadsheet identifier not available"))?;
        Ok(SpreadsheetContext::new(
            id.clone(),
            self.services.clone(),
            self.config.clone(),
        ))
    }

    fn creation_payload(&self) -> SpreadsheetResource {
        let window = self.config.default_window;
        let sheets = self
            .sheets
            .iter()
            .enumerate()
            .map(|(index, sheet)| {
                let properties = sheet.properties();
                let columns = properties
                    .map(|p| p.column_count)
                    .unwrap_or(window.columns)
                    .max(sheet.columns().len() as u32);
                let sheet_id = index as i64;
                SheetResource {
                    properties: SheetResourceProperties {
                        sheet_id: Some(sheet_id),
                        title: Some(sheet.name().to_string()),
                        index: Some(index as u32),
                        grid_properties: Some(GridProperties {
                            row_count: Some(properties.map(|p| p.row_count).unwrap_or(window.rows)),
                            column_count: Some(columns),
                            frozen_row_count: Some(sheet.group_header().data_row_index()),
                        }),
                    },
                    developer_metadata: vec![DeveloperMetadata::sheet(
                        sheet_id,
                        GROUPING_METADATA_KEY,
                        sheet.group_header().enabled.to_string(),
                    )],
                }
            })
            .collect();

        SpreadsheetResource {
            spreadsheet_id: None,
            properties: Some(SpreadsheetProperties {
                title: Some(self.title.clone()),
            }),
            sheets,
            developer_metadata: vec![
                DeveloperMetadata::spreadsheet(VERSION_METADATA_KEY, self.version.clone()),
                DeveloperMetadata::spreadsheet(
                    GROUPING_METADATA_KEY,
                    self.group_header_enabled().to_string(),
                ),
            ],
        }
    }

    /// Bind local sheets to remote sheet ids by position.
    ///
    /// The remote listing is assumed to be in submission order; title
    /// mismatches are logged, not corrected.
    fn bind_positionally(&mut self, remote: &[SheetResource]) {
        if remote.len() != self.sheets.len() {
            warn!(
                local = self.sheets.len(),
                remote = remote.len(),
                "sheet count differs from remote document"
            );
        }

        for (sheet, resource) in self.sheets.iter_mut().zip(remote) {
            let props = &resource.properties;
            if props.title.as_deref() != Some(sheet.name()) {
                warn!(
                    local = sheet.name(),
                    remote = ?props.title,
                    "remote sheet title does not match local sheet at the same position"
                );
            }
            if let Some(id) = props.sheet_id {
                sheet.bind(id);
            }
            if sheet.properties().is_none() {
                if let Some(grid) = &props.grid_properties {
                    sheet.set_properties(SheetProperties {
                        row_count: grid.row_count.unwrap_or(0),
                        column_count: grid.column_count.unwrap_or(0),
                    });
                }
            }
        }
    }

    /// Create the remote document, share it, and initialize the first sheet.
    ///
    /// Requires `SheetsConfig::sharing`. Further sheets are initialized with
    /// [`Spreadsheet::initialize_sheet`].
    pub async fn create(&mut self) -> Result<()> {
        if self.sheets.is_empty() {
            return Err(SheetError::precondition("at least one sheet required"));
        }
        let sharing = self
            .config
            .sharing
            .clone()
            .ok_or_else(|| SheetError::precondition("no domain configured for sharing the spreadsheet"))?;
        if let Some(id) = &self.spreadsheet_id {
            return Err(SheetError::precondition(format!("spreadsheet already bound to {}", id)));
        }

        let payload = self.creation_payload();
        let created = self.services.sheets.create_spreadsheet(&payload).await?;
        let id = created
            .spreadsheet_id
            .clone()
            .ok_or_else(|| SheetError::invalid_response("created spreadsheet has no id"))?;
        info!(spreadsheet_id = %id, title = %self.title, "spreadsheet created");
        self.spreadsheet_id = Some(id.clone());

        let permission = Permission::domain(sharing.domain.clone(), sharing.role.clone());
        self.services.drive.grant_permission(&id, &permission).await?;
        info!(spreadsheet_id = %id, domain = %sharing.domain, role = %sharing.role, "permission granted");

        self.bind_positionally(&created.sheets);

        let first = self.sheets[0].name().to_string();
        self.initialize_sheet(&first).await
    }

    /// Write headers and formatting for one sheet, binding sheet ids from
    /// remote metadata first if this sheet is still unbound.
    pub async fn initialize_sheet(&mut self, name: &str) -> Result<()> {
        let ctx = self.context()?;
        let index = self
            .sheets
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| SheetError::precondition(format!("sheet '{}' is not registered", name)))?;

        if !self.sheets[index].is_bound() {
            self.resolve_sheet_ids().await?;
        }

        let sheet = &mut self.sheets[index];
        sheet.add_headers(&ctx).await?;
        sheet.add_formatting_and_validations(&ctx).await
    }

    /// Fetch metadata once and bind every unbound sheet
    async fn resolve_sheet_ids(&mut self) -> Result<()> {
        if self.sheets.iter().all(Sheet::is_bound) {
            return Ok(());
        }
        let ctx = self.context()?;
        debug!(spreadsheet_id = ctx.spreadsheet_id(), "resolving sheet ids");
        let metadata = self.services.sheets.get_spreadsheet(ctx.spreadsheet_id()).await?;
        self.bind_positionally(&metadata.sheets);
        Ok(())
    }

    /// Bind to an existing document and rebuild its sheets from remote
    /// metadata, then load every sheet's header row concurrently.
    ///
    /// Locally registered sheets with a matching title keep their schema.
    /// Each sheet's grouping comes from its own metadata, falling back to the
    /// document-level flag for sheets that carry none.
    pub async fn load_properties(&mut self, spreadsheet_id: &str) -> Result<()> {
        let metadata = match self.services.sheets.get_spreadsheet(spreadsheet_id).await {
            Ok(metadata) => metadata,
            Err(e) if e.status() == Some(404) => {
                return Err(SheetError::not_found(format!(
                    "Spreadsheet {} not found, pass a valid spreadsheet ID",
                    spreadsheet_id
                )));
            }
            Err(e) => return Err(e),
        };

        let title = metadata
            .title()
            .ok_or_else(|| SheetError::invalid_response("spreadsheet title is missing"))?
            .to_string();
        let document_grouped = metadata.metadata_value(GROUPING_METADATA_KEY) == Some("true");

        let names = metadata
            .sheets
            .iter()
            .map(|resource| {
                resource
                    .properties
                    .title
                    .clone()
                    .ok_or_else(|| SheetError::invalid_response("sheet title is missing"))
            })
            .collect::<Result<Vec<String>>>()?;

        let mut local = std::mem::take(&mut self.sheets);
        let mut sheets = Vec::with_capacity(names.len());
        for (resource, name) in metadata.sheets.iter().zip(names) {
            let props = &resource.properties;
            let mut sheet = match local.iter().position(|s| s.name() == name) {
                Some(position) => local.remove(position),
                None => Sheet::new(name),
            };
            if let Some(id) = props.sheet_id {
                sheet.bind(id);
            }
            if let Some(grid) = &props.grid_properties {
                sheet.set_properties(SheetProperties {
                    row_count: grid.row_count.unwrap_or(0),
                    column_count: grid.column_count.unwrap_or(0),
                });
            }
            let grouped = resource
                .metadata_value(GROUPING_METADATA_KEY)
                .map_or(document_grouped, |value| value == "true");
            if grouped {
                sheet.enable_group_header();
            }
            sheets.push(sheet);
        }

        for dropped in &local {
            warn!(sheet = dropped.name(), "local sheet not present in remote document, dropping");
        }

        self.title = title;
        if let Some(version) = metadata.metadata_value(VERSION_METADATA_KEY) {
            self.version = version.to_string();
        }
        self.group_header_enabled = document_grouped;
        self.spreadsheet_id = Some(spreadsheet_id.to_string());
        self.sheets = sheets;
        info!(spreadsheet_id, sheets = self.sheets.len(), "spreadsheet loaded");

        let ctx = self.context()?;
        try_join_all(self.sheets.iter_mut().map(|sheet| sheet.load_header(&ctx))).await?;
        Ok(())
    }
}
