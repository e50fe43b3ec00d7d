use thiserror::Error;

/// Errors produced while building or syncing a spreadsheet
#[derive(Debug, Error)]
pub enum SheetError {
    /// Malformed column/row bounds, detected before any remote call
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A required identifier or sheet is missing
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Row data references columns the sheet does not declare
    #[error("Row {row} references unknown columns: {}", .columns.join(", "))]
    UnknownColumn { row: usize, columns: Vec<String> },

    /// The remote document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote service answered with a non-success status
    #[error("Remote service failure ({status}): {message}")]
    RemoteServiceFailure { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service answered without a field this crate relies on
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Row {index} is out of bounds (cached rows: {len})")]
    RowOutOfBounds { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;

impl SheetError {
    pub fn invalid_range(message: impl Into<String>) -> Self {
        SheetError::InvalidRange(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        SheetError::PreconditionFailed(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        SheetError::NotFound(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        SheetError::InvalidResponse(message.into())
    }

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        SheetError::RemoteServiceFailure {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of a remote failure, if this error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            SheetError::RemoteServiceFailure { status, .. } => Some(*status),
            SheetError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_column_message_lists_keys() {
        let err = SheetError::UnknownColumn {
            row: 2,
            columns: vec!["foo".to_string(), "bar".to_string()],
        };
        assert_eq!(err.to_string(), "Row 2 references unknown columns: foo, bar");
    }

    #[test]
    fn test_status_only_for_remote_failures() {
        assert_eq!(SheetError::remote(404, "missing").status(), Some(404));
        assert_eq!(SheetError::precondition("no id").status(), None);
    }
}
