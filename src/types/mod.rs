use serde::{Deserialize, Serialize};

// ============= Page Records =============

/// A table cell. `null` cells are accepted on input and render as empty.
pub type TableCell = Option<String>;

/// A table row.
pub type TableRow = Vec<TableCell>;

/// A table as a grid of rows.
pub type Table = Vec<TableRow>;

/// One page of one PDF, as written by `extract` and updated by `merge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub file_name: String,
    /// 1-based
    pub page_number: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

impl PageRecord {
    pub fn new(file_name: impl Into<String>, page_number: u32, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            page_number,
            text: text.into(),
            tables: Vec::new(),
            images: Vec::new(),
        }
    }
}

/// Image caption attached to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub image_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Number of chunks in the loaded index
    pub chunks: usize,
    pub model: String,
    pub embedding_model: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(#[from] ragbot_vector::Error),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::utils::toml_config::ConfigError> for AppError {
    fn from(e: crate::utils::toml_config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LLM(_) | AppError::Embedding(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let message = match self {
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::LLM(msg)
            | AppError::Embedding(msg) => msg,
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_page_record_defaults_missing_fields() {
        let page: PageRecord =
            serde_json::from_str(r#"{"file_name": "a.pdf", "page_number": 2}"#).unwrap();
        assert_eq!(page.text, "");
        assert!(page.tables.is_empty());
        assert!(page.images.is_empty());
    }

    #[test]
    fn test_table_accepts_null_cells() {
        let page: PageRecord = serde_json::from_str(
            r#"{"file_name": "a.pdf", "page_number": 1, "text": "",
                "tables": [[["Year", null], ["2020", "12"]]]}"#,
        )
        .unwrap();
        assert_eq!(page.tables[0][0][1], None);
        assert_eq!(page.tables[0][1][1].as_deref(), Some("12"));
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppError::InvalidInput("x".into()), 400),
            (AppError::NotFound("x".into()), 404),
            (AppError::LLM("x".into()), 502),
            (AppError::Embedding("x".into()), 502),
            (AppError::Internal("x".into()), 500),
        ];
        for (err, code) in cases {
            assert_eq!(err.into_response().status().as_u16(), code);
        }
    }
}
