//! Error types shared by the stores and the processing pipeline.

use thiserror::Error;

/// Failures raised while talking to a remote data source.
///
/// An empty response body is not an error: [`crate::fetch::fetch_json`]
/// reports it as `Ok(None)` so callers can leave the cell missing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to '{url}' failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },
    #[error("response from '{url}' is not valid JSON: {source}")]
    Parse {
        url: String,
        source: serde_json::Error,
    },
}

/// Failures raised by the data stores and the aggregation pipeline.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("'{owner}' has no table named '{name}'")]
    UnknownTable { owner: &'static str, name: String },
    #[error("no system named '{0}' is configured")]
    UnknownSystem(String),
    #[error("column '{column}' not found in {context}")]
    MissingColumn { column: String, context: String },
    #[error("no archive is known for year {0}")]
    UnknownYear(u16),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error at {path}: {source}")]
    Csv { path: String, source: csv::Error },
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("spreadsheet error: {0}")]
    Sheet(#[from] calamine::Error),
    #[error("registry error: {0}")]
    Registry(#[from] serde_json::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl DataError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        DataError::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}
