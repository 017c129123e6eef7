//! Error types for the cache admin tool

use std::fmt;

#[derive(Debug)]
pub enum AdminError {
    Cache(ipx_blob_cache::CacheError),
    Output(Box<std::io::Error>),
    Json(serde_json::Error),
    Task(String),
    Config(String),
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminError::Cache(err) => write!(f, "Cache error: {}", err),
            AdminError::Output(err) => write!(f, "Output error: {}", err),
            AdminError::Json(err) => write!(f, "JSON error: {}", err),
            AdminError::Task(msg) => write!(f, "Background task failed: {}", msg),
            AdminError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AdminError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdminError::Cache(err) => Some(err),
            AdminError::Output(err) => Some(err.as_ref()),
            AdminError::Json(err) => Some(err),
            AdminError::Task(_) | AdminError::Config(_) => None,
        }
    }
}

impl From<ipx_blob_cache::CacheError> for AdminError {
    fn from(err: ipx_blob_cache::CacheError) -> Self {
        AdminError::Cache(err)
    }
}

impl From<std::io::Error> for AdminError {
    fn from(err: std::io::Error) -> Self {
        AdminError::Output(Box::new(err))
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Json(err)
    }
}

impl From<tokio::task::JoinError> for AdminError {
    fn from(err: tokio::task::JoinError) -> Self {
        AdminError::Task(err.to_string())
    }
}

impl From<tracing_subscriber::filter::ParseError> for AdminError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        AdminError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_display() {
        let err = AdminError::from(ipx_blob_cache::CacheError::InvalidKey(String::new()));
        assert_eq!(format!("{}", err), "Cache error: Invalid cache key: \"\"");
    }

    #[test]
    fn test_config_error_display() {
        let err = AdminError::Config("missing CACHE_DIR".to_string());
        assert_eq!(format!("{}", err), "Configuration error: missing CACHE_DIR");
    }
}
