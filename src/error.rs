//! Error types for waf_origin_check.
//!
//! `ConfigError` and `ApiError` end the run. `ProbeError` stays local to one
//! site check and `ReportError` only affects the output file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },

    #[error("invalid API endpoint `{value}`: {reason}")]
    InvalidEndpoint { value: String, reason: String },

    #[error("failed to load env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API reported error code {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API response has no site list (expected an array or an object with `sites`)")]
    UnexpectedShape,
}

/// Failure of a single direct origin probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no origin address in site record")]
    NoOrigin,

    #[error("invalid probe target `{0}`")]
    InvalidTarget(String),

    #[error("DNS lookup for {host} failed: {reason}")]
    Dns { host: String, reason: String },

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to build probe client: {0}")]
    Client(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("output file {} must have a .txt extension", .0.display())]
    Extension(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Flattens an error and its sources into one line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if !out.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_body() {
        let err = ApiError::Status { status: 403, body: "{\"res\":9403}".into() };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("9403"));
    }

    #[test]
    fn chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ReportError::Io { path: PathBuf::from("/x/out.txt"), source: io };
        let line = error_chain(&err);
        assert!(line.contains("/x/out.txt"));
        assert!(line.contains("denied"));
    }
}
