use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const API_ENDPOINT: &str = "API_ENDPOINT";
pub const API_KEY: &str = "API_KEY";
pub const API_ID: &str = "API_ID";
pub const ACCOUNT_ID: &str = "ACCOUNT_ID";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_ENV_PATH: &str = ".env";

/// Provider API credentials. Built once at startup and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub endpoint: Url,
    pub api_key: String,
    pub api_id: String,
    pub account_id: String,
}

impl Credentials {
    /// Loads `path` into the process environment (ambient variables win) and
    /// reads the four required variables. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file_vars = read_env_file(path)?;
        for (key, value) in &file_vars {
            if std::env::var_os(key).is_none() {
                std::env::set_var(key, value);
            }
        }
        Self::resolve(&file_vars, |key| std::env::var(key).ok())
    }

    /// Ambient lookup first, then values from the env file.
    pub fn resolve<F>(file_vars: &HashMap<String, String>, ambient: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| ambient(key).or_else(|| file_vars.get(key).cloned()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar { key })
        };

        let endpoint_raw = required(API_ENDPOINT)?;
        let api_key = required(API_KEY)?;
        let api_id = required(API_ID)?;
        let account_id = required(ACCOUNT_ID)?;

        Ok(Self {
            endpoint: parse_endpoint(&endpoint_raw)?,
            api_key,
            api_id,
            account_id,
        })
    }

    pub fn masked_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.masked_key())
            .field("api_id", &self.api_id)
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Parses an env file into a map. Returns an empty map if the file does not exist.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path=%path.display(), "env file not found, using ambient environment only");
            return Ok(HashMap::new());
        }
        Err(source) => return Err(ConfigError::EnvFile { path: path.to_path_buf(), source }),
    };

    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|source| ConfigError::EnvFile { path: path.to_path_buf(), source })?;
        vars.insert(key, value);
    }
    tracing::debug!(path=%path.display(), count = vars.len(), "loaded env file");
    Ok(vars)
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            value: raw.to_string(),
            reason: format!("unsupported scheme `{}`", other),
        }),
    }
}

/// Keeps the first and last two characters of secrets longer than eight characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 4), tail)
}

/// Run options, fixed once the command line has been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub verbose: bool,
    pub debug: bool,
    pub output_path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub list_only: bool,
    pub env_path: PathBuf,
    pub concurrency: usize,
}

impl Options {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verbose: false,
            debug: false,
            output_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            list_only: false,
            env_path: PathBuf::from(DEFAULT_ENV_PATH),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let output = self
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "verbose={} timeout={}s list_only={} output={} env={} concurrency={}",
            self.verbose,
            self.timeout_secs,
            self.list_only,
            output,
            self.env_path.display(),
            self.concurrency
        )
    }
}
