use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

const ID_KEYS: &[&str] = &["site_id", "id"];
const DOMAIN_KEYS: &[&str] = &["domain", "hostname", "host", "name"];
const ORIGIN_KEYS: &[&str] = &["ips", "origin_ips", "origins", "origin", "ip"];
const STATUS_KEYS: &[&str] = &["status", "active"];

/// One protected site as returned by the provider.
///
/// The record is kept as-is; accessors only read well-known keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Site(Map<String, Value>);

impl Site {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn id(&self) -> Option<String> {
        self.first(ID_KEYS).and_then(scalar_to_string)
    }

    pub fn domain(&self) -> Option<&str> {
        self.first(DOMAIN_KEYS)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Origin addresses, in the order the provider lists them.
    pub fn origins(&self) -> Vec<String> {
        let mut out = Vec::new();
        for key in ORIGIN_KEYS {
            match self.0.get(*key) {
                Some(Value::String(s)) => push_origin(&mut out, s),
                Some(Value::Array(items)) => {
                    for item in items {
                        if let Some(s) = item.as_str() {
                            push_origin(&mut out, s);
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn status(&self) -> Option<String> {
        self.first(STATUS_KEYS).and_then(scalar_to_string)
    }

    /// Name used in reports: domain, else id, else "<unnamed>".
    pub fn label(&self) -> String {
        self.domain()
            .map(str::to_string)
            .or_else(|| self.id().map(|id| format!("site {}", id)))
            .unwrap_or_else(|| "<unnamed>".to_string())
    }

    fn first(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.0.get(*k).filter(|v| !v.is_null()))
    }
}

fn push_origin(out: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && !out.iter().any(|o| o == trimmed) {
        out.push(trimmed.to_string());
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Pulls the site collection out of a provider response body.
///
/// Accepts a bare array or an object with a `sites` array. An object carrying
/// a non-zero `res` code is a provider-side failure even under HTTP 200.
pub fn extract_sites(body: Value) -> Result<Vec<Site>, ApiError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(code) = map.get("res").and_then(res_code) {
                if code != 0 {
                    let message = map
                        .get("res_message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string();
                    return Err(ApiError::Provider { code, message });
                }
            }
            match map.remove("sites") {
                Some(Value::Array(items)) => items,
                _ => return Err(ApiError::UnexpectedShape),
            }
        }
        _ => return Err(ApiError::UnexpectedShape),
    };

    let mut sites = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(fields) => sites.push(Site(fields)),
            Value::String(domain) => {
                let mut fields = Map::new();
                fields.insert("domain".to_string(), Value::String(domain));
                sites.push(Site(fields));
            }
            other => tracing::warn!(index = idx, value=%other, "skipping non-object site entry"),
        }
    }
    Ok(sites)
}

fn res_code(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
