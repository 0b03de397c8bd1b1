use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use url::Url;

use crate::error::AppError;
use crate::http::client::{ApiClient, header_pair};

/// Per-call settings layered over the client's defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// Relative to the client's base URL unless it carries its own scheme.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Replace default headers of the same name for this request only.
    pub headers: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, AppError> {
        self.json = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// `scheme://...`; such paths bypass the base URL.
pub fn is_absolute_url(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Join base and path with exactly one `/` between them.
/// - `("http://h:9000/", "/api/plan")` → `http://h:9000/api/plan`
/// - `("http://h:9000/v1", "health")` → `http://h:9000/v1/health`
/// - `(base, "")` → `base`
pub fn combine_urls(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub fn resolve_url(base: &str, path: &str) -> Result<Url, AppError> {
    let full = if is_absolute_url(path) {
        path.to_string()
    } else if path.starts_with("//") {
        // Protocol-relative: borrow the scheme of the base.
        let scheme = parse_url(base)?.scheme().to_string();
        format!("{scheme}:{path}")
    } else {
        combine_urls(base, path)
    };
    parse_url(&full)
}

fn parse_url(raw: &str) -> Result<Url, AppError> {
    Url::parse(raw).map_err(|e| AppError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

pub fn build_request(
    client: &ApiClient,
    options: &RequestOptions,
) -> Result<RequestBuilder, AppError> {
    let url = resolve_url(client.base_url(), &options.path)?;
    let mut builder = client.request(options.method.clone(), url);

    if !options.query.is_empty() {
        builder = builder.query(&options.query);
    }

    for (name, value) in &options.headers {
        let (name, value) = header_pair(name, value)?;
        builder = builder.header(name, value);
    }

    if let Some(body) = &options.json {
        builder = builder.json(body);
    }

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder)
}
