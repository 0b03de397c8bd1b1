use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};

use crate::config::ClientConfig;
use crate::error::AppError;

static SHARED: OnceCell<ApiClient> = OnceCell::new();

/// The process-wide client, built on first use from [`ClientConfig::load`].
/// Every call returns the same instance.
pub fn get_client() -> Result<&'static ApiClient, AppError> {
    shared_from(&SHARED, || ClientConfig::load(None))
}

/// Build the client held by `cell` on first call; later calls skip `load`.
fn shared_from<F>(cell: &OnceCell<ApiClient>, load: F) -> Result<&ApiClient, AppError>
where
    F: FnOnce() -> Result<ClientConfig, AppError>,
{
    cell.get_or_try_init(|| ApiClient::new(load()?))
}

/// An HTTP client bound to one base URL, timeout and default header set.
///
/// Cloning is cheap and every clone refers to the same connection handle and
/// configuration. Nothing here can be changed after construction.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    /// The base URL is kept as given; a malformed one is only reported when a
    /// request is built against it.
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let headers = header_map(&config.default_headers)?;
        let mut builder = Client::builder()
            .default_headers(headers)
            .use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        tracing::debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            headers = config.default_headers.len(),
            "built api client"
        );

        Ok(Self {
            inner: Arc::new(Inner { http, config }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.config.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.inner.config.timeout()
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.inner.config.default_headers
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// True when both handles point at the same underlying client.
    pub fn ptr_eq(&self, other: &ApiClient) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    pub(crate) fn request(&self, method: Method, url: url::Url) -> RequestBuilder {
        self.inner.http.request(method, url)
    }
}

pub(crate) fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, AppError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let (name, value) = header_pair(name, value)?;
        map.insert(name, value);
    }
    Ok(map)
}

pub(crate) fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), AppError> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| AppError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| AppError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}
