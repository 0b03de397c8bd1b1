use std::time::{Duration, Instant};

use humansize::{BINARY, format_size};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::http::builder::{RequestOptions, build_request};
use crate::http::client::ApiClient;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
    Empty,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
    pub size_bytes: usize,
    pub elapsed: Duration,
}

impl ApiResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Deserialize a JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        match &self.body {
            ResponseBody::Json(value) => Ok(T::deserialize(value)?),
            ResponseBody::Text(text) => Ok(serde_json::from_str(text)?),
            ResponseBody::Empty => Ok(serde_json::from_str("null")?),
        }
    }
}

/// Send `options` through the shared client. Non-2xx responses are returned
/// as [`AppError::Status`].
pub async fn execute(
    client: &ApiClient,
    options: &RequestOptions,
) -> Result<ApiResponse, AppError> {
    let start = Instant::now();

    let request = build_request(client, options)?.build()?;
    let method = request.method().clone();
    let url = request.url().clone();

    let response = client.http().execute(request).await.map_err(map_transport)?;

    let status = response.status();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let bytes = response.bytes().await.map_err(map_transport)?;
    let elapsed = start.elapsed();
    let size_bytes = bytes.len();

    tracing::debug!(
        %method,
        %url,
        status = status.as_u16(),
        size = %format_size(size_bytes, BINARY),
        elapsed = %humantime::format_duration(truncate_to_millis(elapsed)),
        "request finished"
    );

    if !status.is_success() {
        return Err(AppError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    Ok(ApiResponse {
        status: status.as_u16(),
        headers,
        body: decode_body(&content_type, &bytes),
        size_bytes,
        elapsed,
    })
}

fn map_transport(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout
    } else {
        AppError::Http(err)
    }
}

fn decode_body(content_type: &str, bytes: &[u8]) -> ResponseBody {
    if bytes.is_empty() {
        return ResponseBody::Empty;
    }
    if content_type.contains(mime::APPLICATION_JSON.essence_str()) {
        if let Ok(json) = serde_json::from_slice::<serde_json::Value>(bytes) {
            return ResponseBody::Json(json);
        }
    }
    ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned())
}

fn truncate_to_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}
