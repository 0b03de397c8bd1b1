#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("Unknown resource `{0}`, expected one of: plan, rso, map, graph")]
    UnknownResource(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Request failed with status {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_includes_body() {
        let err = AppError::Status {
            status: 404,
            body: "404 page not found\n".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed with status 404: 404 page not found");
    }

    #[test]
    fn test_status_message_without_body() {
        let err = AppError::Status {
            status: 502,
            body: "  ".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed with status 502");
    }
}
