use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_BASE_URL: &str = "ROVER_API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "ROVER_API_TIMEOUT_MS";

/// Settings every request made through an [`ApiClient`](crate::http::client::ApiClient) inherits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub default_headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert(
            "Content-Type".to_string(),
            mime::APPLICATION_JSON.to_string(),
        );
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            default_headers,
        }
    }
}

/// On-disk shape of `config.toml`. Every field is optional; absent ones keep
/// the value from the previous layer.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    headers: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Request timeout. `0` disables it, as front-end HTTP clients do.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Insert or replace a default header. Names compare case-insensitively,
    /// so `content-type` replaces `Content-Type`.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.default_headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        self.default_headers
            .insert(name.to_string(), value.to_string());
    }

    /// Look up a default header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.default_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Build the effective configuration: defaults, then the config file, then
    /// the environment. `path` overrides the default file location.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::load`], reading variables through `lookup`.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let file = path.map(Path::to_path_buf).or_else(default_config_path);
        if let Some(file) = file {
            config.apply_file(&file)?;
        }
        config.apply_env_from(lookup)?;
        Ok(config)
    }

    /// Overlay a TOML file. A missing file leaves the configuration untouched.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), AppError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no client config file");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        self.apply_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded client config file");
        Ok(())
    }

    pub fn apply_toml(&mut self, content: &str) -> Result<(), AppError> {
        let file: ConfigFile = toml::from_str(content)?;
        if let Some(base_url) = file.base_url {
            self.base_url = base_url;
        }
        if let Some(timeout_ms) = file.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        for (name, value) in &file.headers {
            self.set_header(name, value);
        }
        Ok(())
    }

    /// Overlay `ROVER_API_BASE_URL` / `ROVER_API_TIMEOUT_MS` as returned by `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS).filter(|v| !v.trim().is_empty()) {
            self.timeout_ms = raw.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "{ENV_TIMEOUT_MS} must be a number of milliseconds, got `{raw}`"
                ))
            })?;
        }
        Ok(())
    }
}

/// `<config_dir>/rover-client/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("rover-client").join("config.toml"))
}

/// Parse a `Name: value` header argument.
pub fn parse_header_arg(raw: &str) -> Result<(String, String), AppError> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(AppError::InvalidHeader {
            name: raw.to_string(),
            reason: "expected `Name: value`".to_string(),
        });
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidHeader {
            name: raw.to_string(),
            reason: "empty header name".to_string(),
        });
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.timeout(), Some(Duration::from_millis(10_000)));
        assert_eq!(config.header("Content-Type"), Some("application/json"));
        assert_eq!(config.default_headers.len(), 1);
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = ClientConfig {
            timeout_ms: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut config = ClientConfig::default();
        config.set_header("CONTENT-TYPE", "text/plain");
        assert_eq!(config.default_headers.len(), 1);
        assert_eq!(config.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_apply_toml_overrides_and_merges_headers() {
        let mut config = ClientConfig::default();
        config
            .apply_toml(
                r#"
                base_url = "http://rover.internal:9000"
                timeout_ms = 2500

                [headers]
                X-Team = "infra"
                "#,
            )
            .unwrap();
        assert_eq!(config.base_url, "http://rover.internal:9000");
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.header("x-team"), Some("infra"));
        assert_eq!(config.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_apply_toml_partial_keeps_previous_values() {
        let mut config = ClientConfig::default();
        config.apply_toml("timeout_ms = 500").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms, 500);
    }

    #[test]
    fn test_apply_toml_rejects_garbage() {
        let mut config = ClientConfig::default();
        let err = config.apply_toml("timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_apply_file_missing_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::default();
        config.apply_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_apply_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"https://rover.example.com\"").unwrap();
        let mut config = ClientConfig::default();
        config.apply_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://rover.example.com");
    }

    #[test]
    fn test_apply_env_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URL, " http://10.0.0.5:9000 "),
            (ENV_TIMEOUT_MS, "1500"),
        ]
        .into_iter()
        .collect();
        let mut config = ClientConfig::default();
        config.apply_toml("base_url = \"http://from-file\"").unwrap();
        config
            .apply_env_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.timeout_ms, 1500);
    }

    #[test]
    fn test_apply_env_empty_values_ignored() {
        let mut config = ClientConfig::default();
        config.apply_env_from(|_| Some(String::new())).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_apply_env_bad_timeout() {
        let mut config = ClientConfig::default();
        let err = config
            .apply_env_from(|k| (k == ENV_TIMEOUT_MS).then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_load_with_empty_file_and_env_gives_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ClientConfig::load_with(Some(file.path()), |_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_parse_header_arg() {
        assert_eq!(
            parse_header_arg("X-Trace-Id: abc:123").unwrap(),
            ("X-Trace-Id".to_string(), "abc:123".to_string())
        );
        assert!(parse_header_arg("no-colon").is_err());
        assert!(parse_header_arg(": value").is_err());
    }
}
