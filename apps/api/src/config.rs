use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_LLM_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_FILESERVER_URL_PREFIX: &str = "/api/files";
const DEFAULT_CHUNK_SIZE: usize = 256;
const DEFAULT_CHUNK_OVERLAP: usize = 32;
const DEFAULT_TOP_K: usize = 6;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub anthropic_api_key: String,
    pub llm_model: String,
    /// When set, nodes are indexed in Postgres; otherwise they live in memory.
    pub database_url: Option<String>,
    pub storage_dir: PathBuf,
    /// Public prefix under which uploaded files are served. `None` disables source URLs.
    pub file_server_url_prefix: Option<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` is the production entry point.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let anthropic_api_key = lookup("ANTHROPIC_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("Required environment variable 'ANTHROPIC_API_KEY' is not set")?;

        let file_server_url_prefix = match lookup("FILESERVER_URL_PREFIX") {
            Some(prefix) if prefix.trim().is_empty() => None,
            Some(prefix) => Some(prefix.trim_end_matches('/').to_string()),
            None => Some(DEFAULT_FILESERVER_URL_PREFIX.to_string()),
        };

        let config = Config {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            anthropic_api_key,
            llm_model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            storage_dir: lookup("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            file_server_url_prefix,
            chunk_size: parse_or(&lookup, "CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: parse_or(&lookup, "CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            top_k: parse_or(&lookup, "TOP_K", DEFAULT_TOP_K)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        };

        if config.chunk_size == 0 {
            bail!("CHUNK_SIZE must be greater than zero");
        }
        if config.chunk_overlap >= config.chunk_size {
            bail!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                config.chunk_overlap,
                config.chunk_size
            );
        }
        if config.top_k == 0 {
            bail!("TOP_K must be greater than zero");
        }

        Ok(config)
    }

    /// Directory holding raw uploaded files.
    pub fn upload_dir(&self) -> PathBuf {
        self.storage_dir.join("output").join("uploaded")
    }

    /// Directory holding shared (non-private) files.
    pub fn data_dir(&self) -> PathBuf {
        self.storage_dir.join("data")
    }

    /// Route path the file server is mounted under, taken from the URL prefix so
    /// generated file URLs resolve. Empty means the server root.
    pub fn file_mount_path(&self) -> String {
        let prefix = self
            .file_server_url_prefix
            .as_deref()
            .unwrap_or(DEFAULT_FILESERVER_URL_PREFIX);
        let path = match prefix.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
            None => prefix,
        };
        let path = path.trim_matches('/');
        if path.is_empty() {
            String::new()
        } else {
            format!("/{path}")
        }
    }

    /// HTTP body limit: base64 inflates by 4/3, plus headroom for the JSON envelope.
    pub fn request_body_limit(&self) -> usize {
        self.max_upload_bytes / 3 * 4 + 64 * 1024
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_applied() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.llm_model, "claude-sonnet-4-5");
        assert_eq!(config.file_server_url_prefix.as_deref(), Some("/api/files"));
        assert!(config.database_url.is_none());
        assert_eq!(config.upload_dir(), PathBuf::from("./output/uploaded"));
    }

    #[test]
    fn test_missing_api_key_fails() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_invalid_port_fails() {
        let err = config_from(&[("ANTHROPIC_API_KEY", "k"), ("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let result = config_from(&[
            ("ANTHROPIC_API_KEY", "k"),
            ("CHUNK_SIZE", "10"),
            ("CHUNK_OVERLAP", "10"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_prefix_disables_urls() {
        let config =
            config_from(&[("ANTHROPIC_API_KEY", "k"), ("FILESERVER_URL_PREFIX", "")]).unwrap();
        assert!(config.file_server_url_prefix.is_none());
    }

    #[test]
    fn test_prefix_trailing_slash_trimmed() {
        let config = config_from(&[
            ("ANTHROPIC_API_KEY", "k"),
            ("FILESERVER_URL_PREFIX", "http://localhost:8000/api/files/"),
        ])
        .unwrap();
        assert_eq!(
            config.file_server_url_prefix.as_deref(),
            Some("http://localhost:8000/api/files")
        );
    }

    #[test]
    fn test_mount_path_follows_prefix() {
        let mount = |prefix: &str| {
            config_from(&[("ANTHROPIC_API_KEY", "k"), ("FILESERVER_URL_PREFIX", prefix)])
                .unwrap()
                .file_mount_path()
        };
        assert_eq!(mount("/api/files"), "/api/files");
        assert_eq!(mount("/static/"), "/static");
        assert_eq!(mount("http://localhost:8000/api/files/"), "/api/files");
        assert_eq!(mount("https://files.example.com"), "");
        assert_eq!(mount(""), "/api/files");
    }

    #[test]
    fn test_body_limit_covers_base64_expansion() {
        let config =
            config_from(&[("ANTHROPIC_API_KEY", "k"), ("MAX_UPLOAD_BYTES", "300")]).unwrap();
        assert!(config.request_body_limit() >= 400);
    }
}
