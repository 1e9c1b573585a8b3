use std::env;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug)]
pub struct Config {
    pub bind: String,
    pub backend_url: String,
    /// False when `BACKEND_URL` was absent and the default is in use.
    pub backend_url_from_env: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let bind = env::var("PROJECTHUB_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let (backend_url, backend_url_from_env) = match env::var("BACKEND_URL") {
            Ok(url) if !url.trim().is_empty() => (url, true),
            _ => (DEFAULT_BACKEND_URL.to_string(), false),
        };

        Self {
            bind,
            backend_url: normalize_origin(&backend_url),
            backend_url_from_env,
        }
    }

    pub fn with_backend(bind: impl Into<String>, backend_url: &str) -> Self {
        Self {
            bind: bind.into(),
            backend_url: normalize_origin(backend_url),
            backend_url_from_env: true,
        }
    }
}

/// Settings for code that talks to the gateway rather than serving it.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub data_dir: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let api_base_url = env::var("PROJECTHUB_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
        let data_dir = env::var("PROJECTHUB_DATA_DIR").unwrap_or_else(|_| "data".to_string());

        Self {
            api_base_url: normalize_origin(&api_base_url),
            data_dir,
        }
    }
}

fn normalize_origin(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
