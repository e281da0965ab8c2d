use serde::{Deserialize, Serialize};
use tracing::Level;

/// Quiet period between the last edit and the save request.
pub(crate) const AUTOSAVE_QUIET_MS: i32 = 2000;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Reads `window.ENV`, falling back to `{origin}/api`.
    pub fn new() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::with_api_url(String::new());
        };

        let origin = window.location().origin().unwrap_or_default();
        let mut config = Self::with_api_url(default_api_url(&origin));

        if let Some(env) = window.get("ENV") {
            if !env.is_undefined() && env.is_object() {
                // `API_URL` is the documented key; `api_url` is still accepted.
                if let Some(url) = read_env_string(&env, "API_URL")
                    .or_else(|| read_env_string(&env, "api_url"))
                {
                    config.api_url = url;
                }
                config.log_level = read_env_string(&env, "LOG_LEVEL")
                    .or_else(|| read_env_string(&env, "log_level"));
            }
        }

        config
    }

    pub fn with_api_url(api_url: String) -> Self {
        Self {
            api_url,
            log_level: None,
        }
    }

    pub fn max_level(&self) -> Level {
        parse_level(self.log_level.as_deref())
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env_string(env: &js_sys::Object, key: &str) -> Option<String> {
    js_sys::Reflect::get(env, &key.into())
        .ok()
        .and_then(|v| v.as_string())
        .filter(|s| !s.trim().is_empty())
}

pub(crate) fn default_api_url(origin: &str) -> String {
    format!("{}/api", origin.trim_end_matches('/'))
}

pub(crate) fn parse_level(raw: Option<&str>) -> Level {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => Level::INFO,
    }
}
