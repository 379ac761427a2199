//! Shell configuration, read once at startup.

use std::path::PathBuf;

/// Environment variable selecting the billing environment.
pub const API_ENV_VAR: &str = "FACTURA_API_ENV";

/// Environment variable overriding the persisted state file.
pub const STATE_PATH_VAR: &str = "SIEEG_STATE_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Raw billing environment flag; `"produccion"` selects production.
    pub api_env: Option<String>,
    /// JSON file backing the persistent key-value store.
    pub state_path: PathBuf,
}

impl ShellConfig {
    /// Read configuration from the process environment.
    ///
    /// `FACTURA_API_ENV` falls back to the value present when the binary was
    /// compiled.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_env = lookup(API_ENV_VAR).or_else(|| option_env!("FACTURA_API_ENV").map(str::to_string));

        let state_path = lookup(STATE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_state_path);

        Self { api_env, state_path }
    }
}

fn default_state_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("sieeg").join("state.json"),
        None => {
            tracing::warn!("no platform data directory; keeping shell state in the working directory");
            PathBuf::from("sieeg-state.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn runtime_values_win() {
        let config = ShellConfig::from_lookup(lookup(&[
            (API_ENV_VAR, "produccion"),
            (STATE_PATH_VAR, "/tmp/sieeg/custom.json"),
        ]));

        assert_eq!(config.api_env.as_deref(), Some("produccion"));
        assert_eq!(config.state_path, PathBuf::from("/tmp/sieeg/custom.json"));
    }

    #[test]
    fn missing_api_env_falls_back_to_compile_time_value() {
        let config = ShellConfig::from_lookup(lookup(&[]));

        assert_eq!(config.api_env.as_deref(), option_env!("FACTURA_API_ENV"));
        assert_eq!(config.state_path, default_state_path());
    }

    #[test]
    fn default_state_file_is_named_state_json_or_local_fallback() {
        let path = default_state_path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(name == "state.json" || name == "sieeg-state.json");
    }
}
