use std::fs;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    timeout_secs: Option<u64>,
}

/// Defaults, then `wikigraph.toml` in the working directory, then
/// environment variables. CLI flags are merged on top by the caller.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("wikigraph.toml") {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            apply_file(&mut settings, file_cfg);
        }
    }

    apply_env(
        &mut settings,
        std::env::var("WIKIGRAPH_SERVER_URL").ok(),
        std::env::var("WIKIGRAPH_TIMEOUT_SECS").ok(),
    );

    settings
}

fn apply_env(settings: &mut Settings, server_url: Option<String>, timeout_secs: Option<String>) {
    if let Some(v) = server_url {
        settings.server_url = v;
    }
    if let Some(v) = timeout_secs {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.timeout_secs = parsed;
        }
    }
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.timeout_secs {
        settings.timeout_secs = v;
    }
}
