use std::{collections::HashMap, fs, path::Path, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub topology_path: Option<String>,
    pub link_update_period_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8181".into(),
            topology_path: None,
            link_update_period_ms: 1000,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn link_update_period(&self) -> Duration {
        Duration::from_millis(self.link_update_period_ms.max(1))
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new("peer.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file if present, then environment variables.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.server_bind = v.clone();
            }
            if let Some(v) = file_cfg.get("topology_path") {
                settings.topology_path = Some(v.clone());
            }
            if let Some(parsed) = file_cfg
                .get("link_update_period_ms")
                .and_then(|v| v.parse::<u64>().ok())
            {
                settings.link_update_period_ms = parsed;
            }
            if let Some(v) = file_cfg.get("log_filter") {
                settings.log_filter = v.clone();
            }
        }
    }

    if let Some(v) = env("PEER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__TOPOLOGY_PATH") {
        settings.topology_path = Some(v);
    }

    if let Some(v) = env("APP__LINK_UPDATE_PERIOD_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.link_update_period_ms = parsed;
        }
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
