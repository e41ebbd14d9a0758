use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Admin endpoints are owned by the server; `{id}` is substituted.
    #[serde(default = "default_admin_users_path")]
    pub admin_users_path: String,
    #[serde(default = "default_admin_statement_path")]
    pub admin_statement_path: String,
    #[serde(default = "default_admin_reverse_path")]
    pub admin_reverse_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SessionConfig {
    pub path: PathBuf,
}

/// Amount bounds the deposit form enforces before sending anything.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LimitsConfig {
    pub deposit_min: Decimal,
    pub deposit_max: Decimal,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_admin_users_path() -> String {
    "/account/admin/users/".to_string()
}

fn default_admin_statement_path() -> String {
    "/account/admin/users/{id}/statement/".to_string()
}

fn default_admin_reverse_path() -> String {
    "/account/admin/transactions/{id}/reverse/".to_string()
}

fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("conta_digital")
        .join("session.json")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            admin_users_path: default_admin_users_path(),
            admin_statement_path: default_admin_statement_path(),
            admin_reverse_path: default_admin_reverse_path(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            deposit_min: Decimal::new(100, 2),
            deposit_max: Decimal::new(1_000_000, 2),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn admin_statement_path_for(&self, account_id: u64) -> String {
        self.admin_statement_path.replace("{id}", &account_id.to_string())
    }

    pub fn admin_reverse_path_for(&self, transaction_id: u64) -> String {
        self.admin_reverse_path.replace("{id}", &transaction_id.to_string())
    }
}

/// Something that happened while loading the config. Loading runs before
/// the tracing subscriber exists, so notes are logged by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNote {
    Loaded(String),
    Created(String),
    /// File present but unusable; defaults were used.
    Unusable(String),
    WriteFailed(String),
}

impl ConfigNote {
    pub fn log(&self) {
        match self {
            ConfigNote::Loaded(path) => info!("Config loaded from {}", path),
            ConfigNote::Created(path) => info!("Config file not found at '{}'. Created default.", path),
            ConfigNote::Unusable(reason) => warn!("{}. Using defaults.", reason),
            ConfigNote::WriteFailed(reason) => warn!("{}", reason),
        }
    }
}

impl ClientConfig {
    pub fn load_or_default(path: &str) -> (Self, Vec<ConfigNote>) {
        let mut notes = Vec::new();
        if std::path::Path::new(path).exists() {
            let config = match std::fs::read_to_string(path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => {
                        notes.push(ConfigNote::Loaded(path.to_string()));
                        c
                    }
                    Err(e) => {
                        notes.push(ConfigNote::Unusable(format!("Error parsing config '{}': {}", path, e)));
                        Self::default()
                    }
                },
                Err(e) => {
                    notes.push(ConfigNote::Unusable(format!("Error reading config '{}': {}", path, e)));
                    Self::default()
                }
            };
            return (config, notes);
        }

        let config = Self::default();
        match toml::to_string_pretty(&config) {
            Ok(s) => match std::fs::write(path, s) {
                Ok(()) => notes.push(ConfigNote::Created(path.to_string())),
                Err(e) => notes.push(ConfigNote::WriteFailed(format!(
                    "Could not write default config to '{}': {}",
                    path, e
                ))),
            },
            Err(e) => notes.push(ConfigNote::WriteFailed(format!("Could not render default config: {}", e))),
        }
        (config, notes)
    }
}
