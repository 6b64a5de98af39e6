use crate::horloge::DERIVE_MAX_MINUTES;
use crate::scheduler::AssignOptions;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub regles: ReglesConfig,
    /// Écart d'horloge client/serveur au-delà duquel on passe en mode dégradé
    #[serde(default = "Config::default_derive_max_minutes")]
    pub derive_max_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            polling: PollingConfig::default(),
            regles: ReglesConfig::default(),
            derive_max_minutes: Self::default_derive_max_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    /// Envoie un en-tête `Idempotency-Key` sur les mutations (désactivé par défaut)
    #[serde(default)]
    pub idempotency_keys: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            idempotency_keys: false,
        }
    }
}

impl ApiConfig {
    fn default_base_url() -> String {
        "http://localhost:5000".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Rafraîchissement des services (secondes)
    #[serde(default = "PollingConfig::default_services_secs")]
    pub services_secs: u64,
    /// Contrôle de l'horloge serveur (secondes)
    #[serde(default = "PollingConfig::default_horloge_secs")]
    pub horloge_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            services_secs: Self::default_services_secs(),
            horloge_secs: Self::default_horloge_secs(),
        }
    }
}

impl PollingConfig {
    fn default_services_secs() -> u64 {
        30
    }
    fn default_horloge_secs() -> u64 {
        3600
    }

    pub fn services(&self) -> time::Duration {
        time::Duration::from_secs(self.services_secs)
    }
    pub fn horloge(&self) -> time::Duration {
        time::Duration::from_secs(self.horloge_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReglesConfig {
    #[serde(default = "ReglesConfig::default_repos_min_heures")]
    pub repos_min_heures: u32,
    #[serde(default = "ReglesConfig::default_plafond_hebdo_heures")]
    pub plafond_hebdo_heures: u32,
}

impl Default for ReglesConfig {
    fn default() -> Self {
        Self {
            repos_min_heures: Self::default_repos_min_heures(),
            plafond_hebdo_heures: Self::default_plafond_hebdo_heures(),
        }
    }
}

impl ReglesConfig {
    fn default_repos_min_heures() -> u32 {
        12
    }
    fn default_plafond_hebdo_heures() -> u32 {
        44
    }
}

impl Config {
    fn default_derive_max_minutes() -> i64 {
        DERIVE_MAX_MINUTES
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Fichier absent = configuration par défaut ; fichier invalide = erreur.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn assign_options(&self) -> AssignOptions {
        AssignOptions {
            min_rest_minutes: i64::from(self.regles.repos_min_heures) * 60,
            weekly_cap_minutes: i64::from(self.regles.plafond_hebdo_heures) * 60,
        }
    }

    pub fn derive_max(&self) -> Duration {
        Duration::minutes(self.derive_max_minutes)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}
