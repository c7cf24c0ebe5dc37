use std::env;
use std::sync::OnceLock;
use std::time::Duration;

use crate::control_plane::HostPort;

static CONFIG: OnceLock<Config> = OnceLock::new();

// --- CONFIG AGGREGATOR ---

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: EndpointConfig,
    pub admin: AdminTimeoutsConfig,
}

impl Config {
    pub fn global() -> &'static Config {
        CONFIG.get_or_init(Self::load)
    }

    fn load() -> Self {
        dotenv::dotenv().ok();
        Self {
            endpoint: EndpointConfig::load(),
            admin: AdminTimeoutsConfig::load(),
        }
    }
}

// --- MODULES ---

// ENDPOINT (startup broker address used by the proxy factory)
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
}

impl EndpointConfig {
    fn load() -> Self {
        Self {
            host: get_env("KAFSCOPE_BROKER_HOST", "127.0.0.1"),
            port: get_env("KAFSCOPE_BROKER_PORT", "9092"),
        }
    }

    pub fn host_port(&self) -> HostPort {
        HostPort::new(self.host.clone(), self.port)
    }
}

// ADMIN (timeouts of the refresh pipeline and topic mutations)
#[derive(Debug, Clone)]
pub struct AdminTimeoutsConfig {
    pub request_timeout_ms: u64,
    pub close_timeout_ms: u64,
    pub reachability_timeout_ms: u64,
    pub delete_topic_timeout_ms: u64,
    pub refresh_interval_secs: u64,
}

impl AdminTimeoutsConfig {
    fn load() -> Self {
        Self {
            request_timeout_ms:      get_env("ADMIN_REQUEST_TIMEOUT_MS", "4000"),
            close_timeout_ms:        get_env("ADMIN_CLOSE_TIMEOUT_MS", "2000"),
            reachability_timeout_ms: get_env("ADMIN_REACHABLE_TIMEOUT_MS", "1000"),
            delete_topic_timeout_ms: get_env("ADMIN_DELETE_TOPIC_TIMEOUT_MS", "5000"),
            refresh_interval_secs:   get_env("ADMIN_REFRESH_INTERVAL_SECS", "30"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }

    pub fn reachability_timeout(&self) -> Duration {
        Duration::from_millis(self.reachability_timeout_ms)
    }

    pub fn delete_topic_timeout(&self) -> Duration {
        Duration::from_millis(self.delete_topic_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

// --- PRIVATE HELPER ---

fn get_env<T: std::str::FromStr>(key: &str, default: &str) -> T {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| format!("Config error: {} must be valid", key))
        .unwrap()
}
