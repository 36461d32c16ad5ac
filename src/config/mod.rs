use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub studio: StudioConfig,
    pub assets: AssetConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Remote studio service that owns migrated galleries.
/// When `api_url` is unset every lookup goes straight to the local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    pub api_url: Option<String>,
    pub sync_secret: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Redirect hops and version-stripping retries share this budget
    pub max_fetch_attempts: u32,
    pub fetch_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Largest single asset placed in an archive; bigger ones are skipped
    pub max_asset_bytes: u64,
    /// Hosts the single-photo proxy may fetch from. Empty allows any host.
    pub allowed_hosts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Empty means permissive CORS
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = non_empty(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Studio overrides
        if let Ok(v) = env::var("STUDIO_API_URL") {
            self.studio.api_url = non_empty(v.trim_end_matches('/').to_string());
        }
        if let Ok(v) = env::var("ADMIN_SYNC_SECRET") {
            self.studio.sync_secret = non_empty(v);
        }
        if let Ok(v) = env::var("STUDIO_TIMEOUT_SECS") {
            self.studio.timeout_secs = v.parse().unwrap_or(self.studio.timeout_secs);
        }

        // Asset overrides
        if let Ok(v) = env::var("ASSET_MAX_FETCH_ATTEMPTS") {
            self.assets.max_fetch_attempts = v.parse().unwrap_or(self.assets.max_fetch_attempts);
        }
        if let Ok(v) = env::var("ASSET_FETCH_TIMEOUT_SECS") {
            self.assets.fetch_timeout_secs = v.parse().unwrap_or(self.assets.fetch_timeout_secs);
        }
        if let Ok(v) = env::var("ASSET_CONNECT_TIMEOUT_SECS") {
            self.assets.connect_timeout_secs = v.parse().unwrap_or(self.assets.connect_timeout_secs);
        }
        if let Ok(v) = env::var("ASSET_MAX_BYTES") {
            self.assets.max_asset_bytes = v.parse().unwrap_or(self.assets.max_asset_bytes);
        }
        if let Ok(v) = env::var("ASSET_ALLOWED_HOSTS") {
            self.assets.allowed_hosts = split_list(&v);
        }

        // API overrides
        if let Some(v) = env::var("GALLERY_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            studio: StudioConfig {
                api_url: None,
                sync_secret: None,
                timeout_secs: 10,
            },
            assets: AssetConfig {
                max_fetch_attempts: 3,
                fetch_timeout_secs: 120,
                connect_timeout_secs: 10,
                max_asset_bytes: 256 * 1024 * 1024,
                allowed_hosts: Vec::new(),
            },
            api: ApiConfig {
                port: 3000,
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            studio: StudioConfig {
                api_url: None,
                sync_secret: None,
                timeout_secs: 5,
            },
            assets: AssetConfig {
                max_fetch_attempts: 3,
                fetch_timeout_secs: 300,
                connect_timeout_secs: 5,
                max_asset_bytes: 512 * 1024 * 1024,
                allowed_hosts: vec!["res.cloudinary.com".to_string()],
            },
            api: ApiConfig {
                port: 3000,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            studio: StudioConfig {
                api_url: None,
                sync_secret: None,
                timeout_secs: 5,
            },
            assets: AssetConfig {
                max_fetch_attempts: 3,
                fetch_timeout_secs: 300,
                connect_timeout_secs: 5,
                max_asset_bytes: 512 * 1024 * 1024,
                allowed_hosts: vec!["res.cloudinary.com".to_string()],
            },
            api: ApiConfig {
                port: 3000,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
