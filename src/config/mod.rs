use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub import: ImportConfig,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = concat!("surfspots-api/", env!("CARGO_PKG_VERSION"));
const DEV_JWT_SECRET: &str = "surfspots-development-secret";

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
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides; PORT wins over API_PORT for container platforms
        if let Ok(v) = env::var("API_PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Import overrides
        if let Ok(v) = env::var("IMPORT_BATCH_SIZE") {
            self.import.batch_size = v.parse().unwrap_or(self.import.batch_size);
        }

        // Geocoding overrides
        if let Ok(v) = env::var("GEOCODING_BASE_URL") {
            self.geocoding.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("GEOCODING_USER_AGENT") {
            self.geocoding.user_agent = v;
        }
        if let Ok(v) = env::var("GEOCODING_TIMEOUT_SECS") {
            self.geocoding.timeout_secs = v.parse().unwrap_or(self.geocoding.timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 9001,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            import: ImportConfig { batch_size: 500 },
            geocoding: GeocodingConfig {
                base_url: DEFAULT_GEOCODING_URL.to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout_secs: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 9001,
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            import: ImportConfig { batch_size: 500 },
            geocoding: GeocodingConfig {
                base_url: DEFAULT_GEOCODING_URL.to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout_secs: 5,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 9001,
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            import: ImportConfig { batch_size: 1000 },
            geocoding: GeocodingConfig {
                base_url: DEFAULT_GEOCODING_URL.to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout_secs: 5,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.import.batch_size, 500);
        assert!(!config.security.jwt_secret.is_empty());
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert!(!config.api.enable_request_logging);
    }

    #[test]
    fn test_user_agent_names_the_service() {
        let config = AppConfig::staging();
        assert!(config.geocoding.user_agent.starts_with("surfspots-api/"));
        assert!(!config.geocoding.base_url.ends_with('/'));
    }
}
