use std::env;

pub const DEFAULT_DATABASE_PATH: &str = "smart_gps.db";
pub const DEFAULT_JWT_SECRET: &str = "change_this_secret";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 1440;
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:8080",
    "http://localhost:3000",
    "http://localhost:5173",
    "http://192.168.100.5:8080",
];

/// Process-wide settings, fixed at startup
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            port: DEFAULT_PORT,
            debug: true,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source; unset or
    /// unparsable values keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("SQLITE_FILE") {
            config.database_path = v;
        }
        if let Some(v) = lookup("JWT_SECRET") {
            config.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_EXP_MINUTES") {
            config.token_ttl_minutes = v.trim().parse().unwrap_or(config.token_ttl_minutes);
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            let origins: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !origins.is_empty() {
                config.cors_origins = origins;
            }
        }
        if let Some(v) = lookup("PORT") {
            config.port = v.trim().parse().unwrap_or(config.port);
        }
        if let Some(v) = lookup("DEBUG") {
            config.debug = matches!(v.trim(), "1" | "true" | "TRUE" | "True");
        }

        config
    }

    /// Default tracing filter when RUST_LOG is not set
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "campus_transit=debug,tower_http=debug"
        } else {
            "campus_transit=info,tower_http=info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database_path, "smart_gps.db");
        assert_eq!(config.token_ttl_minutes, 1440);
        assert_eq!(config.port, 5000);
        assert_eq!(config.cors_origins.len(), 4);
        assert!(config.debug);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SQLITE_FILE", "/tmp/transit.db"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXP_MINUTES", "30"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("PORT", "8081"),
            ("DEBUG", "0"),
        ]));

        assert_eq!(config.database_path, "/tmp/transit.db");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl_minutes, 30);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.port, 8081);
        assert!(!config.debug);
        assert_eq!(config.log_filter(), "campus_transit=info,tower_http=info");
    }

    #[test]
    fn test_unparsable_numbers_keep_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_EXP_MINUTES", "a day"),
            ("PORT", "http"),
        ]));
        assert_eq!(config.token_ttl_minutes, DEFAULT_TOKEN_TTL_MINUTES);
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
