//! configuration types for skycourier.

use serde::{Deserialize, Serialize};

/// main configuration for skycourier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// address to bind the http server to.
    pub listen_addr: String,

    /// database configuration.
    pub database: DatabaseConfig,

    /// authentication configuration.
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlite database file path.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "skycourier.db".to_string(),
        }
    }
}

/// authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// hs256 signing secret for bearer tokens. empty means unset; `serve`
    /// refuses to start without one.
    pub jwt_secret: String,

    /// request paths that bypass authentication entirely.
    pub allow_unauthenticated: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            allow_unauthenticated: vec!["/health".to_string()],
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // the secret is masked; only whether it is set is shown
        write!(
            f,
            "Config{{db: {}, listen: {}, jwt_secret: {}}}",
            self.database.path,
            self.listen_addr,
            if self.auth.jwt_secret.is_empty() {
                "(unset)"
            } else {
                "***"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, "skycourier.db");
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(config.auth.jwt_secret.is_empty());
        assert_eq!(config.auth.allow_unauthenticated, vec!["/health"]);
    }

    #[test]
    fn test_config_serde_partial() {
        let json = r#"{"listen_addr": "127.0.0.1:9000"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.database.path, "skycourier.db");
    }

    #[test]
    fn test_display_masks_secret() {
        let mut config = Config::default();
        config.auth.jwt_secret = "super-secret".to_string();
        let shown = config.to_string();
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("***"));
    }
}
