use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub mail: MailConfig,

    pub payments: PaymentsConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/staybook.db".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            cors_allowed_origins: vec!["https://localhost:5173".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HMAC secret used to sign session tokens. Must be at least 32 bytes.
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// 64 hex characters (32 bytes) used for AES-256-GCM encryption of PII.
    #[serde(skip_serializing)]
    pub encryption_key: String,

    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    pub token_ttl: TokenTtlConfig,

    /// Failed-login throttling policy.
    pub auth_throttle: AuthThrottleConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            encryption_key: String::new(),
            argon2_memory_cost_kib: 19 * 1024,
            argon2_time_cost: 2,
            argon2_parallelism: 1,
            token_ttl: TokenTtlConfig::default(),
            auth_throttle: AuthThrottleConfig::default(),
        }
    }
}

/// Session token lifetime per role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenTtlConfig {
    pub user_secs: u64,

    pub admin_secs: u64,
}

impl Default for TokenTtlConfig {
    fn default() -> Self {
        Self {
            user_secs: constants::tokens::USER_TTL_SECS,
            admin_secs: constants::tokens::ADMIN_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthThrottleConfig {
    /// Max failed attempts in the window before lockout.
    pub max_attempts: u32,

    /// Rolling window for counting failures.
    pub window_seconds: u64,

    /// Temporary lockout duration once max attempts is reached.
    pub lockout_seconds: u64,
}

impl Default for AuthThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 15 * 60,
            lockout_seconds: 15 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// When disabled, outgoing mail is written to the log instead of sent.
    pub enabled: bool,

    pub smtp_host: String,

    pub smtp_port: u16,

    pub smtp_username: String,

    #[serde(skip_serializing)]
    pub smtp_password: String,

    pub from_address: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "Hotel Booking <no-reply@localhost>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub stripe_api_base: String,

    #[serde(skip_serializing)]
    pub stripe_secret_key: String,

    #[serde(skip_serializing)]
    pub webhook_secret: String,

    pub currency: String,

    pub success_url: String,

    pub cancel_url: String,

    pub request_timeout_seconds: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            stripe_api_base: "https://api.stripe.com".to_string(),
            stripe_secret_key: String::new(),
            webhook_secret: String::new(),
            currency: "usd".to_string(),
            success_url: "https://localhost:5173/success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "https://localhost:5173/cancel".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            mail: MailConfig::default(),
            payments: PaymentsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_env_overrides();
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Secrets are usually provided through the environment (or a `.env`
    /// file) rather than the config file.
    pub fn apply_env_overrides(&mut self) {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(v) = read("STAYBOOK_DATABASE_URL") {
            self.general.database_url = v;
        }
        if let Some(v) = read("STAYBOOK_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = read("STAYBOOK_ENCRYPTION_KEY") {
            self.security.encryption_key = v;
        }
        if let Some(v) = read("STAYBOOK_SMTP_PASSWORD") {
            self.mail.smtp_password = v;
        }
        if let Some(v) = read("STAYBOOK_STRIPE_SECRET_KEY") {
            self.payments.stripe_secret_key = v;
        }
        if let Some(v) = read("STAYBOOK_STRIPE_WEBHOOK_SECRET") {
            self.payments.webhook_secret = v;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("staybook").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".staybook").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.security.jwt_secret.len() < 32 {
            anyhow::bail!("security.jwt_secret must be at least 32 bytes");
        }

        match hex::decode(&self.security.encryption_key) {
            Ok(bytes) if bytes.len() == 32 => {}
            _ => anyhow::bail!("security.encryption_key must be 64 hex characters"),
        }

        if self.security.auth_throttle.max_attempts == 0 {
            anyhow::bail!("security.auth_throttle.max_attempts must be > 0");
        }

        if self.mail.enabled && (self.mail.smtp_host.is_empty() || self.mail.from_address.is_empty())
        {
            anyhow::bail!("mail.smtp_host and mail.from_address are required when mail is enabled");
        }

        url::Url::parse(&self.payments.stripe_api_base)
            .context("payments.stripe_api_base is not a valid URL")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.security.jwt_secret = "x".repeat(32);
        config.security.encryption_key = "ab".repeat(32);
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.security.auth_throttle.max_attempts, 5);
        assert_eq!(config.security.token_ttl.user_secs, 7 * 24 * 60 * 60);
        assert_eq!(config.security.token_ttl.admin_secs, 90 * 24 * 60 * 60);
        assert!(!config.mail.enabled);
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [security.token_ttl]
            user_secs = 3600
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.security.token_ttl.user_secs, 3600);
        assert_eq!(
            config.security.token_ttl.admin_secs,
            constants::tokens::ADMIN_TTL_SECS
        );
        assert_eq!(config.payments.currency, "usd");
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let config = valid_config();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[security]"));
        assert!(!toml_str.contains("jwt_secret"));
        assert!(!toml_str.contains("encryption_key"));
    }

    #[test]
    fn test_validate() {
        assert!(valid_config().validate().is_ok());

        let mut short_secret = valid_config();
        short_secret.security.jwt_secret = "short".to_string();
        assert!(short_secret.validate().is_err());

        let mut bad_key = valid_config();
        bad_key.security.encryption_key = "not-hex".to_string();
        assert!(bad_key.validate().is_err());

        let mut mail = valid_config();
        mail.mail.enabled = true;
        mail.mail.smtp_host = String::new();
        assert!(mail.validate().is_err());
    }
}
