use config::{Config as ConfigBuilder, ConfigError, Environment, File, Map};
use formrelay_notification::{Brand, EmailConfig};
use lettre::Address;
use serde::Deserialize;
use std::env;

/// Flat variables used by existing deployments, applied after the
/// `FORMRELAY__` ones. Later entries win over earlier ones for the same key.
const LEGACY_VARS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("NODE_ENV", "app.environment"),
    ("ENVIRONMENT", "app.environment"),
    ("ZOHO_SMTP_HOST", "email.smtp_host"),
    ("SMTP_HOST", "email.smtp_host"),
    ("ZOHO_SMTP_PORT", "email.smtp_port"),
    ("SMTP_PORT", "email.smtp_port"),
    ("ZOHO_EMAIL", "email.smtp_username"),
    ("ZOHO_EMAIL", "email.from_address"),
    ("SMTP_USERNAME", "email.smtp_username"),
    ("FROM_EMAIL", "email.from_address"),
    ("ZOHO_PASSWORD", "email.smtp_password"),
    ("SMTP_PASSWORD", "email.smtp_password"),
    ("FROM_NAME", "email.from_name"),
    ("ADMIN_EMAIL", "email.admin_address"),
    ("CAREERS_EMAIL", "email.careers_address"),
    ("FRONTEND_URL", "cors.allowed_origins"),
    ("ALLOWED_ORIGINS", "cors.allowed_origins"),
    ("RATE_LIMIT_WINDOW_MS", "rate_limit.window_ms"),
    ("RATE_LIMIT_MAX_REQUESTS", "rate_limit.max_requests"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub brand: Brand,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
        }
    }
}

fn default_environment() -> String {
    "development".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Comma separated list of origins. `*` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Throttle by X-Forwarded-For/X-Real-IP instead of the socket peer.
    /// Only enable behind a proxy that overwrites those headers.
    #[serde(default)]
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            trust_proxy: false,
        }
    }
}

fn default_window_ms() -> u64 {
    15 * 60 * 1000
}

fn default_max_requests() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy flat variables (PORT, ZOHO_SMTP_HOST, FRONTEND_URL, ...)
    /// 2. Prefixed variables (FORMRELAY__EMAIL__SMTP_HOST, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        Self::load_from(config_path, env::vars().collect())
    }

    /// Same as [`Config::load`] with an explicit variable set.
    pub fn load_from(
        config_path: Option<String>,
        vars: Map<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?;

        let config_file_path = config_path
            .or_else(|| vars.get("CONFIG_PATH").cloned())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional, ignored if missing
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        for (var, key) in LEGACY_VARS {
            if let Some(value) = vars.get(*var).filter(|v| !v.trim().is_empty()) {
                builder = builder.set_override(*key, value.trim())?;
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("FORMRELAY")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars)),
        );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.rate_limit.max_requests == 0 {
            return Err("Rate limit max_requests must be at least 1".to_string());
        }
        if self.rate_limit.window_ms < 1000 {
            return Err("Rate limit window must be at least 1000 ms".to_string());
        }
        for (name, address) in [
            ("from_address", &self.email.from_address),
            ("admin_address", &self.email.admin_address),
            ("careers_address", &self.email.careers_address),
        ] {
            address
                .parse::<Address>()
                .map_err(|e| format!("Invalid email.{name} `{address}`: {e}"))?;
        }
        if self.allowed_origins().is_empty() {
            return Err("At least one CORS origin must be allowed".to_string());
        }
        Ok(())
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors
            .allowed_origins
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    pub fn is_production(&self) -> bool {
        self.app.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            app: AppConfig::default(),
            email: EmailConfig::default(),
            cors: CorsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            brand: Brand::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_port() {
        let mut config = config();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_max_requests() {
        let mut config = config();
        config.rate_limit.max_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_short_window() {
        let mut config = config();
        config.rate_limit.window_ms = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bad_admin_address() {
        let mut config = config();
        config.email.admin_address = "not an address".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("admin_address"));
    }

    #[test]
    fn test_allowed_origins_are_split_and_trimmed() {
        let mut config = config();
        config.cors.allowed_origins =
            "https://orivanta.ai/, https://www.orivanta.ai ,,".to_string();
        assert_eq!(
            config.allowed_origins(),
            vec!["https://orivanta.ai", "https://www.orivanta.ai"]
        );
    }

    #[test]
    fn test_is_production() {
        let mut config = config();
        assert!(!config.is_production());
        config.app.environment = "Production".to_string();
        assert!(config.is_production());
    }

    #[test]
    fn test_load_defaults() {
        let config = Config::load_from(Some("does/not/exist.toml".to_string()), vars(&[])).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.rate_limit.window_ms, 900_000);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert!(!config.rate_limit.trust_proxy);
        assert_eq!(config.app.environment, "development");
        assert_eq!(config.brand.company_name, "Orivanta Labs");
    }

    #[test]
    fn test_load_legacy_variables() {
        let config = Config::load_from(
            Some("does/not/exist.toml".to_string()),
            vars(&[
                ("PORT", "8080"),
                ("NODE_ENV", "production"),
                ("ZOHO_SMTP_HOST", "smtp.zoho.in"),
                ("ZOHO_SMTP_PORT", "587"),
                ("ZOHO_EMAIL", "hello@orivanta.ai"),
                ("ZOHO_PASSWORD", "secret"),
                ("FRONTEND_URL", "https://orivanta.ai,https://www.orivanta.ai"),
                ("RATE_LIMIT_MAX_REQUESTS", "10"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.is_production());
        assert_eq!(config.email.smtp_host, "smtp.zoho.in");
        assert_eq!(config.email.smtp_port, 587);
        assert_eq!(config.email.smtp_username, "hello@orivanta.ai");
        assert_eq!(config.email.from_address, "hello@orivanta.ai");
        assert_eq!(config.email.smtp_password, "secret");
        assert_eq!(config.allowed_origins().len(), 2);
        assert_eq!(config.rate_limit.max_requests, 10);
    }

    #[test]
    fn test_load_prefixed_variables() {
        let config = Config::load_from(
            Some("does/not/exist.toml".to_string()),
            vars(&[
                ("FORMRELAY__EMAIL__DRY_RUN", "true"),
                ("FORMRELAY__EMAIL__TLS", "starttls"),
                ("FORMRELAY__BRAND__COMPANY_NAME", "Acme"),
                ("FORMRELAY__RATE_LIMIT__TRUST_PROXY", "true"),
            ]),
        )
        .unwrap();

        assert!(config.email.dry_run);
        assert_eq!(config.email.tls, formrelay_notification::TlsMode::Starttls);
        assert_eq!(config.brand.company_name, "Acme");
        assert!(config.rate_limit.trust_proxy);
    }
}
