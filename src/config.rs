use config::{builder::DefaultState, ConfigBuilder};
use secrecy::Secret;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Storage credentials
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: Secret<String>,

    // HTTP server
    pub host: String,
    pub port: u16,
    pub base_url: String,

    // IP geolocation backend
    pub geo_api_url: String,
    pub geo_timeout_ms: u64,

    // Behaviour toggles
    pub enrich_scans: bool,
    pub seed_demo_card: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = Self::builder()?
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Self::from_config(&config)
    }

    /// Builder preloaded with the default for every key except the database
    /// password. Values supplied by later sources replace the defaults.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("db_host", "localhost")?
            .set_default("db_port", 5433)?
            .set_default("db_name", "nfc")?
            .set_default("db_user", "postgres")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 5000)?
            .set_default("base_url", "http://localhost:5000")?
            .set_default("geo_api_url", "http://ip-api.com/json")?
            .set_default("geo_timeout_ms", 1500)?
            .set_default("enrich_scans", true)?
            .set_default("seed_demo_card", true)
    }

    /// Reads settings from an assembled source. A value that is present but
    /// malformed is an error.
    pub fn from_config(config: &config::Config) -> Result<Self, config::ConfigError> {
        let base_url: String = config.get("base_url")?;
        let geo_api_url: String = config.get("geo_api_url")?;

        validate_url("base_url", &base_url)?;
        validate_url("geo_api_url", &geo_api_url)?;

        Ok(Self {
            db_host: config.get("db_host")?,
            db_port: config.get("db_port")?,
            db_name: config.get("db_name")?,
            db_user: config.get("db_user")?,
            db_password: Secret::new(config.get("db_password")?),

            host: config.get("host")?,
            port: config.get("port")?,
            base_url: base_url.trim_end_matches('/').to_string(),

            geo_api_url: geo_api_url.trim_end_matches('/').to_string(),
            geo_timeout_ms: config.get("geo_timeout_ms")?,

            enrich_scans: config.get("enrich_scans")?,
            seed_demo_card: config.get("seed_demo_card")?,
        })
    }
}

fn validate_url(key: &str, value: &str) -> Result<(), config::ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| config::ConfigError::Message(format!("{key} is not a valid URL: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn source(pairs: &[(&str, &str)]) -> config::Config {
        let mut builder = Config::builder().unwrap();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_config(&source(&[("db_password", "secret")])).unwrap();

        assert_eq!(config.db_host, "localhost");
        assert_eq!(config.db_port, 5433);
        assert_eq!(config.db_name, "nfc");
        assert_eq!(config.db_user, "postgres");
        assert_eq!(config.db_password.expose_secret(), "secret");
        assert_eq!(config.port, 5000);
        assert_eq!(config.geo_api_url, "http://ip-api.com/json");
        assert_eq!(config.geo_timeout_ms, 1500);
        assert!(config.enrich_scans);
        assert!(config.seed_demo_card);
    }

    #[test]
    fn test_overrides_parse_from_strings() {
        let config = Config::from_config(&source(&[
            ("db_password", "secret"),
            ("db_port", "6543"),
            ("port", "8080"),
            ("enrich_scans", "false"),
            ("base_url", "https://cards.example.com/"),
        ]))
        .unwrap();

        assert_eq!(config.db_port, 6543);
        assert_eq!(config.port, 8080);
        assert!(!config.enrich_scans);
        assert_eq!(config.base_url, "https://cards.example.com");
    }

    #[test]
    fn test_password_is_required() {
        assert!(Config::from_config(&source(&[])).is_err());
    }

    #[test]
    fn test_malformed_values_rejected() {
        let cases = [
            ("db_port", "54x3"),
            ("db_port", "70000"),
            ("port", "http"),
            ("geo_timeout_ms", "fast"),
            ("enrich_scans", "maybe"),
        ];

        for (key, value) in cases {
            let result = Config::from_config(&source(&[("db_password", "secret"), (key, value)]));
            assert!(result.is_err(), "{key}={value} should be rejected");
        }
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = Config::from_config(&source(&[
            ("db_password", "secret"),
            ("base_url", "not a url"),
        ]));

        assert!(result.is_err());
    }
}
