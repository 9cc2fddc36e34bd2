//! Service configuration
//!
//! Values come from `BILLING_*` environment variables (a `.env` file is
//! loaded first by the binary), falling back to the defaults below.

use rust_decimal::Decimal;
use serde::Deserialize;

use core_kernel::Rate;
use domain_billing::EngineConfig;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Weekly installments per loan
    pub loan_duration_weeks: u32,
    /// Flat interest rate as a fraction, e.g. 0.10
    pub interest_rate: Decimal,
    /// Missed installments tolerated before delinquency
    pub delinquency_threshold: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            database_url: None,
            db_max_connections: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            loan_duration_weeks: engine.loan_duration_weeks,
            interest_rate: engine.interest_rate.as_decimal(),
            delinquency_threshold: engine.delinquency_threshold,
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from `BILLING_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::with_prefix("BILLING").try_parsing(true))
    }

    /// Loads configuration from an arbitrary source layered over the defaults
    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .set_default("loan_duration_weeks", i64::from(defaults.loan_duration_weeks))?
            .set_default("interest_rate", defaults.interest_rate.to_string())?
            .set_default("delinquency_threshold", i64::from(defaults.delinquency_threshold))?
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Engine configuration derived from these settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            loan_duration_weeks: self.loan_duration_weeks,
            interest_rate: Rate::new(self.interest_rate),
            delinquency_threshold: self.delinquency_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("BILLING")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_source(env(&[])).unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.database_url, None);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.engine_config(), EngineConfig::default());
        assert_eq!(config.server_addr(), "0.0.0.0:5001");
    }

    #[test]
    fn test_environment_overrides() {
        let config = ServiceConfig::from_source(env(&[
            ("BILLING_PORT", "8080"),
            ("BILLING_DATABASE_URL", "postgres://localhost/billing"),
            ("BILLING_LOG_FORMAT", "json"),
            ("BILLING_INTEREST_RATE", "0.125"),
            ("BILLING_DELINQUENCY_THRESHOLD", "3"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/billing"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.interest_rate, dec!(0.125));
        assert_eq!(config.engine_config().delinquency_threshold, 3);
    }
}
