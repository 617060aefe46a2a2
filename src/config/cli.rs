use crate::adapters::http::DEFAULT_ENDPOINT;
use crate::adapters::storage::DEFAULT_CACHE_PATH;
use crate::core::{ConfigProvider, ConversionMode};
use crate::domain::model::DEFAULT_RATE;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "small-calc")]
#[command(about = "A keypad calculator with a currency conversion overlay")]
pub struct CliConfig {
    /// Path to a TOML configuration file; replaces the rate and storage flags
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    /// Source currency
    #[arg(long, default_value = "EUR")]
    pub from: String,

    /// Target currency
    #[arg(long, default_value = "JPY")]
    pub to: String,

    #[arg(long, default_value = DEFAULT_CACHE_PATH)]
    pub cache_path: String,

    #[arg(long, default_value = "5")]
    pub timeout_seconds: u64,

    #[arg(long)]
    pub refresh_interval_seconds: Option<u64>,

    /// Rate used until a live or cached value is available
    #[arg(long, default_value_t = DEFAULT_RATE)]
    pub default_rate: f64,

    #[arg(long, value_enum)]
    pub mode: Option<ConversionMode>,

    /// Evaluate one expression and exit
    #[arg(short, long)]
    pub expr: Option<String>,

    /// Skip the network and use the cached rate only
    #[arg(long)]
    pub offline: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn from_currency(&self) -> &str {
        &self.from
    }

    fn to_currency(&self) -> &str {
        &self.to
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_seconds.map(Duration::from_secs)
    }

    fn cache_path(&self) -> &str {
        &self.cache_path
    }

    fn default_rate(&self) -> f64 {
        self.default_rate
    }

    fn conversion_mode(&self) -> ConversionMode {
        self.mode.unwrap_or_default()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_currency_code("from", &self.from)?;
        validation::validate_currency_code("to", &self.to)?;
        validation::validate_path("cache_path", &self.cache_path)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 120)?;
        if let Some(interval) = self.refresh_interval_seconds {
            validation::validate_positive_number("refresh_interval_seconds", interval, 10)?;
        }
        validation::validate_rate("default_rate", self.default_rate)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["small-calc"]);

        assert_eq!(config.api_endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.from_currency(), "EUR");
        assert_eq!(config.to_currency(), "JPY");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.default_rate(), DEFAULT_RATE);
        assert_eq!(config.conversion_mode(), ConversionMode::Off);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags() {
        let config = CliConfig::parse_from([
            "small-calc",
            "--from",
            "USD",
            "--to",
            "EUR",
            "--mode",
            "target-to-source",
            "--expr",
            "2+2",
            "--offline",
        ]);

        assert_eq!(config.from_currency(), "USD");
        assert_eq!(config.conversion_mode(), ConversionMode::TargetToSource);
        assert_eq!(config.expr.as_deref(), Some("2+2"));
        assert!(config.offline);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = CliConfig::parse_from(["small-calc", "--from", "euro"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["small-calc", "--timeout-seconds", "0"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["small-calc", "--default-rate=-1"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["small-calc", "--api-endpoint", "ftp://x"]);
        assert!(config.validate().is_err());
    }
}
