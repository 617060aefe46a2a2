use crate::core::{ConfigProvider, ConversionMode};
use crate::domain::model::DEFAULT_RATE;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub rate: RateConfig,
    pub storage: StorageConfig,
    pub display: Option<DisplayConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    pub endpoint: String,
    pub from: String,
    pub to: String,
    pub timeout_seconds: Option<u64>,
    pub refresh_interval_seconds: Option<u64>,
    pub default_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub mode: Option<ConversionMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CalcError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CalcError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RATE_API_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Self::env_var_pattern()?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        Self::ensure_substituted("rate.endpoint", &self.rate.endpoint)?;
        Self::ensure_substituted("storage.path", &self.storage.path)?;

        validation::validate_url("rate.endpoint", &self.rate.endpoint)?;
        validation::validate_currency_code("rate.from", &self.rate.from)?;
        validation::validate_currency_code("rate.to", &self.rate.to)?;
        validation::validate_path("storage.path", &self.storage.path)?;

        if let Some(timeout) = self.rate.timeout_seconds {
            validation::validate_range("rate.timeout_seconds", timeout, 1, 120)?;
        }
        if let Some(interval) = self.rate.refresh_interval_seconds {
            validation::validate_positive_number("rate.refresh_interval_seconds", interval, 10)?;
        }
        if let Some(rate) = self.rate.default_rate {
            validation::validate_rate("rate.default_rate", rate)?;
        }

        if let Some(level) = self.log_level() {
            let valid_levels = ["error", "warn", "info", "debug", "trace"];
            if !valid_levels.contains(&level) {
                return Err(CalcError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    fn env_var_pattern() -> Result<Regex> {
        Regex::new(r"\$\{([^}]+)\}").map_err(|e| CalcError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })
    }

    /// 未設定的 ${VAR} 會原樣留在值裡
    fn ensure_substituted(field: &str, value: &str) -> Result<()> {
        let re = Self::env_var_pattern()?;

        match re.captures(value) {
            Some(caps) => Err(CalcError::MissingConfigError {
                field: format!("{} (environment variable {} is not set)", field, &caps[1]),
            }),
            None => Ok(()),
        }
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.rate.endpoint
    }

    fn from_currency(&self) -> &str {
        &self.rate.from
    }

    fn to_currency(&self) -> &str {
        &self.rate.to
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.rate.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn refresh_interval(&self) -> Option<Duration> {
        self.rate.refresh_interval_seconds.map(Duration::from_secs)
    }

    fn cache_path(&self) -> &str {
        &self.storage.path
    }

    fn default_rate(&self) -> f64 {
        self.rate.default_rate.unwrap_or(DEFAULT_RATE)
    }

    fn conversion_mode(&self) -> ConversionMode {
        self.display
            .as_ref()
            .and_then(|d| d.mode)
            .unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
