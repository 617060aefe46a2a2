use crate::utils::error::{CalcError, EvalError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 求值失敗時顯示在畫面上的標記
pub const ERROR_MARKER: &str = "Error";

/// 尚未取得匯率前使用的預設值 (1 EUR = 170 JPY)
pub const DEFAULT_RATE: f64 = 170.0;

/// 原始計算機的按鍵配置
pub const KEYPAD: [[&str; 4]; 5] = [
    ["C", "⌫", "%", "÷"],
    ["7", "8", "9", "×"],
    ["4", "5", "6", "-"],
    ["1", "2", "3", "+"],
    ["00", "0", ".", "="],
];

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    /// Always finite.
    Number(f64),
    Error(EvalError),
}

impl EvaluationResult {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Error(_) => None,
        }
    }

    /// 格式化後的結果，錯誤一律為 "Error"
    pub fn to_display(&self) -> String {
        match self {
            Self::Number(value) => crate::core::format::format_number(*value)
                .unwrap_or_else(|| ERROR_MARKER.to_string()),
            Self::Error(_) => ERROR_MARKER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Clear,
    Backspace,
    Percent,
    Equals,
    /// Digit, operator, decimal point, "00" or a parenthesis.
    Literal(String),
}

impl FromStr for InputEvent {
    type Err = CalcError;

    fn from_str(label: &str) -> Result<Self> {
        match label {
            "C" | "c" => Ok(Self::Clear),
            "⌫" | "<" => Ok(Self::Backspace),
            "%" => Ok(Self::Percent),
            "=" => Ok(Self::Equals),
            "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" | "00" | "." | "+" | "-"
            | "*" | "/" | "×" | "÷" | "(" | ")" => Ok(Self::Literal(label.to_string())),
            _ => Err(CalcError::UnknownButtonError {
                label: label.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRate {
    value: f64,
    date: String,
}

impl ConversionRate {
    pub fn new(value: f64, date: impl Into<String>) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CalcError::InvalidRateError { value });
        }
        Ok(Self {
            value,
            date: date.into(),
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// 匯率日期 (例如 "2024-05-17")，尚未取得時為空字串
    pub fn date(&self) -> &str {
        &self.date
    }
}

impl Default for ConversionRate {
    fn default() -> Self {
        Self {
            value: DEFAULT_RATE,
            date: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Default,
    Live,
    Cached,
}

impl fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RateOrigin::Default => "default",
            RateOrigin::Live => "live",
            RateOrigin::Cached => "cached",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionData {
    pub rate: ConversionRate,
    pub origin: RateOrigin,
}

impl ConversionData {
    pub fn new(rate: ConversionRate, origin: RateOrigin) -> Self {
        Self { rate, origin }
    }

    pub fn fallback(default_rate: f64) -> Self {
        let rate = ConversionRate::new(default_rate, "").unwrap_or_default();
        Self::new(rate, RateOrigin::Default)
    }
}

/// 本地快取的最後一次成功匯率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRate {
    pub rate: f64,
    pub date: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredRate {
    pub fn from_rate(rate: &ConversionRate) -> Self {
        Self {
            rate: rate.value(),
            date: rate.date().to_string(),
            saved_at: Utc::now(),
        }
    }

    pub fn to_rate(&self) -> Result<ConversionRate> {
        ConversionRate::new(self.rate, self.date.clone())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ConversionMode {
    #[default]
    Off,
    SourceToTarget,
    TargetToSource,
}

impl ConversionMode {
    /// OFF -> 來源/目標 -> 目標/來源 -> OFF
    pub fn next(self) -> Self {
        match self {
            ConversionMode::Off => ConversionMode::SourceToTarget,
            ConversionMode::SourceToTarget => ConversionMode::TargetToSource,
            ConversionMode::TargetToSource => ConversionMode::Off,
        }
    }

    pub fn label(&self, from: &str, to: &str) -> String {
        match self {
            ConversionMode::Off => "OFF".to_string(),
            ConversionMode::SourceToTarget => format!("{}/{}", from, to),
            ConversionMode::TargetToSource => format!("{}/{}", to, from),
        }
    }
}

impl FromStr for ConversionMode {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "source-to-target" => Ok(Self::SourceToTarget),
            "target-to-source" => Ok(Self::TargetToSource),
            other => Err(CalcError::InvalidConfigValueError {
                field: "mode".to_string(),
                value: other.to_string(),
                reason: "Expected off, source-to-target or target-to-source".to_string(),
            }),
        }
    }
}
