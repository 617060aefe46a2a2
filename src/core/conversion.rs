//! Currency projections of the display buffer. Read-only: nothing here
//! touches the buffer itself.

use crate::domain::model::{ConversionMode, ConversionRate, ERROR_MARKER};

/// Read the display as a plain decimal. Grouping separators produced by the
/// formatter are ignored; anything else that does not parse counts as `0`.
pub fn buffer_amount(display: &str) -> f64 {
    let cleaned: String = display.chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// 來源 -> 目標 (例如 EUR -> JPY)，取整數
pub fn source_to_target(amount: f64, rate: f64) -> String {
    whole_number(amount * rate)
}

/// Integer part of `value` with every digit written out. `f64`'s `Display`
/// never switches to exponent notation, so large products stay exact.
pub fn whole_number(value: f64) -> String {
    let truncated = value.trunc();
    if !truncated.is_finite() {
        ERROR_MARKER.to_string()
    } else if truncated == 0.0 {
        "0".to_string()
    } else {
        format!("{}", truncated)
    }
}

/// 目標 -> 來源 (例如 JPY -> EUR)，固定兩位小數
pub fn target_to_source(amount: f64, rate: f64) -> String {
    format!("{:.2}", amount / rate)
}

pub fn project(display: &str, rate: &ConversionRate, mode: ConversionMode) -> Option<String> {
    let amount = buffer_amount(display);
    match mode {
        ConversionMode::Off => None,
        ConversionMode::SourceToTarget => Some(source_to_target(amount, rate.value())),
        ConversionMode::TargetToSource => Some(target_to_source(amount, rate.value())),
    }
}
