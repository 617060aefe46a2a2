//! Display formatting for evaluation results.
//!
//! Mirrors a `#,###.########` pattern: thousands separators, at most eight
//! fractional digits, no trailing zeros and never scientific notation.

pub const MAX_FRACTION_DIGITS: usize = 8;

/// Format a finite number for the display. Returns `None` for NaN or infinity.
pub fn format_number(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    // `{:.N}` 固定小數位，不會產生科學記號
    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    let (negative, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed.as_str()),
    };

    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let frac_part = frac_part.trim_end_matches('0');
    let grouped = group_thousands(int_part);

    // 四捨五入後為 0 時不顯示負號
    let is_zero = frac_part.is_empty() && int_part.chars().all(|c| c == '0');
    let sign = if negative && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        Some(format!("{}{}", sign, grouped))
    } else {
        Some(format!("{}{}.{}", sign, grouped, frac_part))
    }
}

/// Insert a `,` every three digits, counting from the right.
pub fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
