use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    pub initial_capital: f64,
    pub current_age: i32,
    pub target_age: i32,
    /// Annual rate in percent, e.g. 8.0 for 8%.
    pub annual_rate: f64,
    pub monthly_contribution: f64,
}

/// Form values as typed. Every field is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProjectionInput {
    pub initial_capital: Option<String>,
    pub current_age: Option<String>,
    pub target_age: Option<String>,
    pub annual_rate: Option<String>,
    pub monthly_contribution: Option<String>,
}

impl RawProjectionInput {
    /// Missing or malformed fields become zero.
    pub fn coerce(&self) -> ProjectionInput {
        ProjectionInput {
            initial_capital: coerce_real(self.initial_capital.as_deref()),
            current_age: coerce_integer(self.current_age.as_deref()),
            target_age: coerce_integer(self.target_age.as_deref()),
            annual_rate: coerce_real(self.annual_rate.as_deref()),
            monthly_contribution: coerce_real(self.monthly_contribution.as_deref()),
        }
    }
}

/// Parses the longest leading decimal number, ignoring leading whitespace.
pub fn coerce_real(text: Option<&str>) -> f64 {
    let Some(text) = text else {
        return 0.0;
    };
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match text[..end].parse::<f64>() {
        Ok(value) if !value.is_nan() => value,
        _ => 0.0,
    }
}

/// Parses the leading integer, ignoring leading whitespace and any fraction.
pub fn coerce_integer(text: Option<&str>) -> i32 {
    let Some(text) = text else {
        return 0;
    };
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }

    match text[..end].parse::<i64>() {
        Ok(value) => value.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        // Only overflow reaches here; saturate in the direction of the sign.
        Err(_) if bytes[0] == b'-' => i32::MIN,
        Err(_) => i32::MAX,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPoint {
    pub age: i64,
    pub total: f64,
    pub invested: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub final_value: f64,
    pub total_invested: f64,
    pub total_interest: f64,
    /// Interest over invested capital, in percent.
    pub yield_ratio: f64,
    /// Per-period rate, in percent.
    pub monthly_rate: f64,
    pub years: u32,
    pub yearly_series: Vec<YearPoint>,
}
