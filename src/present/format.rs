//! Number formatting for the fixed display locale: comma thousands separator,
//! dot decimal separator, currency symbol `$` in front.

pub const RATE_PRESETS: [f64; 4] = [5.0, 8.0, 10.0, 12.0];

/// Preset whose rate equals `rate` exactly, if any.
pub fn active_preset(rate: f64) -> Option<f64> {
    RATE_PRESETS.iter().copied().find(|preset| *preset == rate)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_grouped(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');

    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

pub fn format_currency(value: f64) -> String {
    format!("${}", format_grouped(value, 2))
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_grouped(value, 2))
}

/// Compact tick label for the growth chart's value axis.
pub fn format_axis_currency(value: f64) -> String {
    if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.0}K", value / 1e3)
    } else {
        let fixed = format!("{value:.2}");
        match fixed.trim_end_matches('0').trim_end_matches('.') {
            "-0" | "" => "$0".to_string(),
            digits => format!("${digits}"),
        }
    }
}

/// Share of `part` in `whole` with one decimal, "0" when `whole` is not positive.
pub fn format_share(part: f64, whole: f64) -> String {
    if whole > 0.0 {
        format!("{:.1}", part / whole * 100.0)
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_uses_two_decimals_and_grouping() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1_268.2503), "$1,268.25");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(100_000.0), "$100,000.00");
    }

    #[test]
    fn negative_currency_keeps_sign_after_symbol() {
        assert_eq!(format_currency(-1_234.5), "$-1,234.50");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn non_finite_values_do_not_panic() {
        assert_eq!(format_currency(f64::INFINITY), "$∞");
        assert_eq!(format_currency(f64::NEG_INFINITY), "$-∞");
        assert_eq!(format_percent(f64::NAN), "NaN%");
    }

    #[test]
    fn percent_uses_two_decimals() {
        assert_eq!(format_percent(1.0), "1.00%");
        assert_eq!(format_percent(12.5), "12.50%");
        assert_eq!(format_percent(1_500.0), "1,500.00%");
    }

    #[test]
    fn axis_labels_are_compact() {
        assert_eq!(format_axis_currency(2_500_000.0), "$2.5M");
        assert_eq!(format_axis_currency(25_000.0), "$25K");
        assert_eq!(format_axis_currency(500.0), "$500");
        assert_eq!(format_axis_currency(0.0), "$0");
    }

    #[test]
    fn small_axis_values_keep_at_most_two_decimals() {
        assert_eq!(format_axis_currency(200.0 / 3.0), "$66.67");
        assert_eq!(format_axis_currency(0.5), "$0.5");
        assert_eq!(format_axis_currency(120.0), "$120");
        assert_eq!(format_axis_currency(999.999), "$1000");
        assert_eq!(format_axis_currency(-0.001), "$0");
        assert_eq!(format_axis_currency(-40.25), "$-40.25");
    }

    #[test]
    fn share_guards_empty_whole() {
        assert_eq!(format_share(25.0, 100.0), "25.0");
        assert_eq!(format_share(1.0, 3.0), "33.3");
        assert_eq!(format_share(5.0, 0.0), "0");
    }

    #[test]
    fn presets_match_exact_rates_only() {
        assert_eq!(active_preset(8.0), Some(8.0));
        assert_eq!(active_preset(8.01), None);
        assert_eq!(active_preset(0.0), None);
    }
}
