//! Display formatting for prices, percentages, and large counts.
//!
//! Presentation only. Nothing here feeds back into computed values.

pub const NOT_AVAILABLE: &str = "N/A";

/// `1234.5` → `"$1,234.50"` for USD, `"1,234.50 EUR"` for anything else.
pub fn format_currency(value: f64, currency: &str) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let grouped = group_thousands(value);
    if currency.eq_ignore_ascii_case("USD") {
        match grouped.strip_prefix('-') {
            Some(abs) => format!("-${abs}"),
            None => format!("${grouped}"),
        }
    } else {
        format!("{grouped} {currency}")
    }
}

/// Fraction to percent: `0.1234` → `"12.34%"`.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.*}%", decimals, value * 100.0)
}

/// Abbreviate with a K/M/B/T suffix and two decimals: `1_500_000` → `"1.50M"`.
pub fn format_large_number(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    const SCALES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];
    for (scale, suffix) in SCALES {
        if value.abs() >= scale {
            return format!("{:.2}{suffix}", value / scale);
        }
    }
    format!("{value:.2}")
}

/// Two decimals with comma-separated thousands.
fn group_thousands(value: f64) -> String {
    let s = format!("{:.2}", value.abs());
    let (int_part, dec_part) = s.split_once('.').unwrap_or((&s, "00"));
    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if value < 0.0 && s != "0.00" {
        grouped.push('-');
    }
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    grouped.push('.');
    grouped.push_str(dec_part);
    grouped
}
