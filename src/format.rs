//! Presentation helpers
//!
//! Engines keep full precision; values are rounded only when displayed.

/// Round to cents, half away from zero
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format as dollars with thousands separators, e.g. `$1,234.50`
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Format a fraction as a percentage, e.g. `0.1234` -> `12.34%`
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}
