//! Number formatting for report cells.

/// Placeholder for metrics that could not be determined.
pub const NOT_AVAILABLE: &str = "N/D";

/// `$1,234.56`
pub fn format_price(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}", sign, with_separators(&format!("{:.2}", value.abs())))
}

/// Fraction as a percentage: `0.1234` -> `12.34%`
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn format_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

/// Whole currency units with thousands separators: `-1,234,567`
pub fn format_amount(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}", sign, with_separators(&format!("{:.0}", value.abs())))
}

/// Insert `,` every three digits of the integer part of an unsigned decimal string.
fn with_separators(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}
