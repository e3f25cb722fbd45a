//! Report and log formatting utilities

/// Format a monetary amount with thousands separators and two decimals
/// (e.g. `1234567.891` → `"1,234,567.89"`).
#[must_use]
pub fn format_amount(value: f64) -> String {
    let negative = value.is_sign_negative() && value != 0.0;
    let rounded = format!("{:.2}", value.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{grouped}.{frac}")
    } else {
        format!("{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(150.0), "150.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(11030000.0), "11,030,000.00");
        assert_eq!(format_amount(-2500.5), "-2,500.50");
    }
}
