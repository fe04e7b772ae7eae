use unicode_width::UnicodeWidthStr;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places. Infinities and NaN print as `inf`, `-inf` and `NaN`.
///
/// # Examples
///
/// ```
/// use wrapped_report::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let negative = value < 0.0;
    let factor = 10_f64.powi(decimals as i32);
    let rounded = (value.abs() * factor).round() / factor;

    let grouped = group_thousands(&(rounded.trunc() as u64).to_string());
    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", rounded.fract(), prec = decimals as usize);
        // `frac_str` starts with "0."; keep the point and digits.
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a count with thousands separators.
///
/// ```
/// use wrapped_report::formatting::format_count;
///
/// assert_eq!(format_count(12_345), "12,345");
/// ```
pub fn format_count(count: u64) -> String {
    group_thousands(&count.to_string())
}

/// Hour of day as `"HH:00"`.
pub fn format_hour(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// `(part / whole) * 100`, rounded to one decimal; `0.0` when `whole` is zero.
pub fn share(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

/// Terminal column width of `s`; emoji and CJK count double.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Left-align `s` in a column `width` cells wide.
pub fn pad_right(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}

/// Right-align `s` in a column `width` cells wide.
pub fn pad_left(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", " ".repeat(fill), s)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let digits: Vec<char> = s.chars().collect();
    let lead = digits.len() % 3;
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, &c) in digits.iter().enumerate() {
        if i != 0 && i % 3 == lead {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_basic() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 1), "0.0");
        assert_eq!(format_number(123.456, 1), "123.5");
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
        assert_eq!(format_number(-0.01, 1), "0.0");
    }

    #[test]
    fn test_format_number_non_finite() {
        assert_eq!(format_number(f64::INFINITY, 1), "inf");
        assert_eq!(format_number(f64::NEG_INFINITY, 0), "-inf");
        assert_eq!(format_number(f64::NAN, 1), "NaN");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(0), "00:00");
        assert_eq!(format_hour(9), "09:00");
        assert_eq!(format_hour(23), "23:00");
    }

    #[test]
    fn test_share() {
        assert_eq!(share(1, 3), 33.3);
        assert_eq!(share(5, 0), 0.0);
        assert_eq!(share(4, 4), 100.0);
    }

    #[test]
    fn test_padding_counts_wide_characters() {
        assert_eq!(display_width("Callum"), 6);
        assert_eq!(display_width("🎉"), 2);
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("🎉", 4), "🎉  ");
        assert_eq!(pad_left("7", 3), "  7");
        assert_eq!(pad_right("too long", 3), "too long");
    }
}
