//! # Formatting Helpers
//!
//! Indonesian-style number and currency formatting.
//!
//! ```text
//! 44642.857  ──format_rupiah──►  "Rp 44.643"
//! 1234.5     ──format_decimal─►  "1.234,50"
//! 20         ──format_percentage► "20%"
//! "Rp 10.000" ──parse_currency─► 10000
//! ```
//!
//! Thousands are separated with `.`, decimals with `,`.

use crate::money::Money;

/// Groups the digits of an integer with `.` every three places.
///
/// ```rust
/// use hpp_core::format::group_thousands;
///
/// assert_eq!(group_thousands(1_234_567), "1.234.567");
/// assert_eq!(group_thousands(-25_000), "-25.000");
/// ```
pub fn group_thousands(value: i64) -> String {
    group_digits(&value.to_string())
}

/// Groups a plain digit string (optionally prefixed by `-`).
fn group_digits(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}{}", sign, grouped)
}

/// Formats an amount as Rupiah, rounded to a whole Rupiah.
///
/// Non-finite input formats as zero.
///
/// ```rust
/// use hpp_core::format::format_rupiah;
///
/// assert_eq!(format_rupiah(44_642.857, true), "Rp 44.643");
/// assert_eq!(format_rupiah(10_000.0, false), "10.000");
/// assert_eq!(format_rupiah(f64::NAN, true), "Rp 0");
/// ```
pub fn format_rupiah(value: f64, with_symbol: bool) -> String {
    let formatted = format_number(value);
    if with_symbol {
        format!("Rp {}", formatted)
    } else {
        formatted
    }
}

/// Formats a number rounded to an integer with `.` thousands separators.
pub fn format_number(value: f64) -> String {
    group_thousands(Money::round_half_up(value).rupiah())
}

/// Formats a number with a fixed count of decimals, `,` as decimal mark.
///
/// ```rust
/// use hpp_core::format::format_decimal;
///
/// assert_eq!(format_decimal(1234.5, 2), "1.234,50");
/// assert_eq!(format_decimal(2.0, 0), "2");
/// ```
pub fn format_decimal(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.*}", decimals, value);
    match fixed.split_once('.') {
        Some((whole, frac)) => format!("{},{}", group_digits(whole), frac),
        None => group_digits(&fixed),
    }
}

/// Formats a percentage value as entered, e.g. `20%` or `12.5%`.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "0%".to_string();
    }
    format!("{}%", value)
}

/// Reads a currency string by keeping only its digits.
///
/// `"Rp 10.000"` and `"10000"` both read as `10000`; text without digits
/// reads as `0`.
pub fn parse_currency(text: &str) -> i64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Reads a percentage string such as `"20%"` or `"12.5"`.
///
/// Anything other than digits and `.` is ignored; text after a second `.`
/// is dropped. Unreadable input reads as `0.0`.
pub fn parse_percentage(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let number = match cleaned.match_indices('.').nth(1) {
        Some((second_dot, _)) => &cleaned[..second_dot],
        None => cleaned.as_str(),
    };

    number.parse().unwrap_or(0.0)
}

/// Reads the number at the start of `text`, keeping its sign.
///
/// Leading whitespace is skipped and anything after the number is ignored,
/// so `"-20%"` reads as `-20.0`. Returns `None` when no digits lead.
///
/// ```rust
/// use hpp_core::format::parse_leading_number;
///
/// assert_eq!(parse_leading_number(" -12.5 %"), Some(-12.5));
/// assert_eq!(parse_leading_number("%20"), None);
/// ```
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        has_digits |= frac_end > end + 1;
        if has_digits {
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse().ok().filter(|v: &f64| v.is_finite())
}
