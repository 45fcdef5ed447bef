//! Number parsing and formatting with browser semantics.
//!
//! The editor reads digit counts the way `parseInt` does and rounds the way
//! `Number.prototype.toFixed` does, so the functions here reproduce those
//! rules exactly rather than Rust's own (ties-to-even) formatting.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::SvgpadError;

/// Largest digit count accepted by [`to_fixed`].
pub const MAX_FRACTION_DIGITS: u32 = 100;

/// From this magnitude on, fixed-point formatting prints the plain number.
const FIXED_LIMIT: f64 = 1e21;

/// Format `value` with exactly `digits` fractional digits.
///
/// Rounding works on the exact binary value of `value`, so `1.005` (stored as
/// `1.00499…`) becomes `"1.00"`. Exact ties round away from zero.
pub fn to_fixed(value: f64, digits: u32) -> Result<String, SvgpadError> {
    if digits > MAX_FRACTION_DIGITS {
        return Err(SvgpadError::FractionDigits(digits));
    }
    Ok(fixed(value, digits as usize))
}

/// Round `value` to `digits` fractional digits.
pub fn round_to(value: f64, digits: u32) -> Result<f64, SvgpadError> {
    let text = to_fixed(value, digits)?;
    Ok(text.parse().unwrap_or(value))
}

/// Caller guarantees `digits <= MAX_FRACTION_DIGITS`.
pub(crate) fn fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() || value.abs() >= FIXED_LIMIT {
        return shortest(value);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    let text = if is_tie(magnitude, digits) {
        // A tie is exactly representable with one more digit, ending in 5.
        let exact = format!("{magnitude:.prec$}", prec = digits + 1);
        let mut truncated = exact[..exact.len() - 1].to_string();
        if truncated.ends_with('.') {
            truncated.pop();
        }
        increment_last_digit(&truncated)
    } else {
        format!("{magnitude:.digits$}")
    };

    format!("{sign}{text}")
}

/// `magnitude` sits exactly halfway between two `digits`-digit decimals iff
/// `magnitude * 2^(digits + 1)` is an odd integer.
fn is_tie(magnitude: f64, digits: usize) -> bool {
    let scaled = magnitude * 2f64.powi(digits as i32 + 1);
    scaled.is_finite() && scaled.fract() == 0.0 && scaled % 2.0 == 1.0
}

fn increment_last_digit(text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    let mut carry = true;

    for c in chars.iter_mut().rev() {
        match *c {
            '9' => *c = '0',
            '0'..='8' => {
                *c = char::from(*c as u8 + 1);
                carry = false;
                break;
            }
            _ => {}
        }
    }

    let mut out = String::with_capacity(chars.len() + 1);
    if carry {
        out.push('1');
    }
    out.extend(chars);
    out
}

/// Shortest decimal text that parses back to `value`, without exponent.
///
/// Integral values drop their fractional part and negative zero prints as `0`.
pub fn shortest(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }

    let mut buffer = ryu::Buffer::new();
    let text = buffer.format_finite(value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => expand_exponent(mantissa, exponent),
        None => text.strip_suffix(".0").unwrap_or(text).to_string(),
    }
}

/// Write ryu's `d.ddde±x` form out as plain decimal digits.
fn expand_exponent(mantissa: &str, exponent: &str) -> String {
    let exponent: i64 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{int}{frac}");
    let point = int.len() as i64 + exponent;

    let body = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if point as usize >= digits.len() {
        format!("{digits}{}", "0".repeat(point as usize - digits.len()))
    } else {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{whole}.{fraction}")
    };
    format!("{sign}{body}")
}

/// Read a digit count from user input the way `parseInt(input, 10)` does.
///
/// Leading whitespace and a sign are accepted, trailing junk is ignored.
/// Negative counts and non-numbers return `None`; `"-0"` is zero.
pub fn parse_precision(input: &str) -> Option<u32> {
    let s = input.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    let digits = s[..end].trim_start_matches('0');

    if digits.is_empty() {
        return Some(0);
    }
    if negative {
        return None;
    }
    Some(digits.parse().unwrap_or(u32::MAX))
}

/// Parse the longest numeric prefix of `input` the way `parseFloat` does.
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
            .expect("valid regex")
    });

    let m = re.find(input.trim_start())?;
    m.as_str().parse().ok()
}
