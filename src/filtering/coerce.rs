use super::tree::Scalar;

/// Convert one raw query value into the most specific scalar it represents.
///
/// First match wins:
/// 1. exactly `"true"` / `"false"` become booleans;
/// 2. a value that is numeric once surrounding whitespace is trimmed becomes a
///    number (the trimmed text is discarded);
/// 3. anything else is returned as the original, untrimmed string.
///
/// Numeric-looking identifiers therefore become numbers too: `"00042"` is `42`.
#[must_use]
pub fn coerce_value(raw: &str) -> Scalar {
    match raw {
        "true" => return Scalar::Bool(true),
        "false" => return Scalar::Bool(false),
        _ => {}
    }

    let trimmed = raw.trim();
    if !trimmed.is_empty()
        && let Some(number) = parse_number(trimmed)
    {
        return number;
    }

    Scalar::String(raw.to_string())
}

/// Split a raw value on commas and coerce every piece.
///
/// Always yields at least one element; `""` yields `[""]` and `"a,"` yields
/// `["a", ""]`.
#[must_use]
pub fn coerce_list(raw: &str) -> Vec<Scalar> {
    raw.split(',').map(coerce_value).collect()
}

fn parse_number(text: &str) -> Option<Scalar> {
    if let Some(value) = parse_prefixed_integer(text) {
        return Some(Scalar::Int(value));
    }
    if let Ok(value) = text.parse::<i64>() {
        return Some(Scalar::Int(value));
    }
    // Rust accepts "inf" and "NaN" here; those stay strings.
    let is_decimal = text
        .bytes()
        .all(|byte| byte.is_ascii_digit() || matches!(byte, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !is_decimal {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(number_scalar)
}

/// 2^63, the first value past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A finite number in canonical form: integral values that fit an `i64` are
/// integers, so `2`, `2.0` and `2e0` all compare equal.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn number_scalar(value: f64) -> Scalar {
    if value.trunc() == value && (-I64_BOUND..I64_BOUND).contains(&value) {
        Scalar::Int(value as i64)
    } else {
        Scalar::Float(value)
    }
}

/// `0x1F`, `0o17` and `0b101` integer literals.
fn parse_prefixed_integer(text: &str) -> Option<i64> {
    let (radix, digits) = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| text.strip_prefix(*prefix).map(|digits| (*radix, digits)))?;
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}
