// Coercion of loosely typed upstream payload values into finite numbers
use serde_json::Value;

/// Coerce an arbitrary JSON payload value into a finite number.
///
/// Numbers pass through when finite, strings go through [`coerce_str`],
/// everything else (null, booleans, arrays, objects) has no value.
pub fn coerce(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => coerce_str(s),
        _ => None,
    }
}

/// Parse the longest leading decimal prefix of `raw`.
///
/// `"45xyz"` yields 45, `"  -1.5e2 ppm"` yields -150, `"abc"` and `""` yield
/// nothing. Overflowing values (`"1e999"`) are rejected as non-finite.
pub fn coerce_str(raw: &str) -> Option<f64> {
    let prefix = numeric_prefix(raw.trim_start())?;
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn numeric_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // The exponent only belongs to the prefix when it carries digits
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    Some(&s[..end])
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_decimal_strings() {
        assert_eq!(coerce(&json!("12.5")), Some(12.5));
        assert_eq!(coerce(&json!("-3")), Some(-3.0));
        assert_eq!(coerce(&json!("+.5")), Some(0.5));
        assert_eq!(coerce(&json!("7.")), Some(7.0));
        assert_eq!(coerce(&json!("  42")), Some(42.0));
    }

    #[test]
    fn test_leading_prefix_parse() {
        assert_eq!(coerce(&json!("45xyz")), Some(45.0));
        assert_eq!(coerce_str("1.5e2 ug/m3"), Some(150.0));
        assert_eq!(coerce_str("3e"), Some(3.0));
        assert_eq!(coerce_str("3e+"), Some(3.0));
        assert_eq!(coerce_str("2.5E-1x"), Some(0.25));
        assert_eq!(coerce_str("12.4.7"), Some(12.4));
    }

    #[test]
    fn test_no_value_cases() {
        assert_eq!(coerce(&json!("abc")), None);
        assert_eq!(coerce(&json!("")), None);
        assert_eq!(coerce(&Value::Null), None);
        assert_eq!(coerce(&json!(true)), None);
        assert_eq!(coerce(&json!({"field1": "3"})), None);
        assert_eq!(coerce(&json!([1])), None);
        assert_eq!(coerce_str("."), None);
        assert_eq!(coerce_str("-"), None);
        assert_eq!(coerce_str("NaN"), None);
        assert_eq!(coerce_str("Infinity"), None);
        assert_eq!(coerce_str("1e999"), None);
    }

    #[test]
    fn test_json_numbers_pass_through() {
        assert_eq!(coerce(&json!(18)), Some(18.0));
        assert_eq!(coerce(&json!(29.4)), Some(29.4));
    }
}
