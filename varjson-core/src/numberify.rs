//! Convert numeric-looking strings into JSON numbers.

use std::collections::HashSet;

use serde_json::{Number, Value};

///
/// Recursively turn string leaves that look like integers or decimals into numbers.
///
/// Values under a key in `exempt` are left alone, whatever their shape. Booleans,
/// numbers and non-numeric strings are untouched, so applying this twice gives the
/// same result as applying it once.
///
/// # Arguments
/// * `value` - the tree to rewrite in place
/// * `exempt` - keys whose values are identifiers that only happen to be numeric
///
pub fn numberify(value: &mut Value, exempt: &HashSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if !exempt.contains(key) {
                    numberify(child, exempt);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                numberify(item, exempt);
            }
        }
        Value::String(s) => {
            if let Some(number) = parse_number(s) {
                *value = Value::Number(number);
            }
        }
        _ => {}
    }
}

/// Parse `s` as a JSON number if it is lexically an integer or a decimal.
pub fn parse_number(s: &str) -> Option<Number> {
    if !looks_like_number(s) {
        return None;
    }
    if !s.contains(['.', 'e', 'E']) {
        if let Ok(i) = s.parse::<i64>() {
            return Some(Number::from(i));
        }
        if let Ok(u) = s.parse::<u64>() {
            return Some(Number::from(u));
        }
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn looks_like_number(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());

    let mut parts = mantissa.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();
    if !all_digits(whole) {
        return false;
    }
    match fraction {
        Some(f) if !all_digits(f) || (whole.is_empty() && f.is_empty()) => return false,
        None if whole.is_empty() => return false,
        _ => {}
    }

    match exponent {
        Some(e) => {
            let e = e.strip_prefix(['-', '+']).unwrap_or(e);
            !e.is_empty() && all_digits(e)
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    #[fixture]
    fn exempt() -> HashSet<String> {
        ["gene_id", "id"].iter().map(|k| k.to_string()).collect()
    }

    #[rstest]
    #[case("34", Some(json!(34)))]
    #[case("-2", Some(json!(-2)))]
    #[case("0.02", Some(json!(0.02)))]
    #[case("0.0", Some(json!(0.0)))]
    #[case(".5", Some(json!(0.5)))]
    #[case("1e-5", Some(json!(0.00001)))]
    #[case("18446744073709551615", Some(json!(18446744073709551615u64)))]
    #[case("2/5", None)]
    #[case("rs123", None)]
    #[case("", None)]
    #[case(".", None)]
    #[case("-", None)]
    #[case("1e", None)]
    #[case("NaN", None)]
    #[case("inf", None)]
    fn test_parse_number(#[case] raw: &str, #[case] expected: Option<Value>) {
        assert_eq!(parse_number(raw).map(Value::Number), expected);
    }

    #[rstest]
    fn test_numberify_nested(exempt: HashSet<String>) {
        let mut value = json!({
            "start": "100",
            "flag": true,
            "gene_id": "12345",
            "pubmed": ["111", "222"],
            "frequencies": {"T": {"afr": "0.1"}},
            "nested": [{"id": "42", "score": "0.5"}]
        });

        numberify(&mut value, &exempt);

        assert_eq!(
            value,
            json!({
                "start": 100,
                "flag": true,
                "gene_id": "12345",
                "pubmed": [111, 222],
                "frequencies": {"T": {"afr": 0.1}},
                "nested": [{"id": "42", "score": 0.5}]
            })
        );
    }

    #[rstest]
    fn test_exempt_key_skips_whole_subtree(exempt: HashSet<String>) {
        let mut value = json!({"id": {"inner": "7"}});
        numberify(&mut value, &exempt);
        assert_eq!(value, json!({"id": {"inner": "7"}}));
    }

    #[rstest]
    fn test_numberify_is_idempotent(exempt: HashSet<String>) {
        let mut once = json!({"a": "1", "b": ["2.5", "x"], "c": {"gene_id": "9", "d": "-3"}});
        numberify(&mut once, &exempt);
        let mut twice = once.clone();
        numberify(&mut twice, &exempt);
        assert_eq!(once, twice);
    }
}
