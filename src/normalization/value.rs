use serde_json::Value;

/// Whether an imported value counts as "no data" and is skipped.
///
/// Follows the import's falsy rule: null, `false`, numeric zero, empty arrays and
/// objects, and strings that are blank or exactly `"0"`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().map_or(false, |n| n == 0.0),
        Value::String(s) => is_blank_str(s),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Blank or whitespace-only, or the string `"0"`.
pub fn is_blank_str(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_whitespace_are_blank() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!(" \t ")));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));
    }

    #[test]
    fn falsy_scalars_are_blank() {
        assert!(is_blank(&json!(0)));
        assert!(is_blank(&json!(0.0)));
        assert!(is_blank(&json!("0")));
        assert!(is_blank(&json!(false)));
        assert!(is_blank_str(" 0 "));
    }

    #[test]
    fn truthy_values_are_kept() {
        assert!(!is_blank(&json!("x")));
        assert!(!is_blank(&json!(1)));
        assert!(!is_blank(&json!(-2.5)));
        assert!(!is_blank(&json!(true)));
        assert!(!is_blank(&json!("00")));
        assert!(!is_blank(&json!(["a"])));
        assert!(!is_blank_str("0.0"));
    }
}
