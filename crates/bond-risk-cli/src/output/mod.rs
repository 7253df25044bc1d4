pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a JSON scalar without quotes; nested values stay as compact JSON.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The `result` object of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_scalar() {
        assert_eq!(format_scalar(&json!("0.051322")), "0.051322");
        assert_eq!(format_scalar(&json!(7.0)), "7.0");
        assert_eq!(format_scalar(&json!(true)), "true");
        assert_eq!(format_scalar(&Value::Null), "");
        assert_eq!(format_scalar(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_result_of_envelope() {
        let env = json!({"result": {"ytm": "0.05"}, "warnings": []});
        assert_eq!(result_of(&env), &json!({"ytm": "0.05"}));
        let bare = json!({"ytm": "0.05"});
        assert_eq!(result_of(&bare), &bare);
    }
}
