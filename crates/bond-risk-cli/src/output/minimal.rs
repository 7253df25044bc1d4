use serde_json::Value;

use super::{format_scalar, result_of};

/// Key answer fields, most specific first.
const PRIORITY_KEYS: [&str; 4] = ["value", "weighted_modified_duration", "ytm", "modified_duration"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result_obj = result_of(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_scalar(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }

    format_scalar(result_obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_value_preferred() {
        let out = json!({"result": {"metric": "ytm", "value": 0.051322, "ytm": "0.051322"}});
        assert_eq!(minimal_answer(&out), "0.051322");
    }

    #[test]
    fn test_portfolio_duration() {
        let out = json!({"result": {"total_market_value": "100000", "weighted_modified_duration": 7.0}});
        assert_eq!(minimal_answer(&out), "7.0");
    }

    #[test]
    fn test_ytm_before_durations() {
        let out = json!({"result": {"macaulay_duration": 1.9, "modified_duration": 1.89, "ytm": "0.05"}});
        assert_eq!(minimal_answer(&out), "0.05");
    }
}
