use serde_json::Value;
use std::io::{self, Write};

use super::{format_scalar, result_of};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

/// Positions become rows when present; otherwise a two-column field/value sheet.
fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            if let Some(Value::Array(positions)) = result.get("positions") {
                write_array_csv(wtr, positions);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in result {
                    let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
                }
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr),
        other => {
            let _ = wtr.write_record([&format_scalar(other)]);
        }
    }
}

fn write_array_csv<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_scalar(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value);
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_field_value_sheet() {
        let out = render(&json!({"result": {"ytm": "0.051322"}}));
        assert_eq!(out, "field,value\nytm,0.051322\n");
    }

    #[test]
    fn test_positions_as_rows() {
        let out = render(&json!({"result": {
            "weighted_modified_duration": 7.0,
            "positions": [
                {"market_value": "60000", "weight": "0.6"},
                {"market_value": "40000", "weight": "0.4"}
            ]
        }}));
        assert_eq!(out, "market_value,weight\n60000,0.6\n40000,0.4\n");
    }
}
