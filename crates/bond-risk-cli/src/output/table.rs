use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::format_scalar;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_envelope(result, map),
            None => println!("{}", field_table(map)),
        },
        _ => println!("{}", format_scalar(value)),
    }
}

fn print_envelope(result: &Value, envelope: &Map<String, Value>) {
    if let Value::Object(res_map) = result {
        let scalars: Map<String, Value> = res_map
            .iter()
            .filter(|(_, v)| !v.is_array())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        println!("{}", field_table(&scalars));

        if let Some(Value::Array(positions)) = res_map.get("positions") {
            if !positions.is_empty() {
                println!("\nPositions:");
                println!("{}", array_table(positions));
            }
        }
    } else {
        println!("{}", format_scalar(result));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
    if let Some(Value::String(date)) = envelope
        .get("assumptions")
        .and_then(|a| a.get("settlement_date"))
    {
        println!("Settlement: {}", date);
    }
}

fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_scalar(val)]);
    }
    builder.build()
}

fn array_table(arr: &[Value]) -> Table {
    let mut builder = Builder::default();
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        builder.push_record(headers.clone());
        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_table_contains_values() {
        let map = json!({"ytm": "0.051322", "converged": true});
        let rendered = field_table(map.as_object().unwrap()).to_string();
        assert!(rendered.contains("0.051322"));
        assert!(rendered.contains("converged"));
    }

    #[test]
    fn test_array_table_has_header_and_rows() {
        let rows = json!([
            {"bond_id": 1, "weight": "0.6"},
            {"bond_id": 2, "weight": "0.4"}
        ]);
        let rendered = array_table(rows.as_array().unwrap()).to_string();
        assert!(rendered.contains("bond_id"));
        assert!(rendered.contains("0.4"));
    }
}
