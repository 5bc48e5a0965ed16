use serde_json::{Map, Value};
use std::io;

/// Result fields holding one row per period, in the order they are looked for.
const ROW_FIELDS: [&str; 3] = ["schedule", "projections", "exemptions"];

/// Write output as CSV to stdout.
///
/// A result with a per-period collection (amortization schedule, ARM years,
/// rent-vs-buy projections) is written one row per period so it opens
/// directly in a spreadsheet. Anything else becomes `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => match row_collection(result) {
                Some(rows) => write_array_csv(&mut wtr, rows),
                None => write_pairs(&mut wtr, result),
            },
            _ => write_pairs(&mut wtr, map),
        },
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn row_collection(result: &Map<String, Value>) -> Option<&[Value]> {
    ROW_FIELDS.iter().find_map(|field| match result.get(*field) {
        Some(Value::Array(rows)) if !rows.is_empty() => Some(rows.as_slice()),
        _ => None,
    })
}

fn write_pairs(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_preferred_over_pairs() {
        let result = json!({
            "monthly_payment": "536.82",
            "schedule": [{ "payment_index": 1 }]
        });
        let rows = row_collection(result.as_object().unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_empty_exemptions_fall_back_to_pairs() {
        let result = json!({ "annual_tax": "9525", "exemptions": [] });
        assert!(row_collection(result.as_object().unwrap()).is_none());
    }
}
