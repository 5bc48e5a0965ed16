use serde_json::Value;

/// Result fields that carry the headline answer, most specific first.
const PRIORITY_KEYS: [&str; 8] = [
    "total_monthly_payment",
    "max_home_price",
    "break_even_months",
    "break_even_year",
    "annual_tax",
    "initial_payment",
    "monthly_payment",
    "recommendation",
];

/// Print just the headline value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

/// First non-null priority field of the result, else its first field.
fn headline(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
