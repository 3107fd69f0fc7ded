use super::Value;

/// Format a value for display.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Number(n) => format_number(*n),
        Value::Error(err) => err.marker().to_string(),
    }
}

/// Format a number for display and for text concatenation.
///
/// Non-finite results are shown as-is rather than as errors.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}
