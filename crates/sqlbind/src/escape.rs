//! Value canonicalization applied just before parameter materialization

use crate::value::Value;

/// Canonicalize a value for binding.
///
/// Dates render as `YYYY-MM-DD` text and timestamps as
/// `YYYY-MM-DD HH:MM:SS` text; every other variant passes through untouched.
/// Builders call this exactly once, on the final parameter vector.
pub fn escape(value: Value) -> Value {
    match value {
        Value::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        other => other,
    }
}

const DENYLIST: &[&str] = &["--", "/*", "*/", ";", "'", "\""];

/// Strip denylisted SQL tokens from a raw string.
///
/// This is a blunt secondary defense for text that must be interpolated into
/// identifiers or other non-parameterizable positions. It is intentionally
/// not applied to bound parameters, which are already safe by construction.
pub fn scrub(input: &str) -> String {
    let mut out = input.to_owned();
    for token in DENYLIST {
        out = out.replace(token, " ");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_date_canonicalization() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(escape(Value::Date(date)), Value::Text("2024-01-05".into()));
        let dt = date.and_hms_opt(9, 5, 1).unwrap();
        assert_eq!(
            escape(Value::DateTime(dt)),
            Value::Text("2024-01-05 09:05:01".into())
        );
    }

    #[test]
    fn test_passthrough_and_idempotence() {
        assert_eq!(escape(Value::Int(7)), Value::Int(7));
        assert_eq!(escape(Value::Null), Value::Null);
        let once = escape(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()));
        assert_eq!(escape(once.clone()), once);
    }

    #[test]
    fn test_scrub_removes_tokens() {
        assert_eq!(scrub("a';--b"), "a   b");
        assert_eq!(scrub("/*x*/"), " x ");
        assert_eq!(scrub("plain text"), "plain text");
    }
}
