//! Coercion matrix between [`Value`] variants and concrete field types
//!
//! Every conversion is lossy by contract: an unparseable input yields `None`
//! (mapped to null by callers) rather than an error. Floats narrow to
//! integers by truncation toward zero.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::value::{FromValue, Value};

pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Int(i) => Some(*i),
        Value::Float(f) => Some(*f as i64),
        Value::Decimal(d) => d.to_i64(),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Decimal(d) => d.to_f64(),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Bool(b) => Some(Decimal::from(u8::from(*b))),
        Value::Int(i) => Some(Decimal::from(*i)),
        Value::Float(f) => Decimal::from_f64(*f),
        Value::Decimal(d) => Some(*d),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::Decimal(d) => Some(!d.is_zero()),
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Decimal(d) => Some(d.to_string()),
        Value::Text(s) => Some(s.clone()),
        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => Some(t.format("%H:%M:%S").to_string()),
        Value::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

pub fn to_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Bytes(b) => Some(b.clone()),
        other => to_text(other).map(String::into_bytes),
    }
}

pub fn to_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date()),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn to_time(value: &Value) -> Option<NaiveTime> {
    match value {
        Value::Time(t) => Some(*t),
        Value::DateTime(dt) => Some(dt.time()),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn to_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        // A bare date expands with a zero time of day
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::Text(s) => {
            let s = s.trim();
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .or_else(|| s.parse().ok())
                .or_else(|| s.parse::<NaiveDate>().ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
        }
        _ => None,
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        to_i64(value)
    }
}

macro_rules! impl_from_value_narrow_int {
    ($($ty:ty),*) => {
        $(impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                to_i64(value).and_then(|i| <$ty>::try_from(i).ok())
            }
        })*
    };
}

impl_from_value_narrow_int!(i8, i16, i32, u8, u16, u32);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        to_f64(value)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        to_f64(value).map(|f| f as f32)
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value) -> Option<Self> {
        to_decimal(value)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        to_bool(value)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        to_text(value)
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Option<Self> {
        to_bytes(value)
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Option<Self> {
        to_date(value)
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: &Value) -> Option<Self> {
        to_time(value)
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Option<Self> {
        to_datetime(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            Some(T::from_value(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_widening_and_narrowing() {
        assert_eq!(i64::from_value(&Value::Int(42)), Some(42));
        assert_eq!(i32::from_value(&Value::Int(42)), Some(42));
        assert_eq!(i8::from_value(&Value::Int(300)), None);
        assert_eq!(i64::from_value(&Value::Float(3.9)), Some(3));
        assert_eq!(i64::from_value(&Value::Float(-3.9)), Some(-3));
        assert_eq!(f64::from_value(&Value::Int(2)), Some(2.0));
        assert_eq!(i64::from_value(&Value::Text(" 17 ".into())), Some(17));
        assert_eq!(i64::from_value(&Value::Text("abc".into())), None);
    }

    #[test]
    fn test_bool_tokens() {
        for token in ["true", "1", "YES", "on"] {
            assert_eq!(bool::from_value(&Value::Text(token.into())), Some(true));
        }
        for token in ["false", "0", "No", "OFF"] {
            assert_eq!(bool::from_value(&Value::Text(token.into())), Some(false));
        }
        assert_eq!(bool::from_value(&Value::Text("maybe".into())), None);
        assert_eq!(bool::from_value(&Value::Int(0)), Some(false));
        assert_eq!(bool::from_value(&Value::Int(-1)), Some(true));
        assert_eq!(i64::from_value(&Value::Bool(true)), Some(1));
    }

    #[test]
    fn test_string_and_bytes() {
        assert_eq!(
            String::from_value(&Value::Bytes(b"abc".to_vec())),
            Some("abc".into())
        );
        assert_eq!(
            Vec::<u8>::from_value(&Value::Text("xy".into())),
            Some(b"xy".to_vec())
        );
        assert_eq!(String::from_value(&Value::Int(5)), Some("5".into()));
        assert_eq!(String::from_value(&Value::Null), None);
    }

    #[test]
    fn test_date_family() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let dt = date.and_hms_opt(10, 30, 0).unwrap();

        // narrowing keeps the date part
        assert_eq!(NaiveDate::from_value(&Value::DateTime(dt)), Some(date));
        // widening expands with a zero time of day
        assert_eq!(
            NaiveDateTime::from_value(&Value::Date(date)),
            date.and_hms_opt(0, 0, 0)
        );
        assert_eq!(
            NaiveDate::from_value(&Value::Text("2024-03-15".into())),
            Some(date)
        );
        assert_eq!(
            NaiveDateTime::from_value(&Value::Text("2024-03-15 10:30:00".into())),
            Some(dt)
        );
        assert_eq!(
            NaiveDateTime::from_value(&Value::Text("2024-03-15".into())),
            date.and_hms_opt(0, 0, 0)
        );
        assert_eq!(NaiveDate::from_value(&Value::Text("not a date".into())), None);
    }

    #[test]
    fn test_decimal() {
        let d: Decimal = "12.50".parse().unwrap();
        assert_eq!(Decimal::from_value(&Value::Text("12.50".into())), Some(d));
        assert_eq!(Decimal::from_value(&Value::Int(3)), Some(Decimal::from(3)));
        assert_eq!(i64::from_value(&Value::Decimal(d)), Some(12));
    }

    #[test]
    fn test_option_semantics() {
        // null maps to Some(None), not a failed coercion
        assert_eq!(Option::<i64>::from_value(&Value::Null), Some(None));
        assert_eq!(Option::<i64>::from_value(&Value::Int(5)), Some(Some(5)));
        // inner failure degrades to null rather than aborting
        assert_eq!(
            Option::<i64>::from_value(&Value::Text("abc".into())),
            Some(None)
        );
    }
}
