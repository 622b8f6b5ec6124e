//! The `DateTime` scalar.

use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};
use chrono::{NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// A point in time, serialized as RFC 3339 UTC with millisecond precision.
///
/// Accepts ISO-8601 strings with or without an offset (offset-less values
/// are taken as UTC) and epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(pub chrono::DateTime<Utc>);

impl DateTime {
    /// The current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Build from epoch milliseconds.
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Parse an ISO-8601 string.
    pub fn parse_str(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Self(naive.and_utc()));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc()))
    }

    /// Read a timestamp from a backend JSON value.
    ///
    /// Besides strings and epoch millis this accepts the array form
    /// `[year, month, day, hour, minute, second?, nanos?]`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse_str(s),
            serde_json::Value::Number(n) => n.as_i64().and_then(Self::from_millis),
            serde_json::Value::Array(parts) => from_parts(parts),
            _ => None,
        }
    }

    /// RFC 3339 rendering, e.g. `2024-05-01T10:00:00.000Z`.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

fn from_parts(parts: &[serde_json::Value]) -> Option<DateTime> {
    let nums: Vec<i64> = parts
        .iter()
        .map(serde_json::Value::as_i64)
        .collect::<Option<_>>()?;
    if nums.len() < 5 {
        return None;
    }

    let field = |i: usize| -> Option<u32> {
        nums.get(i).map_or(Some(0), |n| u32::try_from(*n).ok())
    };
    let year = i32::try_from(nums[0]).ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(1)?, field(2)?)?;
    let naive = date.and_hms_nano_opt(field(3)?, field(4)?, field(5)?, field(6)?)?;
    Some(DateTime(naive.and_utc()))
}

#[Scalar(name = "DateTime")]
impl ScalarType for DateTime {
    fn parse(value: Value) -> InputValueResult<Self> {
        match value {
            Value::String(ref s) => Self::parse_str(s)
                .ok_or_else(|| InputValueError::custom(format!("invalid DateTime: {s}"))),
            Value::Number(ref n) => n
                .as_i64()
                .and_then(Self::from_millis)
                .ok_or_else(|| InputValueError::custom(format!("invalid DateTime: {n}"))),
            other => Err(InputValueError::expected_type(other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_rfc3339())
    }
}
