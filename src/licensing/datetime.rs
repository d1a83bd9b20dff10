//! Date-time handling for license server responses.
//!
//! The server sends date-times as ISO-8601 local date-times without an
//! offset, e.g. `2023-05-01T12:30:00` or `2023-05-01T12:30:00.1234567`.
//! Offset-qualified strings and numeric timestamps are rejected.

use chrono::NaiveDateTime;

/// Accepted layout. `%.f` makes the fractional part optional.
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse an ISO-8601 local date-time.
pub fn parse_local_datetime(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, LOCAL_DATETIME_FORMAT)
}

/// Serde adapter for `NaiveDateTime` fields, used via `#[serde(with = "local_datetime")]`.
pub mod local_datetime {
    use super::{parse_local_datetime, LOCAL_DATETIME_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(LOCAL_DATETIME_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_local_datetime(&raw).map_err(|e| {
            de::Error::custom(format!("invalid local date-time {:?}: {}", raw, e))
        })
    }

    /// Same rule for `Option<NaiveDateTime>`; JSON `null` maps to `None`.
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] NaiveDateTime);

            let value: Option<Wrapper> = Option::deserialize(deserializer)?;
            Ok(value.map(|Wrapper(dt)| dt))
        }
    }
}
