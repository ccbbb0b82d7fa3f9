//! Duration literals such as `1m`, `30s`, `1m30s` and `500ms`

use crate::error::{AppError, Result};
use std::time::Duration;

/// Parse a duration literal; a bare number is taken as seconds
pub fn parse_duration_literal(input: &str) -> Result<Duration> {
    let literal = input.trim();

    if literal.is_empty() {
        return Err(AppError::parse("Duration cannot be empty"));
    }

    if literal.starts_with('-') || literal.starts_with('+') {
        return Err(AppError::parse(format!("Invalid duration '{}': sign not allowed", literal)));
    }

    if literal.chars().all(|c| c.is_ascii_digit() || c == '.') {
        let secs: f64 = literal.parse()?;
        return Duration::try_from_secs_f64(secs)
            .map_err(|e| AppError::parse(format!("Invalid duration '{}': {}", literal, e)));
    }

    humantime::parse_duration(literal)
        .map_err(|e| AppError::parse(format!("Invalid duration '{}': {}", literal, e)))
}

/// Render a duration the way it would be written in configuration
pub fn format_duration_literal(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }
    humantime::format_duration(duration).to_string().replace(' ', "")
}

/// Serde adapter storing durations as literals
///
/// Deserialization accepts either a literal string or a number of seconds.
pub mod serde_literal {
    use super::{format_duration_literal, parse_duration_literal};
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration_literal(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Literal {
            Text(String),
            Seconds(f64),
        }

        match Literal::deserialize(deserializer)? {
            Literal::Text(text) => parse_duration_literal(&text).map_err(de::Error::custom),
            Literal::Seconds(secs) => Duration::try_from_secs_f64(secs).map_err(de::Error::custom),
        }
    }

    /// Same adapter for optional fields
    pub mod option {
        use super::super::{format_duration_literal, parse_duration_literal};
        use serde::{de, Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S: Serializer>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
            match duration {
                Some(duration) => serializer.serialize_str(&format_duration_literal(*duration)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Literal {
                Text(String),
                Seconds(f64),
            }

            match Option::<Literal>::deserialize(deserializer)? {
                Some(Literal::Text(text)) => parse_duration_literal(&text).map(Some).map_err(de::Error::custom),
                Some(Literal::Seconds(secs)) => Duration::try_from_secs_f64(secs).map(Some).map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
