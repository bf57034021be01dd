use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Source of the reference instant. Only service boundaries consult a clock;
/// the classifier always receives `now` as an argument.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Accepts Unix seconds or an RFC 3339 timestamp.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(seconds) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| format!("timestamp '{raw}' is out of range"));
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as unix seconds or RFC 3339 ({err})"))
}

pub fn deserialize_optional_instant<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawInstant {
        Seconds(i64),
        Text(String),
    }

    match Option::<RawInstant>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawInstant::Seconds(seconds)) => DateTime::from_timestamp(seconds, 0)
            .map(Some)
            .ok_or_else(|| {
                serde::de::Error::custom(format!("timestamp {seconds} is out of range"))
            }),
        Some(RawInstant::Text(raw)) => parse_instant(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
