use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier wrapper for courses. The metadata store keys courses by integer,
/// catalogs and renderers may hand over slugs, so the id stays opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CourseId(pub String);

impl CourseId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for CourseId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CourseId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for CourseId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_opaque_id(deserializer).map(Self)
    }
}

/// Opaque purchase/product reference used to build a renewal link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RenewalReference(pub String);

impl RenewalReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenewalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RenewalReference {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for RenewalReference {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RenewalReference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_opaque_id(deserializer).map(Self)
    }
}

fn deserialize_opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(value) => Ok(value.to_string()),
        RawId::Text(value) => Ok(value.trim().to_string()),
    }
}

/// When access to a course ends.
///
/// Anything that is not a positive instant collapses to [`AccessExpiry::Permanent`]:
/// zero, negative sentinels and unparseable values all grant open-ended access.
/// The metadata store writes `0` for permanent enrollments and nothing else is
/// trustworthy enough to lock a learner out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessExpiry {
    #[default]
    Permanent,
    /// Unix timestamp in seconds, always positive.
    At(i64),
}

impl AccessExpiry {
    pub fn from_timestamp(value: Option<i64>) -> Self {
        match value {
            Some(timestamp) if timestamp > 0 => Self::At(timestamp),
            _ => Self::Permanent,
        }
    }

    /// Lenient parse of a raw metadata value.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::from_timestamp(Some(value));
        }

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::from_timestamp(Some(value.trunc() as i64)),
            _ => Self::Permanent,
        }
    }

    pub const fn timestamp(self) -> Option<i64> {
        match self {
            Self::Permanent => None,
            Self::At(timestamp) => Some(timestamp),
        }
    }

    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::Permanent)
    }

    /// Active while the expiry lies strictly after `now`.
    pub fn grants_access_at(self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Permanent => true,
            Self::At(timestamp) => timestamp > now.timestamp(),
        }
    }
}

impl Serialize for AccessExpiry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.timestamp().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AccessExpiry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(serde_json::Value::Null) => Self::Permanent,
            Some(serde_json::Value::Number(number)) => match number.as_i64() {
                Some(timestamp) => Self::from_timestamp(Some(timestamp)),
                None => number
                    .as_f64()
                    .map(|value| Self::parse(&value.to_string()))
                    .unwrap_or(Self::Permanent),
            },
            Some(serde_json::Value::String(raw)) => Self::parse(&raw),
            Some(_) => Self::Permanent,
        })
    }
}

/// One course a learner is, or was, enrolled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAccessRecord {
    pub course_id: CourseId,
    pub title: String,
    #[serde(default = "placeholder_url")]
    pub url: String,
    #[serde(default)]
    pub expires_at: AccessExpiry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_reference: Option<RenewalReference>,
}

fn placeholder_url() -> String {
    CourseRef::PLACEHOLDER_URL.to_string()
}

impl CourseAccessRecord {
    pub fn new(
        course_id: impl Into<CourseId>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            title: title.into(),
            url: url.into(),
            expires_at: AccessExpiry::Permanent,
            renewal_reference: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: AccessExpiry) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn expiring_at(self, timestamp: i64) -> Self {
        self.with_expiry(AccessExpiry::from_timestamp(Some(timestamp)))
    }

    pub fn with_renewal_reference(mut self, reference: impl Into<RenewalReference>) -> Self {
        self.renewal_reference = Some(reference.into());
        self
    }

    pub fn has_active_access(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.grants_access_at(now)
    }

    pub fn course_ref(&self) -> CourseRef {
        CourseRef {
            id: self.course_id.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }
}

/// Collapse repeated course ids. The last record seen for an id wins and takes
/// the slot where that id first appeared.
pub fn dedupe_last_wins(records: Vec<CourseAccessRecord>) -> Vec<CourseAccessRecord> {
    let mut slots: HashMap<CourseId, usize> = HashMap::with_capacity(records.len());
    let mut deduped: Vec<CourseAccessRecord> = Vec::with_capacity(records.len());

    for record in records {
        match slots.get(&record.course_id) {
            Some(&slot) => deduped[slot] = record,
            None => {
                slots.insert(record.course_id.clone(), deduped.len());
                deduped.push(record);
            }
        }
    }

    deduped
}

/// Minimal pointer to a course for featured displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub id: CourseId,
    pub title: String,
    pub url: String,
}

impl CourseRef {
    pub const PLACEHOLDER_URL: &'static str = "#";

    /// Stand-in shown when a learner has no course with active access.
    pub fn placeholder(title: impl Into<String>) -> Self {
        Self {
            id: CourseId::from(0),
            title: title.into(),
            url: Self::PLACEHOLDER_URL.to_string(),
        }
    }
}

/// Per-course lifecycle. `ExpiringSoon` annotates an active window, it is not terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    Permanent,
    Active,
    ExpiringSoon,
    Expired,
}

impl AccessState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Permanent => "Permanent Access",
            Self::Active => "Active",
            Self::ExpiringSoon => "Expiring Soon",
            Self::Expired => "Expired",
        }
    }

    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Expired)
    }
}
