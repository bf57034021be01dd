use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

use super::domain::{AccessExpiry, AccessState, CourseAccessRecord, CourseId};
use super::policy::{AccessPolicy, PERMANENT_DAYS_REMAINING};

/// A course record annotated relative to a reference instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedCourse {
    #[serde(flatten)]
    pub record: CourseAccessRecord,
    pub state: AccessState,
    pub permanent: bool,
    pub days_remaining: i64,
    pub expires_formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_url: Option<String>,
}

impl EnrichedCourse {
    pub fn course_id(&self) -> &CourseId {
        &self.record.course_id
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn is_expiring_soon(&self) -> bool {
        self.state == AccessState::ExpiringSoon
    }
}

/// Partitioned view of a learner's course access.
///
/// `active` and `expired` partition the input in its original order;
/// `expiring_soon` is the ordered subset of `active` inside the warning window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    active: Vec<EnrichedCourse>,
    expired: Vec<EnrichedCourse>,
    expiring_soon: Vec<EnrichedCourse>,
}

impl Classification {
    pub fn active(&self) -> &[EnrichedCourse] {
        &self.active
    }

    pub fn expired(&self) -> &[EnrichedCourse] {
        &self.expired
    }

    pub fn expiring_soon(&self) -> &[EnrichedCourse] {
        &self.expiring_soon
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn has_expired(&self) -> bool {
        !self.expired.is_empty()
    }

    /// Number of classified records, i.e. `active + expired`.
    pub fn len(&self) -> usize {
        self.active.len() + self.expired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state_of(&self, course_id: &CourseId) -> Option<AccessState> {
        self.active
            .iter()
            .chain(self.expired.iter())
            .find(|course| course.course_id() == course_id)
            .map(|course| course.state)
    }
}

impl Serialize for Classification {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Classification", 5)?;
        state.serialize_field("has_active", &self.has_active())?;
        state.serialize_field("has_expired", &self.has_expired())?;
        state.serialize_field("active", &self.active)?;
        state.serialize_field("expired", &self.expired)?;
        state.serialize_field("expiring_soon", &self.expiring_soon)?;
        state.end()
    }
}

/// Stateless classifier; holds only the immutable policy.
#[derive(Debug, Clone, Default)]
pub struct CourseAccessClassifier {
    policy: AccessPolicy,
}

impl CourseAccessClassifier {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Split `records` into active and expired courses as of `now`.
    ///
    /// Duplicate course ids are classified independently; see
    /// [`dedupe_last_wins`](super::domain::dedupe_last_wins) for upstream cleanup.
    pub fn classify(&self, now: DateTime<Utc>, records: &[CourseAccessRecord]) -> Classification {
        let mut classification = Classification::default();

        for record in records {
            let course = self.enrich(now, record);
            match course.state {
                AccessState::Expired => classification.expired.push(course),
                AccessState::ExpiringSoon => {
                    classification.expiring_soon.push(course.clone());
                    classification.active.push(course);
                }
                AccessState::Permanent | AccessState::Active => {
                    classification.active.push(course)
                }
            }
        }

        debug!(
            now = now.timestamp(),
            active = classification.active.len(),
            expired = classification.expired.len(),
            expiring_soon = classification.expiring_soon.len(),
            "classified course access"
        );

        classification
    }

    pub fn enrich(&self, now: DateTime<Utc>, record: &CourseAccessRecord) -> EnrichedCourse {
        let expires_at = match record.expires_at {
            AccessExpiry::Permanent => {
                return EnrichedCourse {
                    record: record.clone(),
                    state: AccessState::Permanent,
                    permanent: true,
                    days_remaining: PERMANENT_DAYS_REMAINING,
                    expires_formatted: self.policy.permanent_label().to_string(),
                    renewal_url: None,
                };
            }
            AccessExpiry::At(timestamp) => timestamp,
        };

        let days_remaining = self.policy.days_remaining(expires_at, now.timestamp());
        let state = if record.has_active_access(now) {
            if self.policy.is_expiring_soon(days_remaining) {
                AccessState::ExpiringSoon
            } else {
                AccessState::Active
            }
        } else {
            AccessState::Expired
        };

        let renewal_url = record
            .renewal_reference
            .as_ref()
            .map(|reference| self.policy.renewal_url(&record.course_id, reference));

        EnrichedCourse {
            record: record.clone(),
            state,
            permanent: false,
            days_remaining,
            expires_formatted: self.policy.format_expiry(expires_at),
            renewal_url,
        }
    }
}

/// Classify with the default policy (7-day warning window, `dd/mm/YYYY` dates).
pub fn classify(now: DateTime<Utc>, records: &[CourseAccessRecord]) -> Classification {
    CourseAccessClassifier::default().classify(now, records)
}
