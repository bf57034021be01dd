use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CourseAccessRecord, CourseId, CourseRef};

/// Title substring that marks a course as the learner's featured track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleMarker(String);

impl TitleMarker {
    /// Returns `None` for blank markers, which would otherwise match every title.
    pub fn new(marker: impl Into<String>) -> Option<Self> {
        let marker = marker.into();
        if marker.trim().is_empty() {
            None
        } else {
            Some(Self(marker))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, title: &str) -> bool {
        title.contains(self.0.as_str())
    }
}

/// Pick the one course to feature on the dashboard.
///
/// Only courses with active access qualify. First match wins: a title accepted by
/// `priority`, then `preferred_id`, then the first active course in input order.
pub fn select_primary_course<P>(
    now: DateTime<Utc>,
    records: &[CourseAccessRecord],
    priority: P,
    preferred_id: Option<&CourseId>,
) -> Option<CourseRef>
where
    P: Fn(&str) -> bool,
{
    let mut preferred: Option<&CourseAccessRecord> = None;
    let mut first_active: Option<&CourseAccessRecord> = None;

    for record in records.iter().filter(|record| record.has_active_access(now)) {
        if priority(&record.title) {
            return Some(record.course_ref());
        }

        if preferred.is_none() && preferred_id == Some(&record.course_id) {
            preferred = Some(record);
        }

        if first_active.is_none() {
            first_active = Some(record);
        }
    }

    preferred.or(first_active).map(CourseAccessRecord::course_ref)
}

/// Whether the teacher-assigned quiz list should be offered.
///
/// Title matches consider every enrolled course, not just active ones; the
/// preferred course must be active.
pub fn teacher_quiz_visible<P>(
    now: DateTime<Utc>,
    records: &[CourseAccessRecord],
    priority: P,
    preferred_id: Option<&CourseId>,
    has_teacher: bool,
) -> bool
where
    P: Fn(&str) -> bool,
{
    let preferred_active = preferred_id.is_some_and(|id| {
        records
            .iter()
            .any(|record| &record.course_id == id && record.has_active_access(now))
    });

    preferred_active || records.iter().any(|record| priority(&record.title)) || has_teacher
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_000_000, 0).single().expect("valid instant")
    }

    fn track_marker() -> TitleMarker {
        TitleMarker::new("Track").expect("non-empty marker")
    }

    #[test]
    fn priority_title_beats_preferred_id() {
        let records = [
            CourseAccessRecord::new(1, "Basic", "/c/1"),
            CourseAccessRecord::new(2, "Theory Track", "/c/2"),
        ];
        let marker = track_marker();

        let selected = select_primary_course(
            now(),
            &records,
            |title| marker.matches(title),
            Some(&CourseId::from(1)),
        )
        .expect("course selected");
        assert_eq!(selected.id, CourseId::from(2));
        assert_eq!(selected.url, "/c/2");
    }

    #[test]
    fn preferred_id_beats_first_active() {
        let records = [
            CourseAccessRecord::new(1, "Basic", "#"),
            CourseAccessRecord::new(898, "Preferred", "#"),
        ];

        let selected = select_primary_course(now(), &records, |_| false, Some(&CourseId::from(898)))
            .expect("course selected");
        assert_eq!(selected.id, CourseId::from(898));
    }

    #[test]
    fn expired_courses_never_selected() {
        let records = [
            CourseAccessRecord::new(1, "Old Track", "#").expiring_at(1_000_000),
            CourseAccessRecord::new(898, "Preferred", "#").expiring_at(500),
            CourseAccessRecord::new(3, "Basic", "#").expiring_at(2_000_000),
        ];
        let marker = track_marker();

        let selected = select_primary_course(
            now(),
            &records,
            |title| marker.matches(title),
            Some(&CourseId::from(898)),
        )
        .expect("course selected");
        assert_eq!(selected.id, CourseId::from(3));
    }

    #[test]
    fn returns_none_without_active_courses() {
        let records = [CourseAccessRecord::new(1, "Old", "#").expiring_at(10)];
        assert!(select_primary_course(now(), &records, |_| true, None).is_none());
        assert!(select_primary_course(now(), &[], |_| true, None).is_none());
    }

    #[test]
    fn blank_marker_is_rejected() {
        assert!(TitleMarker::new("   ").is_none());
        assert!(TitleMarker::new("").is_none());
    }

    #[test]
    fn teacher_quiz_visibility_rules() {
        let preferred = CourseId::from(898);
        let marker = track_marker();
        let matches = |title: &str| marker.matches(title);

        let plain = [CourseAccessRecord::new(1, "Basic", "#")];
        assert!(!teacher_quiz_visible(now(), &plain, matches, Some(&preferred), false));
        assert!(teacher_quiz_visible(now(), &plain, matches, Some(&preferred), true));

        let lapsed_track = [CourseAccessRecord::new(1, "Theory Track", "#").expiring_at(10)];
        assert!(teacher_quiz_visible(now(), &lapsed_track, matches, None, false));

        let lapsed_preferred = [CourseAccessRecord::new(898, "Basic", "#").expiring_at(10)];
        assert!(!teacher_quiz_visible(now(), &lapsed_preferred, matches, Some(&preferred), false));

        let active_preferred = [CourseAccessRecord::new(898, "Basic", "#")];
        assert!(teacher_quiz_visible(now(), &active_preferred, matches, Some(&preferred), false));
    }
}
