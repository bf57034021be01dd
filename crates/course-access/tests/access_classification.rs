use chrono::{DateTime, TimeZone, Utc};
use course_access::access::{
    classify, dedupe_last_wins, select_primary_course, AccessPolicy, AccessState,
    CourseAccessClassifier, CourseAccessRecord, CourseId, PolicySettings, TitleMarker,
    PERMANENT_DAYS_REMAINING,
};

const NOW: i64 = 1_000_000;
const DAY: i64 = 86_400;

fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(NOW, 0).single().expect("valid instant")
}

#[test]
fn course_six_days_from_expiry_is_expiring_soon() {
    let records = [CourseAccessRecord::new(1, "Basic", "/c/1").expiring_at(NOW + 6 * DAY)];
    let result = classify(now(), &records);

    assert_eq!(result.active().len(), 1);
    assert_eq!(result.active()[0].days_remaining, 6);
    assert_eq!(result.expiring_soon().len(), 1);
    assert_eq!(result.expiring_soon()[0].course_id(), &CourseId::from(1));
}

#[test]
fn course_without_expiry_is_permanent() {
    let records = [CourseAccessRecord::new(2, "Forever", "/c/2")];
    let result = classify(now(), &records);

    assert_eq!(result.active().len(), 1);
    assert_eq!(result.active()[0].expires_formatted, "permanent");
    assert_eq!(result.active()[0].days_remaining, PERMANENT_DAYS_REMAINING);
    assert!(result.expiring_soon().is_empty());
}

#[test]
fn course_past_expiry_is_expired() {
    let records = [CourseAccessRecord::new(3, "Lapsed", "/c/3").expiring_at(999_999)];
    let result = classify(now(), &records);

    assert_eq!(result.expired().len(), 1);
    assert_eq!(result.expired()[0].days_remaining, 0);
    assert!(!result.has_active());
    assert!(result.has_expired());
}

#[test]
fn course_eight_days_out_is_not_expiring_soon() {
    let records = [CourseAccessRecord::new(4, "Later", "/c/4").expiring_at(NOW + 8 * DAY)];
    let result = classify(now(), &records);

    assert_eq!(result.active().len(), 1);
    assert!(result.expiring_soon().is_empty());
}

#[test]
fn priority_title_wins_regardless_of_preferred_id() {
    let records = [
        CourseAccessRecord::new(1, "Basic", "/c/1"),
        CourseAccessRecord::new(2, "Theory Track", "/c/2"),
    ];
    let marker = TitleMarker::new("Track").expect("marker");

    for preferred in [None, Some(CourseId::from(1)), Some(CourseId::from(2))] {
        let selected = select_primary_course(
            now(),
            &records,
            |title| marker.matches(title),
            preferred.as_ref(),
        )
        .expect("course selected");
        assert_eq!(selected.id, CourseId::from(2));
    }
}

#[test]
fn formatted_dates_follow_policy() {
    let policy = AccessPolicy::new(PolicySettings {
        date_format: "%Y-%m-%d".to_string(),
        permanent_label: "lifetime".to_string(),
        ..PolicySettings::default()
    })
    .expect("valid policy");
    let classifier = CourseAccessClassifier::new(policy);

    let records = [
        CourseAccessRecord::new(1, "Dated", "#").expiring_at(NOW + DAY),
        CourseAccessRecord::new(2, "Lifetime", "#"),
    ];
    let result = classifier.classify(now(), &records);

    assert_eq!(result.active()[0].expires_formatted, "1970-01-13");
    assert_eq!(result.active()[1].expires_formatted, "lifetime");
}

#[test]
fn deduplicated_snapshot_classifies_latest_record() {
    let records = dedupe_last_wins(vec![
        CourseAccessRecord::new(1, "Course", "#").expiring_at(NOW - DAY),
        CourseAccessRecord::new(1, "Course", "#").expiring_at(NOW + 3 * DAY),
    ]);
    let result = classify(now(), &records);

    assert!(result.expired().is_empty());
    assert_eq!(result.state_of(&CourseId::from(1)), Some(AccessState::ExpiringSoon));
}
