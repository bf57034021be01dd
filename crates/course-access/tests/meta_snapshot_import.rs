use chrono::{DateTime, TimeZone, Utc};
use course_access::access::{
    AccessExpiry, AccessService, AccessState, CatalogError, CourseAccessClassifier,
    CourseCatalog, CourseId, CourseSummary, DashboardAccessPanel, HeaderAccessPanel, PanelLinks,
    RenewalReference, SelectionSettings, TitleMarker, UserMetaSnapshot,
};

const NOW: i64 = 1_000_000;

fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(NOW, 0).single().expect("valid instant")
}

struct DrivingSchoolCatalog;

impl CourseCatalog for DrivingSchoolCatalog {
    fn course(&self, course_id: &CourseId) -> Result<Option<CourseSummary>, CatalogError> {
        let title = match course_id.as_str() {
            "898" => "Traffic Education Track",
            "4236" => "Online Theory",
            "512" => "Truck Theory",
            "77" => "Motorcycle Theory",
            "31" => "Scooter Theory",
            "640" => "Legacy Course",
            _ => return Ok(None),
        };

        Ok(Some(CourseSummary {
            title: title.to_string(),
            url: format!("/courses/{course_id}/"),
        }))
    }

    fn renewal_reference(
        &self,
        course_id: &CourseId,
        order_id: u64,
    ) -> Result<Option<RenewalReference>, CatalogError> {
        Ok(match (course_id.as_str(), order_id) {
            ("4236", 7781) => Some(RenewalReference::from(5120)),
            ("77", 7702) => Some(RenewalReference::from(5177)),
            _ => None,
        })
    }
}

fn load_records() -> Vec<course_access::access::CourseAccessRecord> {
    let data = include_bytes!("fixtures/learner_meta.csv");
    let snapshot = UserMetaSnapshot::from_reader(&data[..]).expect("fixture parses");
    snapshot
        .course_records(&DrivingSchoolCatalog)
        .expect("catalog resolves")
}

#[test]
fn snapshot_adapts_in_store_order_and_drops_unknown_courses() {
    let records = load_records();
    let ids: Vec<&str> = records.iter().map(|record| record.course_id.as_str()).collect();

    assert_eq!(ids, ["898", "4236", "512", "77", "31", "640"]);
    assert_eq!(records[5].expires_at, AccessExpiry::Permanent);
    assert_eq!(records[1].renewal_reference, Some(RenewalReference::from(5120)));
}

#[test]
fn fixture_classifies_into_expected_buckets() {
    let records = load_records();
    let service = AccessService::new(
        CourseAccessClassifier::default(),
        SelectionSettings::default(),
        PanelLinks::default(),
    );
    let result = service.classify(now(), &records);

    let state = |id: u64| result.state_of(&CourseId::from(id));
    assert_eq!(state(898), Some(AccessState::Permanent));
    assert_eq!(state(4236), Some(AccessState::ExpiringSoon));
    assert_eq!(state(512), Some(AccessState::Active));
    assert_eq!(state(77), Some(AccessState::Expired));
    assert_eq!(state(31), Some(AccessState::Expired));
    assert_eq!(state(640), Some(AccessState::Permanent));

    let soon = &result.expiring_soon()[0];
    assert_eq!(soon.days_remaining, 6);
    assert_eq!(soon.renewal_url.as_deref(), Some("/?add-to-cart=5120"));
}

#[test]
fn dashboard_and_header_agree_on_fixture() {
    let records = load_records();
    let service = AccessService::new(
        CourseAccessClassifier::default(),
        SelectionSettings {
            priority_marker: TitleMarker::new("Track"),
            preferred_course_id: Some(CourseId::from(4236)),
        },
        PanelLinks::default(),
    );
    let panels = service.panels(now(), &records, None, None, false);

    let dashboard: &DashboardAccessPanel = &panels.dashboard;
    let header: &HeaderAccessPanel = &panels.header;

    let header_expired: Vec<_> = header.expired.iter().map(|entry| &entry.course_id).collect();
    let dashboard_expired: Vec<_> = dashboard
        .expired_notices
        .iter()
        .map(|notice| &notice.course_id)
        .collect();
    assert_eq!(header_expired, dashboard_expired);
    assert_eq!(header.active.len(), 4);

    assert_eq!(header.expired[0].action_url, "/?add-to-cart=5177");
    assert_eq!(header.expired[1].action_url, "/renew-course/?course_id=31");
    assert_eq!(dashboard.expired_notices[1].renewal_url.as_deref(), Some("/shop/"));
    assert!(panels.teacher_quiz_visible);

    let featured = service
        .primary_course(now(), &records, None, None)
        .expect("featured course");
    assert_eq!(featured.id, CourseId::from(898));
}
