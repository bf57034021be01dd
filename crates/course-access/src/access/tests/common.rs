use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::access::clock::FixedClock;
use crate::access::domain::{CourseAccessRecord, CourseId};
use crate::access::policy::SECONDS_PER_DAY;
use crate::access::selection::TitleMarker;
use crate::access::service::{AccessService, SelectionSettings};
use crate::access::views::PanelLinks;
use crate::access::{access_router, CourseAccessClassifier};

pub(super) const NOW: i64 = 1_000_000;

pub(super) fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(NOW, 0).single().expect("valid instant")
}

pub(super) fn days(count: i64) -> i64 {
    count * SECONDS_PER_DAY
}

/// Mixed enrollment: permanent, expiring, comfortably active, lapsed, boundary.
pub(super) fn learner_records() -> Vec<CourseAccessRecord> {
    vec![
        CourseAccessRecord::new(898, "Traffic Education", "/courses/898"),
        CourseAccessRecord::new(4236, "Online Theory Track", "/courses/4236")
            .expiring_at(NOW + days(2))
            .with_renewal_reference(5120),
        CourseAccessRecord::new(12, "Motorcycle", "/courses/12").expiring_at(NOW + days(40)),
        CourseAccessRecord::new(13, "Truck", "/courses/13")
            .expiring_at(NOW - days(3))
            .with_renewal_reference(6100),
        CourseAccessRecord::new(14, "Scooter", "/courses/14").expiring_at(NOW),
    ]
}

pub(super) fn service() -> AccessService {
    AccessService::with_clock(
        CourseAccessClassifier::default(),
        SelectionSettings {
            priority_marker: TitleMarker::new("Track"),
            preferred_course_id: Some(CourseId::from(898)),
        },
        PanelLinks::default(),
        Arc::new(FixedClock(now())),
    )
}

pub(super) fn router() -> axum::Router {
    access_router(Arc::new(service()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
