use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::deserialize_optional_instant;
use super::domain::{CourseAccessRecord, CourseId, CourseRef};
use super::selection::TitleMarker;
use super::service::AccessService;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub records: Vec<CourseAccessRecord>,
}

#[derive(Debug, Deserialize)]
pub struct PrimaryCourseRequest {
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub records: Vec<CourseAccessRecord>,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub preferred_id: Option<CourseId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrimaryCourseResponse {
    pub course: Option<CourseRef>,
}

#[derive(Debug, Deserialize)]
pub struct PanelsRequest {
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub records: Vec<CourseAccessRecord>,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub preferred_id: Option<CourseId>,
    #[serde(default)]
    pub has_teacher: bool,
}

/// Router builder exposing the classifier over HTTP.
pub fn access_router(service: Arc<AccessService>) -> Router {
    Router::new()
        .route("/api/v1/access/classify", post(classify_handler))
        .route("/api/v1/access/primary-course", post(primary_course_handler))
        .route("/api/v1/access/panels", post(panels_handler))
        .with_state(service)
}

pub(crate) async fn classify_handler(
    State(service): State<Arc<AccessService>>,
    Json(request): Json<ClassifyRequest>,
) -> Response {
    let now = service.resolve_now(request.now);
    let classification = service.classify(now, &request.records);
    (StatusCode::OK, Json(classification)).into_response()
}

pub(crate) async fn primary_course_handler(
    State(service): State<Arc<AccessService>>,
    Json(request): Json<PrimaryCourseRequest>,
) -> Response {
    let now = service.resolve_now(request.now);
    let marker = request.marker.and_then(TitleMarker::new);
    let course = service.primary_course(
        now,
        &request.records,
        marker.as_ref(),
        request.preferred_id.as_ref(),
    );
    (StatusCode::OK, Json(PrimaryCourseResponse { course })).into_response()
}

pub(crate) async fn panels_handler(
    State(service): State<Arc<AccessService>>,
    Json(request): Json<PanelsRequest>,
) -> Response {
    let now = service.resolve_now(request.now);
    let marker = request.marker.and_then(TitleMarker::new);
    let panels = service.panels(
        now,
        &request.records,
        marker.as_ref(),
        request.preferred_id.as_ref(),
        request.has_teacher,
    );
    (StatusCode::OK, Json(panels)).into_response()
}
