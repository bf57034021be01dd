use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::classifier::{Classification, CourseAccessClassifier};
use super::clock::{Clock, SystemClock};
use super::domain::{CourseAccessRecord, CourseId, CourseRef};
use super::selection::{select_primary_course, teacher_quiz_visible, TitleMarker};
use super::views::{DashboardAccessPanel, HeaderAccessPanel, PanelLinks};

/// Defaults for featured-course selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSettings {
    pub priority_marker: Option<TitleMarker>,
    pub preferred_course_id: Option<CourseId>,
}

/// Both renderer views built from a single classification.
#[derive(Debug, Clone, Serialize)]
pub struct AccessPanels {
    pub dashboard: DashboardAccessPanel,
    pub header: HeaderAccessPanel,
    pub teacher_quiz_visible: bool,
}

/// Service composing the classifier, selection defaults, and renderer links.
pub struct AccessService {
    classifier: Arc<CourseAccessClassifier>,
    selection: SelectionSettings,
    links: PanelLinks,
    clock: Arc<dyn Clock>,
}

impl AccessService {
    pub fn new(
        classifier: CourseAccessClassifier,
        selection: SelectionSettings,
        links: PanelLinks,
    ) -> Self {
        Self::with_clock(classifier, selection, links, Arc::new(SystemClock))
    }

    pub fn with_clock(
        classifier: CourseAccessClassifier,
        selection: SelectionSettings,
        links: PanelLinks,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            classifier: Arc::new(classifier),
            selection,
            links,
            clock,
        }
    }

    pub fn classifier(&self) -> &CourseAccessClassifier {
        &self.classifier
    }

    /// Reference instant for requests that did not pin one.
    pub fn resolve_now(&self, now: Option<DateTime<Utc>>) -> DateTime<Utc> {
        now.unwrap_or_else(|| self.clock.now())
    }

    pub fn classify(&self, now: DateTime<Utc>, records: &[CourseAccessRecord]) -> Classification {
        self.classifier.classify(now, records)
    }

    /// Featured course; request overrides replace the configured defaults.
    pub fn primary_course(
        &self,
        now: DateTime<Utc>,
        records: &[CourseAccessRecord],
        marker: Option<&TitleMarker>,
        preferred_id: Option<&CourseId>,
    ) -> Option<CourseRef> {
        let (marker, preferred_id) = self.resolve_selection(marker, preferred_id);

        select_primary_course(
            now,
            records,
            |title| marker.is_some_and(|marker| marker.matches(title)),
            preferred_id,
        )
    }

    /// Dashboard and header panels. The quiz flag honours the same selection
    /// overrides as [`primary_course`](Self::primary_course).
    pub fn panels(
        &self,
        now: DateTime<Utc>,
        records: &[CourseAccessRecord],
        marker: Option<&TitleMarker>,
        preferred_id: Option<&CourseId>,
        has_teacher: bool,
    ) -> AccessPanels {
        let classification = self.classify(now, records);
        let (marker, preferred_id) = self.resolve_selection(marker, preferred_id);

        AccessPanels {
            dashboard: DashboardAccessPanel::from_classification(&classification, &self.links),
            header: HeaderAccessPanel::from_classification(&classification, &self.links),
            teacher_quiz_visible: teacher_quiz_visible(
                now,
                records,
                |title| marker.is_some_and(|marker| marker.matches(title)),
                preferred_id,
                has_teacher,
            ),
        }
    }

    fn resolve_selection<'a>(
        &'a self,
        marker: Option<&'a TitleMarker>,
        preferred_id: Option<&'a CourseId>,
    ) -> (Option<&'a TitleMarker>, Option<&'a CourseId>) {
        (
            marker.or(self.selection.priority_marker.as_ref()),
            preferred_id.or(self.selection.preferred_course_id.as_ref()),
        )
    }
}

impl Default for AccessService {
    fn default() -> Self {
        Self::new(
            CourseAccessClassifier::default(),
            SelectionSettings::default(),
            PanelLinks::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::clock::FixedClock;
    use chrono::TimeZone;

    fn fixed_service(selection: SelectionSettings) -> AccessService {
        let now = Utc.timestamp_opt(1_000_000, 0).single().expect("valid instant");
        AccessService::with_clock(
            CourseAccessClassifier::default(),
            selection,
            PanelLinks::default(),
            Arc::new(FixedClock(now)),
        )
    }

    #[test]
    fn resolve_now_prefers_request_instant() {
        let service = fixed_service(SelectionSettings::default());
        let pinned = Utc.timestamp_opt(5, 0).single().expect("valid instant");

        assert_eq!(service.resolve_now(Some(pinned)), pinned);
        assert_eq!(service.resolve_now(None).timestamp(), 1_000_000);
    }

    #[test]
    fn request_overrides_replace_configured_selection() {
        let service = fixed_service(SelectionSettings {
            priority_marker: TitleMarker::new("Track"),
            preferred_course_id: Some(CourseId::from(1)),
        });
        let records = [
            CourseAccessRecord::new(1, "Basic", "#"),
            CourseAccessRecord::new(2, "Theory Track", "#"),
            CourseAccessRecord::new(3, "Motorcycle", "#"),
        ];
        let now = service.resolve_now(None);

        let configured = service
            .primary_course(now, &records, None, None)
            .expect("selected");
        assert_eq!(configured.id, CourseId::from(2));

        let marker = TitleMarker::new("Motor").expect("marker");
        let overridden = service
            .primary_course(now, &records, Some(&marker), None)
            .expect("selected");
        assert_eq!(overridden.id, CourseId::from(3));
    }

    #[test]
    fn without_marker_falls_back_to_preferred_then_first() {
        let service = fixed_service(SelectionSettings::default());
        let records = [
            CourseAccessRecord::new(1, "Theory Track", "#"),
            CourseAccessRecord::new(2, "Basic", "#"),
        ];
        let now = service.resolve_now(None);

        let first = service.primary_course(now, &records, None, None).expect("selected");
        assert_eq!(first.id, CourseId::from(1));

        let preferred = service
            .primary_course(now, &records, None, Some(&CourseId::from(2)))
            .expect("selected");
        assert_eq!(preferred.id, CourseId::from(2));
    }

    #[test]
    fn panel_quiz_flag_follows_selection_overrides() {
        let service = fixed_service(SelectionSettings::default());
        let records = [
            CourseAccessRecord::new(1, "Basic", "#").expiring_at(10),
            CourseAccessRecord::new(2, "Theory Track", "#").expiring_at(20),
        ];
        let now = service.resolve_now(None);
        let marker = TitleMarker::new("Track").expect("marker");

        let featured = service.primary_course(now, &records, Some(&marker), None);
        assert!(featured.is_none(), "no course is active");

        assert!(!service.panels(now, &records, None, None, false).teacher_quiz_visible);
        assert!(
            service
                .panels(now, &records, Some(&marker), None, false)
                .teacher_quiz_visible
        );

        let active = [
            CourseAccessRecord::new(1, "Basic", "#"),
            CourseAccessRecord::new(2, "Motorcycle", "#"),
        ];
        assert!(!service.panels(now, &active, None, None, false).teacher_quiz_visible);
        assert!(
            service
                .panels(now, &active, None, Some(&CourseId::from(2)), false)
                .teacher_quiz_visible
        );
    }
}
