use serde::Serialize;

use super::classifier::{Classification, EnrichedCourse};
use super::domain::{AccessState, CourseId, CourseRef};

pub const DEFAULT_SHOP_URL: &str = "/shop/";
pub const DEFAULT_RENEW_COURSE_TEMPLATE: &str = "/renew-course/?course_id={course_id}";

/// Fallback destinations when a course carries no renewal reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLinks {
    pub shop_url: String,
    pub renew_course_template: String,
}

impl Default for PanelLinks {
    fn default() -> Self {
        Self {
            shop_url: DEFAULT_SHOP_URL.to_string(),
            renew_course_template: DEFAULT_RENEW_COURSE_TEMPLATE.to_string(),
        }
    }
}

impl PanelLinks {
    fn renew_course_url(&self, course_id: &CourseId) -> String {
        self.renew_course_template
            .replace("{course_id}", course_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryNotice {
    pub course_id: CourseId,
    pub title: String,
    pub days_remaining: i64,
    pub expires_formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_url: Option<String>,
}

impl ExpiryNotice {
    fn from_course(course: &EnrichedCourse, renewal_url: Option<String>) -> Self {
        Self {
            course_id: course.course_id().clone(),
            title: course.title().to_string(),
            days_remaining: course.days_remaining,
            expires_formatted: course.expires_formatted.clone(),
            renewal_url,
        }
    }
}

/// Access-status block on the learner dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardAccessPanel {
    pub has_active: bool,
    pub has_expired: bool,
    /// Only courses with a direct renewal link get a renew action here.
    pub expiring_notices: Vec<ExpiryNotice>,
    /// Expired courses always get an action, falling back to the shop.
    pub expired_notices: Vec<ExpiryNotice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_course: Option<CourseRef>,
}

impl DashboardAccessPanel {
    pub fn from_classification(classification: &Classification, links: &PanelLinks) -> Self {
        let expiring_notices = classification
            .expiring_soon()
            .iter()
            .map(|course| ExpiryNotice::from_course(course, course.renewal_url.clone()))
            .collect();

        let expired_notices = classification
            .expired()
            .iter()
            .map(|course| {
                let url = course
                    .renewal_url
                    .clone()
                    .unwrap_or_else(|| links.shop_url.clone());
                ExpiryNotice::from_course(course, Some(url))
            })
            .collect();

        let quick_course = classification
            .active()
            .first()
            .map(|course| course.record.course_ref());

        Self {
            has_active: classification.has_active(),
            has_expired: classification.has_expired(),
            expiring_notices,
            expired_notices,
            quick_course,
        }
    }

    /// Whether the page being rendered is the quick course itself.
    pub fn is_viewing(&self, course_id: &CourseId) -> bool {
        self.quick_course
            .as_ref()
            .is_some_and(|course| &course.id == course_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCourseEntry {
    pub course_id: CourseId,
    pub title: String,
    pub state: AccessState,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_formatted: Option<String>,
    pub action_url: String,
}

/// Compact access summary in the site header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderAccessPanel {
    pub visible: bool,
    pub active: Vec<HeaderCourseEntry>,
    pub expired: Vec<HeaderCourseEntry>,
}

impl HeaderAccessPanel {
    pub fn from_classification(classification: &Classification, links: &PanelLinks) -> Self {
        let active = classification
            .active()
            .iter()
            .map(|course| HeaderCourseEntry {
                course_id: course.course_id().clone(),
                title: course.title().to_string(),
                state: course.state,
                status_label: course.state.label(),
                expires_formatted: (!course.permanent).then(|| course.expires_formatted.clone()),
                action_url: course.record.url.clone(),
            })
            .collect();

        let expired = classification
            .expired()
            .iter()
            .map(|course| HeaderCourseEntry {
                course_id: course.course_id().clone(),
                title: course.title().to_string(),
                state: course.state,
                status_label: course.state.label(),
                expires_formatted: Some(course.expires_formatted.clone()),
                action_url: course
                    .renewal_url
                    .clone()
                    .unwrap_or_else(|| links.renew_course_url(course.course_id())),
            })
            .collect();

        Self {
            visible: classification.has_active() || classification.has_expired(),
            active,
            expired,
        }
    }
}
