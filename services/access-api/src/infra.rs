use course_access::access::{
    CatalogError, CourseCatalog, CourseId, CourseRef, CourseSummary, RenewalReference,
};
use course_access::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One course as exported from the shop, with the products sold per order.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogEntry {
    pub(crate) course_id: CourseId,
    pub(crate) title: String,
    #[serde(default = "placeholder_url")]
    pub(crate) url: String,
    #[serde(default)]
    pub(crate) orders: HashMap<u64, RenewalReference>,
}

fn placeholder_url() -> String {
    CourseRef::PLACEHOLDER_URL.to_string()
}

/// Catalog loaded from a JSON export, used by the CLI to adapt user-meta dumps.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryCourseCatalog {
    courses: HashMap<CourseId, CatalogEntry>,
}

impl InMemoryCourseCatalog {
    pub(crate) fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let courses = entries
            .into_iter()
            .map(|entry| (entry.course_id.clone(), entry))
            .collect();
        Self { courses }
    }

    pub(crate) fn from_json(bytes: &[u8]) -> Result<Self, AppError> {
        let entries: Vec<CatalogEntry> = serde_json::from_slice(bytes)?;
        Ok(Self::from_entries(entries))
    }

    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    pub(crate) fn len(&self) -> usize {
        self.courses.len()
    }
}

impl CourseCatalog for InMemoryCourseCatalog {
    fn course(&self, course_id: &CourseId) -> Result<Option<CourseSummary>, CatalogError> {
        Ok(self.courses.get(course_id).map(|entry| CourseSummary {
            title: entry.title.clone(),
            url: entry.url.clone(),
        }))
    }

    fn renewal_reference(
        &self,
        course_id: &CourseId,
        order_id: u64,
    ) -> Result<Option<RenewalReference>, CatalogError> {
        Ok(self
            .courses
            .get(course_id)
            .and_then(|entry| entry.orders.get(&order_id))
            .cloned())
    }
}
