use serde::{Deserialize, Serialize};

use super::domain::{CourseId, RenewalReference};

/// Display fields the catalog knows about a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub title: String,
    pub url: String,
}

/// Lookup abstraction over the LMS/shop so snapshot adaptation can be exercised in isolation.
pub trait CourseCatalog: Send + Sync {
    fn course(&self, course_id: &CourseId) -> Result<Option<CourseSummary>, CatalogError>;

    /// Product purchased in `order_id` that grants `course_id`, if any.
    fn renewal_reference(
        &self,
        course_id: &CourseId,
        order_id: u64,
    ) -> Result<Option<RenewalReference>, CatalogError>;
}

/// Error enumeration for catalog lookups.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("course catalog unavailable: {0}")]
    Unavailable(String),
}
