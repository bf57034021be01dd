//! Course access classification: who can still open which course, and for how long.

pub mod catalog;
pub mod classifier;
pub mod clock;
pub mod domain;
pub mod policy;
pub mod router;
pub mod selection;
pub mod service;
pub mod snapshot;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, CourseCatalog, CourseSummary};
pub use classifier::{classify, Classification, CourseAccessClassifier, EnrichedCourse};
pub use clock::{parse_instant, Clock, FixedClock, SystemClock};
pub use domain::{
    dedupe_last_wins, AccessExpiry, AccessState, CourseAccessRecord, CourseId, CourseRef,
    RenewalReference,
};
pub use policy::{AccessPolicy, PolicyError, PolicySettings, PERMANENT_DAYS_REMAINING};
pub use router::access_router;
pub use selection::{select_primary_course, teacher_quiz_visible, TitleMarker};
pub use service::{AccessPanels, AccessService, SelectionSettings};
pub use snapshot::{SnapshotImportError, UserMetaSnapshot};
pub use views::{DashboardAccessPanel, HeaderAccessPanel, PanelLinks};
