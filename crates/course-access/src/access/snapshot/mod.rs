//! Adapter from a learner's raw user-meta rows to classifier input.
//!
//! The metadata store records one `course_{id}_access_expires` key per enrollment
//! (`0` for permanent access) and, for purchased courses, a matching
//! `course_{id}_order_id`. Course titles/links and the product behind an order
//! come from a [`CourseCatalog`].

mod parser;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::catalog::{CatalogError, CourseCatalog};
use super::domain::{AccessExpiry, CourseAccessRecord, CourseId};

#[derive(Debug)]
pub enum SnapshotImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Catalog(CatalogError),
}

impl std::fmt::Display for SnapshotImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotImportError::Io(err) => write!(f, "failed to read user meta export: {}", err),
            SnapshotImportError::Csv(err) => write!(f, "invalid user meta CSV data: {}", err),
            SnapshotImportError::Catalog(err) => {
                write!(f, "could not resolve courses for user meta: {}", err)
            }
        }
    }
}

impl std::error::Error for SnapshotImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotImportError::Io(err) => Some(err),
            SnapshotImportError::Csv(err) => Some(err),
            SnapshotImportError::Catalog(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SnapshotImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SnapshotImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<CatalogError> for SnapshotImportError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

/// Point-in-time copy of a learner's metadata, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserMetaSnapshot {
    entries: Vec<(String, String)>,
}

impl UserMetaSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest value written for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a CSV export with `meta_key,meta_value` headers.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotImportError> {
        let entries = parser::parse_entries(reader)?
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect();
        Ok(Self { entries })
    }

    /// Build classifier input from the expiry keys in this snapshot.
    ///
    /// Records come out in the order their course first appears; a repeated key
    /// overwrites the earlier value. Courses unknown to `catalog` are dropped.
    pub fn course_records<C>(
        &self,
        catalog: &C,
    ) -> Result<Vec<CourseAccessRecord>, SnapshotImportError>
    where
        C: CourseCatalog + ?Sized,
    {
        let mut order: Vec<&str> = Vec::new();
        let mut expiries: HashMap<&str, &str> = HashMap::new();
        let mut orders: HashMap<&str, &str> = HashMap::new();

        for (key, value) in &self.entries {
            if let Some(course) = parser::expiry_key_course(key) {
                if expiries.insert(course, value.as_str()).is_none() {
                    order.push(course);
                }
            } else if let Some(course) = parser::order_key_course(key) {
                orders.insert(course, value.as_str());
            }
        }

        let mut records = Vec::with_capacity(order.len());
        for course in order {
            let course_id = CourseId::new(course);
            let Some(summary) = catalog.course(&course_id)? else {
                debug!(course_id = %course_id, "skipping course missing from catalog");
                continue;
            };

            let expires_at = expiries
                .get(course)
                .map(|raw| AccessExpiry::parse(raw))
                .unwrap_or_default();

            let order_id = orders
                .get(course)
                .and_then(|raw| parser::parse_order_id(raw));
            let renewal_reference = match order_id {
                Some(order_id) => catalog.renewal_reference(&course_id, order_id)?,
                None => None,
            };

            records.push(CourseAccessRecord {
                course_id,
                title: summary.title,
                url: summary.url,
                expires_at,
                renewal_reference,
            });
        }

        debug!(records = records.len(), entries = self.entries.len(), "adapted user meta snapshot");
        Ok(records)
    }
}

impl<K, V> FromIterator<(K, V)> for UserMetaSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
