use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Offset, Utc};

use super::domain::{CourseId, RenewalReference};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// `days_remaining` reported for courses that never expire.
pub const PERMANENT_DAYS_REMAINING: i64 = 999_999;

pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 7;
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";
pub const DEFAULT_PERMANENT_LABEL: &str = "permanent";
pub const DEFAULT_RENEWAL_URL_TEMPLATE: &str = "/?add-to-cart={reference}";

/// Raw, unvalidated policy inputs as they arrive from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySettings {
    pub expiring_soon_days: i64,
    pub date_format: String,
    pub utc_offset_seconds: i32,
    pub permanent_label: String,
    pub renewal_url_template: String,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            expiring_soon_days: DEFAULT_EXPIRING_SOON_DAYS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            utc_offset_seconds: 0,
            permanent_label: DEFAULT_PERMANENT_LABEL.to_string(),
            renewal_url_template: DEFAULT_RENEWAL_URL_TEMPLATE.to_string(),
        }
    }
}

/// Validated classification tunables shared by every renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    expiring_soon_days: i64,
    date_format: String,
    utc_offset: FixedOffset,
    permanent_label: String,
    renewal_url_template: String,
}

impl AccessPolicy {
    pub fn new(settings: PolicySettings) -> Result<Self, PolicyError> {
        let PolicySettings {
            expiring_soon_days,
            date_format,
            utc_offset_seconds,
            permanent_label,
            renewal_url_template,
        } = settings;

        if expiring_soon_days < 1 {
            return Err(PolicyError::ExpiringWindow(expiring_soon_days));
        }

        if date_format.trim().is_empty()
            || StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(PolicyError::DateFormat(date_format));
        }

        let utc_offset = FixedOffset::east_opt(utc_offset_seconds)
            .ok_or(PolicyError::UtcOffset(utc_offset_seconds))?;

        if permanent_label.trim().is_empty() {
            return Err(PolicyError::PermanentLabel);
        }

        if !renewal_url_template.contains("{reference}") {
            return Err(PolicyError::RenewalTemplate(renewal_url_template));
        }

        Ok(Self {
            expiring_soon_days,
            date_format,
            utc_offset,
            permanent_label,
            renewal_url_template,
        })
    }

    pub fn expiring_soon_days(&self) -> i64 {
        self.expiring_soon_days
    }

    pub fn permanent_label(&self) -> &str {
        &self.permanent_label
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// Whole days until `expires_at`, rounded up and floored at zero.
    pub fn days_remaining(&self, expires_at: i64, now: i64) -> i64 {
        let remaining = expires_at.saturating_sub(now);
        if remaining <= 0 {
            return 0;
        }

        let whole_days = remaining / SECONDS_PER_DAY;
        if remaining % SECONDS_PER_DAY == 0 {
            whole_days
        } else {
            whole_days + 1
        }
    }

    pub fn is_expiring_soon(&self, days_remaining: i64) -> bool {
        days_remaining > 0 && days_remaining <= self.expiring_soon_days
    }

    /// Calendar date in the site timezone. Instants chrono cannot represent
    /// fall back to the raw timestamp.
    pub fn format_expiry(&self, expires_at: i64) -> String {
        match DateTime::from_timestamp(expires_at, 0) {
            Some(instant) => instant
                .with_timezone(&self.utc_offset)
                .format(&self.date_format)
                .to_string(),
            None => expires_at.to_string(),
        }
    }

    pub fn renewal_url(&self, course_id: &CourseId, reference: &RenewalReference) -> String {
        self.renewal_url_template
            .replace("{reference}", reference.as_str())
            .replace("{course_id}", course_id.as_str())
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            expiring_soon_days: DEFAULT_EXPIRING_SOON_DAYS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            utc_offset: Utc.fix(),
            permanent_label: DEFAULT_PERMANENT_LABEL.to_string(),
            renewal_url_template: DEFAULT_RENEWAL_URL_TEMPLATE.to_string(),
        }
    }
}

/// Rejected policy settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("expiring-soon window must be at least one day, got {0}")]
    ExpiringWindow(i64),
    #[error("date format '{0}' is not a valid strftime pattern")]
    DateFormat(String),
    #[error("utc offset of {0} seconds is out of range")]
    UtcOffset(i32),
    #[error("permanent access label must not be empty")]
    PermanentLabel,
    #[error("renewal url template '{0}' must contain a {{reference}} placeholder")]
    RenewalTemplate(String),
}
