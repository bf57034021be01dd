use crate::infra::InMemoryCourseCatalog;
use chrono::{DateTime, Utc};
use clap::Args;
use course_access::access::{
    parse_instant, AccessPanels, AccessService, Classification, CourseAccessRecord, CourseId,
    CourseRef, TitleMarker, UserMetaSnapshot,
};
use course_access::config::AppConfig;
use course_access::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct ClassifyArgs {
    /// JSON file holding an array of course access records
    #[arg(long, conflicts_with_all = ["meta", "catalog"], required_unless_present = "meta")]
    pub(crate) records: Option<PathBuf>,
    /// CSV export of a learner's user meta (meta_key,meta_value)
    #[arg(long, requires = "catalog")]
    pub(crate) meta: Option<PathBuf>,
    /// JSON course catalog used to resolve titles, links and renewal products
    #[arg(long, requires = "meta")]
    pub(crate) catalog: Option<PathBuf>,
    /// Reference instant as unix seconds or RFC 3339 (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Title fragment that marks the featured course (overrides ACCESS_PRIORITY_MARKER)
    #[arg(long)]
    pub(crate) marker: Option<String>,
    /// Course id featured when no title matches (overrides ACCESS_PREFERRED_COURSE_ID)
    #[arg(long)]
    pub(crate) preferred_id: Option<String>,
    /// Learner has a teacher assignment
    #[arg(long)]
    pub(crate) has_teacher: bool,
    /// Print the panels as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = AccessService::new(
        config.access.classifier()?,
        config.access.selection(),
        config.access.links.clone(),
    );

    let (records, source) = load_records(&args)?;
    let now = service.resolve_now(args.now);
    let marker = args.marker.clone().and_then(TitleMarker::new);
    let preferred_id = args.preferred_id.clone().map(CourseId::new);

    let classification = service.classify(now, &records);
    let featured = service.primary_course(now, &records, marker.as_ref(), preferred_id.as_ref());
    let panels = service.panels(
        now,
        &records,
        marker.as_ref(),
        preferred_id.as_ref(),
        args.has_teacher,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&panels)?);
        return Ok(());
    }

    for line in render_report(now, &source, &classification, featured.as_ref(), &panels) {
        println!("{line}");
    }
    Ok(())
}

fn load_records(args: &ClassifyArgs) -> Result<(Vec<CourseAccessRecord>, String), AppError> {
    if let (Some(meta), Some(catalog)) = (&args.meta, &args.catalog) {
        let catalog = InMemoryCourseCatalog::from_path(catalog)?;
        let snapshot = UserMetaSnapshot::from_path(meta)?;
        let records = snapshot.course_records(&catalog)?;
        let source = format!(
            "user meta {} ({} keys, {} catalog courses)",
            meta.display(),
            snapshot.len(),
            catalog.len()
        );
        return Ok((records, source));
    }

    let path = args.records.clone().unwrap_or_default();
    let bytes = std::fs::read(&path)?;
    let records: Vec<CourseAccessRecord> = serde_json::from_slice(&bytes)?;
    Ok((records, format!("records {}", path.display())))
}

pub(crate) fn render_report(
    now: DateTime<Utc>,
    source: &str,
    classification: &Classification,
    featured: Option<&CourseRef>,
    panels: &AccessPanels,
) -> Vec<String> {
    let mut lines = vec![
        "Course access report".to_string(),
        format!("- Source: {source}"),
        format!("- Reference instant: {}", now.to_rfc3339()),
        format!(
            "- {} courses | {} active | {} expiring soon | {} expired",
            classification.len(),
            classification.active().len(),
            classification.expiring_soon().len(),
            classification.expired().len()
        ),
    ];

    if classification.is_empty() {
        lines.push("No course enrollments found.".to_string());
        return lines;
    }

    if !panels.header.active.is_empty() {
        lines.push(String::new());
        lines.push("Active courses".to_string());
        for entry in &panels.header.active {
            let until = entry
                .expires_formatted
                .as_deref()
                .map(|date| format!(" until {date}"))
                .unwrap_or_default();
            lines.push(format!(
                "  - [{}] {} ({}){}",
                entry.course_id, entry.title, entry.status_label, until
            ));
        }
    }

    if !panels.dashboard.expiring_notices.is_empty() {
        lines.push(String::new());
        lines.push("Expiring soon".to_string());
        for notice in &panels.dashboard.expiring_notices {
            let renew = notice
                .renewal_url
                .as_deref()
                .map(|url| format!(" | renew at {url}"))
                .unwrap_or_default();
            lines.push(format!(
                "  - {}: {} day(s) left, ends {}{}",
                notice.title, notice.days_remaining, notice.expires_formatted, renew
            ));
        }
    }

    if !panels.header.expired.is_empty() {
        lines.push(String::new());
        lines.push("Expired courses".to_string());
        for entry in &panels.header.expired {
            let ended = entry.expires_formatted.as_deref().unwrap_or("-");
            lines.push(format!(
                "  - [{}] {} ended {} | renew at {}",
                entry.course_id, entry.title, ended, entry.action_url
            ));
        }
    }

    lines.push(String::new());
    match featured {
        Some(course) => lines.push(format!(
            "Featured course: {} ({}) -> {}",
            course.title, course.id, course.url
        )),
        None => lines.push("Featured course: none (no active access)".to_string()),
    }
    lines.push(format!(
        "Teacher quiz visible: {}",
        if panels.teacher_quiz_visible { "yes" } else { "no" }
    ));

    lines
}
