use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct MetaEntry {
    pub(crate) key: String,
    pub(crate) value: String,
}

/// Read a `meta_key,meta_value` export. Rows without a key are skipped.
pub(crate) fn parse_entries<R: Read>(reader: R) -> Result<Vec<MetaEntry>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut entries = Vec::new();

    for row in csv_reader.deserialize::<MetaRow>() {
        let row = row?;
        let key = row.meta_key;
        if key.is_empty() {
            continue;
        }

        entries.push(MetaEntry {
            key,
            value: row.meta_value.unwrap_or_default(),
        });
    }

    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct MetaRow {
    meta_key: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    meta_value: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// `course_{id}_access_expires` → `{id}`.
pub(crate) fn expiry_key_course(key: &str) -> Option<&str> {
    numeric_segment(key, "_access_expires")
}

/// `course_{id}_order_id` → `{id}`.
pub(crate) fn order_key_course(key: &str) -> Option<&str> {
    numeric_segment(key, "_order_id")
}

fn numeric_segment<'a>(key: &'a str, suffix: &str) -> Option<&'a str> {
    let id = key.strip_prefix("course_")?.strip_suffix(suffix)?;
    if !id.is_empty() && id.bytes().all(|byte| byte.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}

pub(crate) fn parse_order_id(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|order_id| *order_id > 0)
}
