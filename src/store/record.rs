// Document record module
// A saved document and the filename rules applied on save

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Every stored filename ends with this suffix
pub const TXT_SUFFIX: &str = ".txt";

/// One saved text document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Dense id, assigned in insertion order and never reused
    pub id: u64,
    pub filename: String,
    pub content: String,
}

impl DocumentRecord {
    /// Relative URL the document can be downloaded from
    pub fn download_url(&self) -> String {
        format!("/api/download/{}", self.id)
    }
}

/// Append `.txt` unless the name already carries it
pub fn with_txt_suffix(name: &str) -> String {
    if name.ends_with(TXT_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{TXT_SUFFIX}")
    }
}

/// Filename used when the caller supplies none: `document_<YYYYMMDD_HHMMSS>.txt`
pub fn timestamped_filename<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("document_{}{TXT_SUFFIX}", at.format("%Y%m%d_%H%M%S"))
}
