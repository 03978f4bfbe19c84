//! Normalized record model
//!
//! One [`Record`] is produced per source document. Field names serialize to the
//! JSON shape the library browser front end consumes.

use serde::{Deserialize, Serialize};

use crate::duration::DurationTier;

/// Localized names of a title
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Names {
    pub japanese: Option<String>,
    pub english: Option<String>,
    pub chinese: Option<String>,
    pub aliases: Vec<String>,
}

/// A related work listed in the info section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedWork {
    /// Relationship label, e.g. "续作" (sequel)
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

/// Info section fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Duration text exactly as written
    pub duration_str: Option<String>,
    /// Parsed duration in hours (never negative)
    pub duration_hours: Option<f64>,
    pub duration_tier: DurationTier,
    pub developer: Option<String>,
    /// Release date with hyphen separators (`YYYY-M-D`)
    pub release_date: Option<String>,
    pub platforms: Vec<String>,
    pub related_works: Vec<RelatedWork>,
}

impl Info {
    /// Set duration text, hours and tier together so the tier never lags the hours
    pub fn set_duration(&mut self, text: String) {
        let hours = crate::duration::parse_hours(&text);
        self.duration_str = Some(text);
        self.duration_hours = hours;
        self.duration_tier = DurationTier::from_hours(hours);
    }
}

/// A download link entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub name: String,
    pub url: String,
    /// Archive password; `None` when absent or written as "none"
    pub password: Option<String>,
}

/// Normalized representation of one source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Derived identifier: lowercase ASCII alphanumerics joined by `-`
    pub id: String,
    pub source_filename: String,
    /// Title from front matter, unmodified
    pub title: String,
    pub abbrlink: Option<String>,
    pub date: Option<String>,
    pub cover_image: Option<String>,
    pub names: Names,
    pub info: Info,
    pub description: Option<String>,
    pub download_links: Vec<DownloadLink>,
    pub screenshots: Vec<String>,
    pub series_name: Option<String>,
    pub series_tag: Option<String>,
    pub parse_error: bool,
    pub parse_warning: Option<String>,
}

impl Record {
    /// Create an empty record for `source_filename`
    pub fn new(id: String, source_filename: String, title: String) -> Self {
        Self {
            id,
            source_filename,
            title,
            abbrlink: None,
            date: None,
            cover_image: None,
            names: Names::default(),
            info: Info::default(),
            description: None,
            download_links: Vec::new(),
            screenshots: Vec::new(),
            series_name: None,
            series_tag: None,
            parse_error: false,
            parse_warning: None,
        }
    }

    /// Append a note to the accumulated warning text
    pub fn push_warning(&mut self, note: &str) {
        let warning = self.parse_warning.get_or_insert_with(String::new);
        warning.push_str(note);
        if !note.ends_with(' ') {
            warning.push(' ');
        }
    }

    /// Title shown to users: first present of chinese, english, japanese name,
    /// original title, or a filename placeholder
    pub fn display_title(&self) -> String {
        [
            &self.names.chinese,
            &self.names.english,
            &self.names.japanese,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .chain(Some(self.title.as_str()))
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Untitled ({})", self.source_filename))
    }
}
