//! Document normalization
//!
//! Turns one loaded [`Document`] into a [`Record`]:
//! 1. Derive the identifier (abbrlink → id → title → filename stem → fallback)
//! 2. Seed fields from front matter overrides
//! 3. Segment the body and run the extractor for each section
//! 4. Infer series/tag from the title when extraction found no series
//!
//! A document that cannot be loaded at all becomes a placeholder record with
//! `parse_error` set, so one bad file never aborts a directory build.

use std::path::Path;
use tracing::{debug, error, warn};

use crate::document::{Document, Metadata};
use crate::duration::DurationTier;
use crate::extract;
use crate::record::Record;
use crate::sections::segment;
use crate::series;
use crate::slug;

/// Load and normalize a document file
pub fn normalize_file(path: &Path) -> Record {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match Document::load(path) {
        Ok(document) => normalize_document(&document, &filename),
        Err(e) => {
            error!("Critical error parsing file {}: {}", path.display(), e);
            placeholder(&filename, &e.to_string())
        }
    }
}

/// Normalize an already loaded document
pub fn normalize_document(document: &Document, filename: &str) -> Record {
    let metadata = &document.metadata;
    let title = metadata
        .raw_text("title")
        .unwrap_or_else(|| format!("Untitled ({})", filename));

    let mut record = match derive_id(metadata, filename) {
        Some(id) => Record::new(id, filename.to_string(), title),
        None => {
            let id = slug::fallback_for(filename);
            error!(
                "Critical ID generation failure for {}. Assigned fallback: {}",
                filename, id
            );
            let mut record = Record::new(id, filename.to_string(), title);
            record.parse_error = true;
            record.push_warning("Critical: no usable identifier source, fallback ID assigned.");
            record
        }
    };
    record.abbrlink = metadata.text("abbrlink");
    record.date = metadata.text("date");
    seed_from_metadata(metadata, &mut record);

    for section in segment(&document.body) {
        if let Err(e) = extract::apply(&section, &mut record) {
            error!(
                "Error processing section '{}' for file {}: {}",
                section.title, filename, e
            );
            record.push_warning(&format!("Error in section '{}'.", section.title));
        }
    }

    if record.series_name.is_none() {
        if let Some(guess) = series::infer(&record.title) {
            record.series_name = Some(guess.name);
            if record.series_tag.is_none() {
                record.series_tag = guess.tag;
            }
        }
    }

    if record.info.duration_hours.is_some() && record.info.duration_tier == DurationTier::Unknown {
        record.info.duration_tier = DurationTier::from_hours(record.info.duration_hours);
    }

    debug_assert!(slug::is_valid(&record.id), "malformed id '{}'", record.id);
    debug!("Normalized {} as '{}'", filename, record.id);
    record
}

/// Identifier from the first candidate that yields a slug
fn derive_id(metadata: &Metadata, filename: &str) -> Option<String> {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());
    let candidates = [
        metadata.text("abbrlink"),
        metadata.text("id"),
        metadata.raw_text("title"),
        stem,
    ];
    let id = slug::derive_first(candidates.iter().flatten().map(String::as_str));
    if id.is_some() && candidates[..3].iter().all(Option::is_none) {
        warn!("No id source in front matter of {}; using filename", filename);
    }
    id
}

/// Front matter overrides; body sections may overwrite them
fn seed_from_metadata(metadata: &Metadata, record: &mut Record) {
    record.info.developer = metadata.text("developer");
    if let Some(date) = metadata.text("release_date") {
        extract::apply_release_date(&date, record);
    }
    if let Some(duration) = metadata.text("duration") {
        record.info.set_duration(duration);
    }
    if let Some(platforms) = metadata.list("platforms") {
        record.info.platforms = platforms;
    }
    record.series_name = metadata.text("series");
    record.series_tag = metadata.text("series_tag");
    record.cover_image = metadata.text("cover");
}

/// Record standing in for a document that failed to load
pub fn placeholder(filename: &str, reason: &str) -> Record {
    let id = slug::derive(filename).unwrap_or_else(|| slug::fallback_for(filename));
    let mut record = Record::new(id, filename.to_string(), format!("Error Parsing: {}", filename));
    record.description = Some(format!(
        "Failed to parse this file. Check server logs for {}.",
        filename
    ));
    record.parse_error = true;
    record.parse_warning = Some(format!("File-level parsing exception: {}", reason));
    record
}
