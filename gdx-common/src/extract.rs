//! Per-section field extraction
//!
//! Each recognized [`SectionKind`] maps to one extractor that receives the
//! section text and fills its part of the [`Record`]. Scalar fields take the
//! last value seen; list fields set by repeated link/image sections accumulate.
//! A value that is absent or written as "none" never clears an earlier value.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::record::{DownloadLink, Record, RelatedWork};
use crate::sections::{is_edit_marker, Section, SectionKind};
use crate::series;

const JAPANESE_LABEL: &str = "- 日文：";
const ENGLISH_LABEL: &str = "- 英文：";
const CHINESE_LABEL: &str = "- 中文：";
const ALIASES_LABEL: &str = "- 别名：";

const DURATION_LABEL: &str = "- 时长：";
const DEVELOPER_LABEL: &str = "- 开发者：";
const RELEASE_DATE_LABEL: &str = "- 发售日期：";
const PLATFORMS_LABEL: &str = "- 游戏平台：";
const RELATED_WORKS_LABEL: &str = "- 相关作品：";

const PASSWORD_LABELS: &[&str] = &["- 解压密码：", "- Password:"];

/// Separator between a related work's type and name
const RELATED_WORK_SEPARATOR: char = '：';

/// Related-work type markers implying the same series (series, prequel, sequel, main story)
const SERIES_MARKERS: &[&str] = &["系列", "前作", "续作", "本篇"];

static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[.*?\]\((.*?)\)").expect("valid image regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-\s*\[(.*?)\]\((.*?)\)").expect("valid link regex"));
static RELEASE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})$").expect("valid date regex")
});

/// Recoverable failure inside one section
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionError {
    /// Download link line with an empty URL
    #[error("Download link '{0}' has no URL")]
    MissingLinkUrl(String),

    /// Related-works entry with an empty type or name
    #[error("Malformed related work entry: {0}")]
    MalformedRelatedWork(String),
}

type Extractor = fn(&str, &mut Record) -> Result<(), SectionError>;

/// Extractor for a section kind; `None` for unrecognized sections
fn extractor_for(kind: SectionKind) -> Option<Extractor> {
    match kind {
        SectionKind::Cover => Some(extract_cover),
        SectionKind::Names => Some(extract_names),
        SectionKind::Info => Some(extract_info),
        SectionKind::Description => Some(extract_description),
        SectionKind::DownloadLinks => Some(extract_download_links),
        SectionKind::Screenshots => Some(extract_screenshots),
        SectionKind::Unknown => None,
    }
}

/// Apply the matching extractor to `record`
///
/// On error, fields extracted before the failure point remain set.
pub fn apply(section: &Section, record: &mut Record) -> Result<(), SectionError> {
    match extractor_for(section.kind) {
        Some(extract) => extract(&section.text(), record),
        None => {
            tracing::debug!("Ignoring unrecognized section '{}'", section.title);
            Ok(())
        }
    }
}

/// `None` for empty text and for a literal "none"
fn clean(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

/// Comma-separated list; `None` when the whole value is absent
fn clean_list(value: &str) -> Option<Vec<String>> {
    clean(value).map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn set_if_some(field: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *field = value;
    }
}

/// Validate and normalize a release date to hyphen separators
///
/// Accepts the `YYYY-M-D` shape with `-`, `/` or `.` separators. Only the
/// shape is checked, not the calendar (`2024-02-30` passes).
pub fn normalize_release_date(value: &str) -> Option<String> {
    let caps = RELEASE_DATE.captures(value.trim())?;
    Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

/// Set the release date, or reject it with a warning
pub(crate) fn apply_release_date(value: &str, record: &mut Record) {
    let Some(raw) = clean(value) else {
        return;
    };
    match normalize_release_date(&raw) {
        Some(date) => record.info.release_date = Some(date),
        None => {
            tracing::warn!(
                "Invalid date format '{}' for file {}. Leaving release date unset.",
                raw,
                record.source_filename
            );
            record.push_warning(&format!("Invalid release date '{}'.", raw));
        }
    }
}

fn extract_cover(text: &str, record: &mut Record) -> Result<(), SectionError> {
    let cover = IMAGE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty());
    set_if_some(&mut record.cover_image, cover);
    Ok(())
}

fn extract_names(text: &str, record: &mut Record) -> Result<(), SectionError> {
    for line in text.lines().map(str::trim) {
        if let Some(v) = line.strip_prefix(JAPANESE_LABEL) {
            set_if_some(&mut record.names.japanese, clean(v));
        } else if let Some(v) = line.strip_prefix(ENGLISH_LABEL) {
            set_if_some(&mut record.names.english, clean(v));
        } else if let Some(v) = line.strip_prefix(CHINESE_LABEL) {
            set_if_some(&mut record.names.chinese, clean(v));
        } else if let Some(v) = line.strip_prefix(ALIASES_LABEL) {
            if let Some(aliases) = clean_list(v) {
                record.names.aliases = aliases;
            }
        }
    }
    Ok(())
}

fn extract_info(text: &str, record: &mut Record) -> Result<(), SectionError> {
    let mut in_related_works = false;
    let mut first_error = None;

    for raw in text.lines() {
        let line = raw.trim();
        if let Some(v) = line.strip_prefix(DURATION_LABEL) {
            if let Some(duration) = clean(v) {
                record.info.set_duration(duration);
            }
        } else if let Some(v) = line.strip_prefix(DEVELOPER_LABEL) {
            set_if_some(&mut record.info.developer, clean(v));
        } else if let Some(v) = line.strip_prefix(RELEASE_DATE_LABEL) {
            apply_release_date(v, record);
        } else if let Some(v) = line.strip_prefix(PLATFORMS_LABEL) {
            if let Some(platforms) = clean_list(v) {
                record.info.platforms = platforms;
            }
        } else if line.starts_with(RELATED_WORKS_LABEL) {
            in_related_works = true;
        } else if in_related_works && line.starts_with("- ") && line.contains(RELATED_WORK_SEPARATOR) {
            match parse_related_work(line) {
                Some(work) => {
                    infer_series_from_related(&work, record);
                    record.info.related_works.push(work);
                }
                None => {
                    tracing::warn!(
                        "Could not parse related work line '{}' in file {}",
                        line,
                        record.source_filename
                    );
                    first_error.get_or_insert(SectionError::MalformedRelatedWork(line.to_string()));
                }
            }
        } else if in_related_works && !raw.starts_with(char::is_whitespace) && !line.starts_with('-') {
            in_related_works = false;
        }
    }

    first_error.map_or(Ok(()), Err)
}

/// `- <type>：<name>`; `None` if either part is empty
fn parse_related_work(line: &str) -> Option<RelatedWork> {
    let entry = line.trim_start_matches(&['-', ' '][..]).trim();
    let (kind, name) = entry.split_once(RELATED_WORK_SEPARATOR)?;
    let (kind, name) = (kind.trim(), name.trim());
    if kind.is_empty() || name.is_empty() {
        return None;
    }
    Some(RelatedWork {
        kind: kind.to_string(),
        name: name.to_string(),
    })
}

/// Take the series name from a related work that shares the title's leading token
fn infer_series_from_related(work: &RelatedWork, record: &mut Record) {
    if record.series_name.is_some() || !SERIES_MARKERS.iter().any(|m| work.kind.contains(m)) {
        return;
    }

    let title_base = leading_token(&record.title).to_lowercase();
    let related_base = leading_token(&work.name).to_lowercase();
    if title_base.is_empty() || related_base.chars().count() <= 2 {
        return;
    }

    let shares_base = title_base.starts_with(&related_base)
        || related_base.starts_with(&title_base)
        || record
            .names
            .aliases
            .iter()
            .any(|alias| title_base.starts_with(&leading_token(alias).to_lowercase()));

    if shares_base {
        let name = series::title_case(leading_token(&work.name).trim());
        tracing::debug!(
            "Inferred series name '{}' from related work '{}' for {}",
            name,
            work.name,
            record.source_filename
        );
        record.series_name = Some(name);
    }
}

fn leading_token(text: &str) -> &str {
    text.split(' ').next().unwrap_or_default()
}

fn extract_description(text: &str, record: &mut Record) -> Result<(), SectionError> {
    let description = text
        .lines()
        .filter(|line| !is_edit_marker(line))
        .collect::<Vec<_>>()
        .join("\n");
    set_if_some(&mut record.description, clean_description(&description));
    Ok(())
}

fn clean_description(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn extract_download_links(text: &str, record: &mut Record) -> Result<(), SectionError> {
    let mut current: Option<DownloadLink> = None;
    let mut first_error = None;

    for line in text.lines().map(str::trim) {
        if let Some(caps) = LINK.captures(line) {
            record.download_links.extend(current.take());

            let name = caps[1].trim().to_string();
            let url = caps[2].trim().to_string();
            if url.is_empty() {
                tracing::warn!(
                    "Download link '{}' without URL in file {}",
                    name,
                    record.source_filename
                );
                first_error.get_or_insert(SectionError::MissingLinkUrl(name));
                continue;
            }
            current = Some(DownloadLink {
                name,
                url,
                password: None,
            });
        } else if let Some(link) = current.as_mut() {
            if let Some(pw) = PASSWORD_LABELS.iter().find_map(|l| line.strip_prefix(l)) {
                link.password = clean(pw);
            }
        }
    }
    record.download_links.extend(current);

    first_error.map_or(Ok(()), Err)
}

fn extract_screenshots(text: &str, record: &mut Record) -> Result<(), SectionError> {
    record.screenshots.extend(
        IMAGE
            .captures_iter(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|s| !s.is_empty()),
    );
    Ok(())
}
