//! Series and tag inference from titles
//!
//! Two stages, tried in order:
//! 1. A priority table of literal title prefixes for well-known series.
//! 2. A generic `<base> <separator> <episode|volume|roman numeral>` pattern.
//!
//! Both are heuristics. A title that matches neither yields no guess.

use once_cell::sync::Lazy;
use regex::Regex;

/// A known series prefix
struct KnownSeries {
    /// Lower-case title prefix
    prefix: &'static str,
    /// Series name as displayed
    name: &'static str,
    /// Tag prefix implied by the series (e.g. volumes)
    tag_prefix: Option<&'static str>,
}

const fn known(prefix: &'static str, name: &'static str, tag_prefix: Option<&'static str>) -> KnownSeries {
    KnownSeries {
        prefix,
        name,
        tag_prefix,
    }
}

/// More specific prefixes come first
const KNOWN_SERIES: &[KnownSeries] = &[
    known("9-nine-", "9-nine-", None),
    known("nekopara vol.", "Nekopara", Some("Vol.")),
    known("nekopara", "Nekopara", None),
    known("steins;gate", "Steins;Gate", None),
    known("robotics;notes", "Robotics;Notes", None),
    known("chaos;head", "Chaos;Head", None),
    known("chaos;child", "Chaos;Child", None),
    known("grisaia no kajitsu", "Grisaia", Some("Kajitsu")),
    known("grisaia no meikyuu", "Grisaia", Some("Meikyuu")),
    known("grisaia no rakuen", "Grisaia", Some("Rakuen")),
    known("grisaia phantom trigger", "Grisaia Phantom Trigger", Some("Vol.")),
    known("riddle joker", "Riddle Joker", None),
];

/// Edition suffixes that are not part of a series name
const DECORATIVE_SUFFIXES: &[&str] = &["hd remaster", "complete edition", "plus", "full voice"];

/// Shortest accepted series base from the generic pattern
const MIN_BASE_CHARS: usize = 3;

/// Keywords that make a bare number a volume/chapter rather than an episode
const NON_EPISODE_KEYWORDS: &[&str] = &["vol", "volume", "chapter", "part"];

static LEADING_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(ep\s*[0-9]+|vol\.\s*[0-9]+|[0-9]+|[ivxlcdm]+)(?:\s|$)").expect("valid tag regex")
});

static GENERIC_SERIES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^(.*?)(?:",
        r"[\s:_-]+(?:ep(?:isode)?|vol(?:ume)?|chapter|part|ภาค)[\s#.]*([a-z0-9]+)",
        r"|[\s:_-]+([ivxlcdm]+)",
        r"|\s+([0-9]+)\s*作",
        r")$"
    ))
    .expect("valid series regex")
});

/// Inferred series name and optional episode/volume tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesGuess {
    pub name: String,
    pub tag: Option<String>,
}

/// Guess the series of a title
pub fn infer(title: &str) -> Option<SeriesGuess> {
    let lower = title.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    let guess = from_known_prefix(&lower).or_else(|| from_generic_pattern(&lower));
    match &guess {
        Some(g) => tracing::debug!("Inferred series {:?} tag {:?} from title '{}'", g.name, g.tag, title),
        None => tracing::debug!("No series inferred from title '{}'", title),
    }
    guess
}

fn from_known_prefix(lower: &str) -> Option<SeriesGuess> {
    let (entry, rest) = KNOWN_SERIES
        .iter()
        .find_map(|k| lower.strip_prefix(k.prefix).map(|rest| (k, rest.trim())))?;

    let tag = LEADING_TAG.captures(rest).map(|caps| {
        let tag = caps[1].to_uppercase();
        match entry.tag_prefix {
            Some(prefix) if !tag.starts_with(&prefix.to_uppercase()) => {
                format!("{} {}", prefix.trim(), tag)
            }
            None if is_number(&tag) => format!("EP{}", tag),
            _ => tag,
        }
    });

    Some(SeriesGuess {
        name: entry.name.to_string(),
        tag,
    })
}

fn from_generic_pattern(lower: &str) -> Option<SeriesGuess> {
    let caps = GENERIC_SERIES.captures(lower)?;

    let mut base = caps[1].trim();
    for suffix in DECORATIVE_SUFFIXES {
        if let Some(stripped) = base.strip_suffix(suffix) {
            base = stripped.trim();
        }
    }
    if base.chars().count() < MIN_BASE_CHARS {
        return None;
    }

    let tag = (2..=4)
        .find_map(|i| caps.get(i))
        .map(|m| m.as_str().to_uppercase())
        .filter(|t| !t.is_empty())
        .map(|tag| {
            if is_number(&tag) && !NON_EPISODE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
                format!("EP{}", tag)
            } else {
                tag
            }
        });

    Some(SeriesGuess {
        name: title_case(base),
        tag,
    })
}

fn is_number(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Capitalize the first letter of every word and lower-case the rest
///
/// A word starts at any letter that does not follow another letter, so
/// `steins;gate` becomes `Steins;Gate`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_letter = false;
    for c in text.chars() {
        if prev_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_letter = c.is_alphabetic();
    }
    out
}
