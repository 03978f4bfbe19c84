//! Duration parsing and tier classification
//!
//! Durations are written free-form ("约 25h", "10-15h", "2.5 H"). The first
//! decimal number followed by an `h` marker is taken as the hour count.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bounds (exclusive) of the four bounded tiers, in hours
const VERY_SHORT_MAX: f64 = 5.0;
const SHORT_MAX: f64 = 10.0;
const MEDIUM_MAX: f64 = 30.0;
const LONG_MAX: f64 = 50.0;

static HOURS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([\d.]+)\s*h").expect("valid hours regex"));

/// Duration tier of a title
///
/// Ordered: `Unknown` sorts below every known tier, and known tiers sort by length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DurationTier {
    #[default]
    #[serde(rename = "未知时长")]
    Unknown,
    /// Under 5 hours
    #[serde(rename = "超短篇")]
    VeryShort,
    /// 5 to under 10 hours
    #[serde(rename = "短篇")]
    Short,
    /// 10 to under 30 hours
    #[serde(rename = "中篇")]
    Medium,
    /// 30 to under 50 hours
    #[serde(rename = "长篇")]
    Long,
    /// 50 hours and above
    #[serde(rename = "超长篇")]
    VeryLong,
}

impl DurationTier {
    /// Classify an optional hour count
    ///
    /// `None`, negative and NaN values are `Unknown`. Bounds are half-open:
    /// exactly 5.0 hours is `Short`, not `VeryShort`.
    pub fn from_hours(hours: Option<f64>) -> Self {
        match hours {
            Some(h) if h >= 0.0 => {
                if h < VERY_SHORT_MAX {
                    DurationTier::VeryShort
                } else if h < SHORT_MAX {
                    DurationTier::Short
                } else if h < MEDIUM_MAX {
                    DurationTier::Medium
                } else if h < LONG_MAX {
                    DurationTier::Long
                } else {
                    DurationTier::VeryLong
                }
            }
            _ => DurationTier::Unknown,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            DurationTier::Unknown => "未知时长",
            DurationTier::VeryShort => "超短篇",
            DurationTier::Short => "短篇",
            DurationTier::Medium => "中篇",
            DurationTier::Long => "长篇",
            DurationTier::VeryLong => "超长篇",
        }
    }
}

impl fmt::Display for DurationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Extract an hour count from free text
///
/// Returns `None` when no `<number>h` pattern exists or the number does not parse.
pub fn parse_hours(text: &str) -> Option<f64> {
    let caps = HOURS_PATTERN.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    (value >= 0.0 && value.is_finite()).then_some(value)
}
