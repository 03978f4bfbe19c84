//! # GameDex Common Library
//!
//! Shared code for the GameDex services including:
//! - Record model (normalized per-title records)
//! - Document loading (front matter + sectioned body) and directory listing
//! - The normalization engine: section segmentation, field extraction,
//!   duration tiers, identifier derivation, series/tag inference
//! - The record cache with identifier collision detection
//! - Configuration loading

pub mod cache;
pub mod config;
pub mod document;
pub mod duration;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod record;
pub mod sections;
pub mod series;
pub mod slug;

pub use cache::{CacheSnapshot, RecordCache};
pub use duration::DurationTier;
pub use error::{Error, Result};
pub use normalize::normalize_file;
pub use record::Record;
