//! Section segmentation
//!
//! A body is split on level-two headings (`## Title`). Each section keeps its
//! non-blank lines in input order; "edit this page" marker lines are dropped.
//! The section kind is resolved from the heading once, here.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker line inserted by the documentation site generator
pub const EDIT_MARKER: &str = "[编辑此页面]";

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^##\s+(.*)").expect("valid heading regex"));

/// Recognized section kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Cover,
    Names,
    Info,
    Description,
    DownloadLinks,
    Screenshots,
    /// Unrecognized heading; ignored by extraction
    Unknown,
}

impl SectionKind {
    /// Resolve a heading title
    pub fn from_title(title: &str) -> Self {
        match title {
            "游戏封面" => SectionKind::Cover,
            "游戏名称" => SectionKind::Names,
            "游戏信息" => SectionKind::Info,
            "游戏简介" => SectionKind::Description,
            "下载链接" => SectionKind::DownloadLinks,
            "游戏截图" => SectionKind::Screenshots,
            _ => SectionKind::Unknown,
        }
    }
}

/// One titled block of a document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    /// Raw (untrimmed) non-blank lines
    pub lines: Vec<String>,
}

impl Section {
    /// Lines joined with newlines, trimmed as a whole
    pub fn text(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }
}

/// True if the trimmed line is an "edit this page" marker
pub fn is_edit_marker(line: &str) -> bool {
    line.trim().starts_with(EDIT_MARKER)
}

/// Split a body into sections
///
/// Text before the first heading is ignored. Sections with an empty title or no
/// content lines are discarded. Repeated headings yield repeated sections.
pub fn segment(body: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in body.lines() {
        if let Some(caps) = HEADING.captures(line) {
            flush(&mut sections, current.take());
            current = Some((caps[1].trim().to_string(), Vec::new()));
        } else if let Some((_, lines)) = current.as_mut() {
            if !line.trim().is_empty() && !is_edit_marker(line) {
                lines.push(line.to_string());
            }
        }
    }
    flush(&mut sections, current);

    sections
}

fn flush(sections: &mut Vec<Section>, open: Option<(String, Vec<String>)>) {
    if let Some((title, lines)) = open {
        if !title.is_empty() && !lines.is_empty() {
            sections.push(Section {
                kind: SectionKind::from_title(&title),
                title,
                lines,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_basic() {
        let body = "preamble\n## 游戏封面\n![cover](a.png)\n\n## 游戏简介\n[编辑此页面](x)\nLine one\n  Line two\n";
        let sections = segment(body);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].kind, SectionKind::Cover);
        assert_eq!(sections[0].lines, vec!["![cover](a.png)"]);
        assert_eq!(sections[1].kind, SectionKind::Description);
        assert_eq!(sections[1].lines, vec!["Line one", "  Line two"]);
        assert_eq!(sections[1].text(), "Line one\n  Line two");
    }

    #[test]
    fn test_segment_discards_empty_and_untitled_sections() {
        let body = "## 游戏封面\n\n## \ncontent\n##NoSpace\n### 游戏截图\n## 游戏截图\n![s](1.png)";
        let sections = segment(body);
        // "##NoSpace" and "### ..." are content lines, but they land in the untitled section
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Screenshots);
    }

    #[test]
    fn test_segment_keeps_repeated_and_unknown_headings() {
        let body = "## 游戏截图\n![a](1.png)\n## 杂项\nwhatever\n## 游戏截图\n![b](2.png)";
        let kinds: Vec<SectionKind> = segment(body).iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Screenshots,
                SectionKind::Unknown,
                SectionKind::Screenshots
            ]
        );
    }

    #[test]
    fn test_segment_no_headings() {
        assert!(segment("just text\nmore text").is_empty());
        assert!(segment("").is_empty());
    }
}
