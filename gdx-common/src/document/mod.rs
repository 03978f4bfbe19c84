//! Document loading
//!
//! A document is a UTF-8 markdown file with an optional YAML front matter
//! block delimited by `---` lines, followed by the body.

mod lister;

pub use lister::{list_documents, ListError, DOCUMENT_EXTENSION};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Front matter delimiter line
const FRONT_MATTER_FENCE: &str = "---";

/// Document loading errors (fatal for the whole document)
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File could not be read
    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, String),

    /// File content is not valid UTF-8
    #[error("Invalid UTF-8 in {0}: {1}")]
    Encoding(PathBuf, String),

    /// Front matter block is not valid YAML or not a mapping
    #[error("Invalid front matter in {0}: {1}")]
    FrontMatter(PathBuf, String),
}

/// Front matter mapping with typed accessors
#[derive(Debug, Clone, Default)]
pub struct Metadata(HashMap<String, serde_yaml::Value>);

impl Metadata {
    /// Scalar value rendered as text; null, empty strings, and collections are absent
    pub fn text(&self, key: &str) -> Option<String> {
        let text = match self.0.get(key)? {
            serde_yaml::Value::String(s) => s.trim().to_string(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Tagged(tagged) => scalar_text(&tagged.value)?,
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Like [`Metadata::text`], but string values are returned untrimmed
    pub fn raw_text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            serde_yaml::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_yaml::Value::String(_) => None,
            _ => self.text(key),
        }
    }

    /// List value rendered as text items; `None` if the key is missing or not a list
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        match self.0.get(key)? {
            serde_yaml::Value::Sequence(items) => Some(
                items
                    .iter()
                    .filter_map(scalar_text)
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, serde_yaml::Value)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, serde_yaml::Value)>>(iter: T) -> Self {
        Metadata(iter.into_iter().collect())
    }
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.trim().to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A loaded document: metadata plus body text
#[derive(Debug, Clone)]
pub struct Document {
    pub metadata: Metadata,
    pub body: String,
}

impl Document {
    /// Split raw text into front matter and body
    ///
    /// `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, DocumentError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let Some((yaml, body)) = split_front_matter(text) else {
            return Ok(Document {
                metadata: Metadata::default(),
                body: text.to_string(),
            });
        };

        let metadata = if yaml.trim().is_empty() {
            Metadata::default()
        } else {
            let front_matter = |e: String| DocumentError::FrontMatter(origin.to_path_buf(), e);
            match serde_yaml::from_str(yaml).map_err(|e| front_matter(e.to_string()))? {
                serde_yaml::Value::Null => Metadata::default(),
                serde_yaml::Value::Mapping(mapping) => mapping
                    .into_iter()
                    .filter_map(|(k, v)| scalar_text(&k).map(|k| (k, v)))
                    .collect(),
                _ => return Err(front_matter("expected a YAML mapping".to_string())),
            }
        };

        Ok(Document {
            metadata,
            body: body.to_string(),
        })
    }

    /// Read and parse a document file
    ///
    /// The file handle is released before parsing.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path)
            .map_err(|e| DocumentError::Read(path.to_path_buf(), e.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| DocumentError::Encoding(path.to_path_buf(), e.to_string()))?;
        Self::parse(&text, path)
    }
}

/// Returns `(yaml, body)` when the text opens with a fenced front matter block
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != FRONT_MATTER_FENCE {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == FRONT_MATTER_FENCE {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }

    // Unterminated fence: treat the whole file as body
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Document {
        Document::parse(text, Path::new("test.md")).unwrap()
    }

    #[test]
    fn test_parse_front_matter_and_body() {
        let doc = parse("---\ntitle: Foo\nabbrlink: 1234\n---\n## 游戏简介\nBody\n");
        assert_eq!(doc.metadata.text("title").as_deref(), Some("Foo"));
        assert_eq!(doc.metadata.text("abbrlink").as_deref(), Some("1234"));
        assert_eq!(doc.body, "## 游戏简介\nBody\n");
    }

    #[test]
    fn test_parse_without_front_matter() {
        let doc = parse("## 游戏简介\nBody\n");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "## 游戏简介\nBody\n");
    }

    #[test]
    fn test_parse_unterminated_fence_is_body() {
        let doc = parse("---\ntitle: Foo\n");
        assert!(doc.metadata.is_empty());
        assert!(doc.body.contains("title: Foo"));
    }

    #[test]
    fn test_parse_bom_and_crlf() {
        let doc = parse("\u{feff}---\r\ntitle: Foo\r\n---\r\nBody");
        assert_eq!(doc.metadata.text("title").as_deref(), Some("Foo"));
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_parse_invalid_yaml_is_error() {
        let result = Document::parse("---\ntitle: [unclosed\n---\n", Path::new("bad.md"));
        assert!(matches!(result, Err(DocumentError::FrontMatter(_, _))));
    }

    #[test]
    fn test_metadata_text_and_list_accessors() {
        let doc = parse(
            "---\ntitle: ''\ndate: 2024-03-15\nplatforms:\n  - PC\n  - Switch\nseries: ~\n---\n",
        );
        assert_eq!(doc.metadata.text("title"), None);
        assert_eq!(doc.metadata.text("date").as_deref(), Some("2024-03-15"));
        assert_eq!(
            doc.metadata.list("platforms"),
            Some(vec!["PC".to_string(), "Switch".to_string()])
        );
        assert_eq!(doc.metadata.list("date"), None);
        assert_eq!(doc.metadata.text("series"), None);
    }

    #[test]
    fn test_raw_text_keeps_whitespace() {
        let doc = parse("---\ntitle: \"  Padded Title \"\nblank: \"  \"\nyear: 2016\n---\n");
        assert_eq!(doc.metadata.raw_text("title").as_deref(), Some("  Padded Title "));
        assert_eq!(doc.metadata.text("title").as_deref(), Some("Padded Title"));
        assert_eq!(doc.metadata.raw_text("blank"), None);
        assert_eq!(doc.metadata.raw_text("year").as_deref(), Some("2016"));
    }

    #[test]
    fn test_null_front_matter_is_empty_metadata() {
        let doc = parse("---\n~\n---\n## 游戏简介\nBody\n");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "## 游戏简介\nBody\n");

        let doc = parse("---\n# only a comment\n---\nBody");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_scalar_front_matter_is_error() {
        let result = Document::parse("---\njust text\n---\n", Path::new("bad.md"));
        assert!(matches!(result, Err(DocumentError::FrontMatter(_, _))));
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.md");
        std::fs::write(&path, [0x2d, 0x2d, 0x2d, 0x0a, 0xff, 0xfe, 0x0a]).unwrap();
        assert!(matches!(
            Document::load(&path),
            Err(DocumentError::Encoding(_, _))
        ));
    }
}
