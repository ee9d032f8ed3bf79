use std::fs;
use std::path::{Path, PathBuf};

use crate::metadata::ShaderMetadata;

/// A shader as it exists on disk: optional metadata preamble plus the raw
/// fragment source. This is the unit round-tripped by load and save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderDocument {
    pub metadata: ShaderMetadata,
    pub fragment_code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read shader file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write shader file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShaderDocument {
    pub fn new(fragment_code: impl Into<String>) -> Self {
        Self {
            metadata: ShaderMetadata::default(),
            fragment_code: fragment_code.into(),
        }
    }

    /// Renders the on-disk form: `/*<pretty JSON>*/`, a blank line, then
    /// the fragment source verbatim.
    pub fn to_text(&self) -> String {
        let json = serde_json::to_string_pretty(&self.metadata)
            .expect("shader metadata serializes to JSON");
        format!("/*{json}*/\n\n{}", self.fragment_code)
    }

    /// Parses a shader file's contents. A leading `/* ... */` block that
    /// holds valid metadata JSON becomes the document's metadata; anything
    /// else is treated as plain fragment source (a non-JSON comment is
    /// perfectly legal GLSL, so the text is kept untouched).
    pub fn parse(text: &str) -> Self {
        if let Some(rest) = text.strip_prefix("/*") {
            if let Some(end) = rest.find("*/") {
                let (preamble, tail) = rest.split_at(end);
                if let Ok(metadata) = serde_json::from_str::<ShaderMetadata>(preamble) {
                    let code = strip_separator(&tail[2..]);
                    return Self {
                        metadata,
                        fragment_code: code.to_string(),
                    };
                }
            }
        }
        Self::new(text)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "loaded shader document");
        Ok(Self::parse(&text))
    }

    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        fs::write(path, self.to_text()).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "saved shader document");
        Ok(())
    }
}

/// Drops the blank-line separator emitted by `to_text`, leaving the
/// fragment source exactly as it was saved.
fn strip_separator(tail: &str) -> &str {
    for separator in ["\r\n\r\n", "\n\n", "\r\n", "\n"] {
        if let Some(code) = tail.strip_prefix(separator) {
            return code;
        }
    }
    tail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_metadata_and_exact_code() {
        let document = ShaderDocument {
            metadata: ShaderMetadata {
                name: "test".into(),
                version: "1.0".into(),
                ..Default::default()
            },
            fragment_code: "void main(){}".into(),
        };

        let reparsed = ShaderDocument::parse(&document.to_text());
        assert_eq!(reparsed.metadata.name, "test");
        assert_eq!(reparsed.metadata.version, "1.0");
        assert_eq!(reparsed.fragment_code, "void main(){}");
        assert_eq!(reparsed, document);
    }

    #[test]
    fn round_trip_keeps_leading_blank_lines_in_code() {
        let document = ShaderDocument {
            metadata: ShaderMetadata {
                name: "spacing".into(),
                ..Default::default()
            },
            fragment_code: "\n\nvoid main(){}\n".into(),
        };
        let reparsed = ShaderDocument::parse(&document.to_text());
        assert_eq!(reparsed.fragment_code, document.fragment_code);
    }

    #[test]
    fn plain_file_without_preamble_is_all_code() {
        let text = "void main() { out_Color = vec4(1.0); }";
        let document = ShaderDocument::parse(text);
        assert!(document.metadata.is_empty());
        assert_eq!(document.fragment_code, text);
    }

    #[test]
    fn ordinary_comment_preamble_is_not_mistaken_for_metadata() {
        let text = "/* just a comment */\nvoid main(){}";
        let document = ShaderDocument::parse(text);
        assert!(document.metadata.is_empty());
        assert_eq!(document.fragment_code, text);
    }

    #[test]
    fn saved_file_starts_with_metadata_block() {
        let document = ShaderDocument {
            metadata: ShaderMetadata {
                name: "header".into(),
                ..Default::default()
            },
            fragment_code: "void main(){}".into(),
        };
        let text = document.to_text();
        assert!(text.starts_with("/*"));
        assert!(text.contains("\"Name\": \"header\""));
        assert!(text.contains("*/\n\n"));
    }

    #[test]
    fn load_and_save_round_trip_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("demo.frag");
        let document = ShaderDocument {
            metadata: ShaderMetadata {
                name: "disk".into(),
                credit: "author".into(),
                ..Default::default()
            },
            fragment_code: "void main(){ out_Color = vec4(0.5); }\n".into(),
        };

        document.save(&path).expect("save");
        let loaded = ShaderDocument::load(&path).expect("load");
        assert_eq!(loaded, document);
    }

    #[test]
    fn load_reports_missing_file() {
        let error = ShaderDocument::load(Path::new("/nonexistent/shader.frag"))
            .expect_err("load must fail");
        assert!(matches!(error, DocumentError::Read { .. }));
    }
}
