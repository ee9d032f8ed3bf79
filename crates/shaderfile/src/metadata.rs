use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Descriptive fields persisted alongside a shader's source.
///
/// Pure data: attached and detached on load/save, never consulted by the
/// compiler. Field names keep the PascalCase spelling used by existing
/// shader files so documents remain interchangeable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShaderMetadata {
    pub name: String,
    pub description: String,
    pub credit: String,
    pub version: String,
    pub categories: Vec<String>,
    pub resource_paths: Vec<PathBuf>,
}

impl ShaderMetadata {
    /// True when nothing worth writing a preamble for has been filled in.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.description.is_empty()
            && self.credit.is_empty()
            && self.version.is_empty()
            && self.categories.is_empty()
            && self.resource_paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_fields() {
        let metadata = ShaderMetadata {
            name: "plasma".into(),
            description: "swirly colours".into(),
            credit: "someone".into(),
            version: "1.0".into(),
            categories: vec!["generative".into()],
            resource_paths: vec![PathBuf::from("noise.png")],
        };

        let json = serde_json::to_string_pretty(&metadata).expect("serialize");
        let parsed: ShaderMetadata = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn missing_fields_default() {
        let parsed: ShaderMetadata = serde_json::from_str(r#"{"Name":"x"}"#).expect("parse");
        assert_eq!(parsed.name, "x");
        assert!(parsed.version.is_empty());
        assert!(parsed.categories.is_empty());
    }

    #[test]
    fn empty_detection() {
        assert!(ShaderMetadata::default().is_empty());
        let named = ShaderMetadata {
            name: "x".into(),
            ..Default::default()
        };
        assert!(!named.is_empty());
    }
}
