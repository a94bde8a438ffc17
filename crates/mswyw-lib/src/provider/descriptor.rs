//! Descriptor classification

use serde_json::Value;
use std::path::{Path, PathBuf};
use url::Url;

/// Schemes a descriptor may start with to be treated as a URL
const URL_SCHEMES: [&str; 5] = ["http://", "https://", "ftp://", "ftps://", "file://"];

/// How a provider descriptor is interpreted
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// An existing local file holding JSON
    FilePath(PathBuf),
    /// A remote (or `file://`) location holding JSON
    Url(Url),
    /// The descriptor itself is a JSON document
    Literal(Value),
    /// Name of a registered computation unit
    ModuleName(String),
}

impl Descriptor {
    /// Classify a descriptor string
    ///
    /// First match wins: existing file, URL scheme prefix, JSON literal,
    /// computation unit name. A string with a URL prefix that does not parse
    /// as a URL is treated as a unit name and will fail to resolve there.
    pub fn classify(raw: &str) -> Self {
        if Path::new(raw).is_file() {
            return Descriptor::FilePath(PathBuf::from(raw));
        }

        if has_url_scheme(raw) {
            if let Ok(url) = Url::parse(raw) {
                return Descriptor::Url(url);
            }
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Descriptor::Literal(value),
            Err(_) => Descriptor::ModuleName(raw.to_string()),
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Descriptor::FilePath(_) => "file",
            Descriptor::Url(_) => "url",
            Descriptor::Literal(_) => "literal",
            Descriptor::ModuleName(_) => "module",
        }
    }
}

fn has_url_scheme(raw: &str) -> bool {
    let lowered = raw.to_ascii_lowercase();
    URL_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_existing_file_wins() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "\"https://example.com/data.json\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert_eq!(
            Descriptor::classify(&path),
            Descriptor::FilePath(PathBuf::from(&path))
        );
    }

    #[test]
    fn test_url_schemes_case_insensitive() {
        for raw in [
            "http://host/a.json",
            "HTTPS://host/a.json",
            "ftp://host/a.json",
            "Ftps://host/a.json",
            "FILE:///tmp/a.json",
        ] {
            let classified = Descriptor::classify(raw);
            assert_eq!(classified.kind(), "url", "{raw} should be a URL");
        }
    }

    #[test]
    fn test_literal_json() {
        assert_eq!(
            Descriptor::classify(r#"[{"mem": 1}]"#),
            Descriptor::Literal(json!([{"mem": 1}]))
        );
        assert_eq!(Descriptor::classify("{}"), Descriptor::Literal(json!({})));
    }

    #[test]
    fn test_falls_back_to_module_name() {
        assert_eq!(
            Descriptor::classify("kibana"),
            Descriptor::ModuleName("kibana".to_string())
        );
        assert_eq!(
            Descriptor::classify("{not json"),
            Descriptor::ModuleName("{not json".to_string())
        );
    }

    #[test]
    fn test_missing_file_is_not_a_file_path() {
        let classified = Descriptor::classify("/definitely/not/here.json");
        assert_eq!(classified.kind(), "module");
    }
}
