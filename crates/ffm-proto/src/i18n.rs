//! Translation catalogs.
//!
//! A catalog is a flat `key -> template` map loaded from
//! `<lang_dir>/<locale>.json`. Templates carry `{placeholder}` tokens
//! resolved by plain substring substitution — no plural rules, no nesting.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

/// English catalog compiled into the binary, used when no `lang/` directory
/// has been installed yet.
const BUILTIN_EN: &str = include_str!("../../../lang/en.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown locale {0:?}")]
    UnknownLocale(String),
    #[error("unreadable catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Catalog {
    locale: String,
    strings: HashMap<String, String>,
}

impl Catalog {
    pub fn load(lang_dir: &Path, locale: &str) -> Result<Self, CatalogError> {
        let path = lang_dir.join(format!("{locale}.json"));
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) if locale == "en" => BUILTIN_EN.to_string(),
            Err(_) => return Err(CatalogError::UnknownLocale(locale.to_string())),
        };
        let strings = serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            locale: locale.to_string(),
            strings,
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Look up a bare key. A missing key renders as the key itself —
    /// visibly wrong but never fatal.
    pub fn get(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Look up a key and substitute `{name}`-style placeholders.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut out = self.get(key);
        for (name, value) in args {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let strings = serde_json::from_str(BUILTIN_EN).unwrap_or_default();
        Self {
            locale: "en".to_string(),
            strings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_english_parses() {
        let catalog = Catalog::default();
        assert!(catalog.get("record").len() > 1);
    }

    #[test]
    fn test_placeholder_substitution() {
        let catalog = Catalog::default();
        let line = catalog.format("saved_as", &[("file", "alice01.wav")]);
        assert!(line.contains("alice01.wav"));
        assert!(!line.contains("{file}"));
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        let catalog = Catalog::default();
        assert_eq!(catalog.get("not_a_real_key"), "not_a_real_key");
    }

    #[test]
    fn test_unknown_locale_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(dir.path(), "tlh").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownLocale(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("fr.json"),
            r#"{"record": "Enregistrer", "on_air": "{name} sur {frequency} FM"}"#,
        )
        .unwrap();
        let catalog = Catalog::load(dir.path(), "fr").unwrap();
        assert_eq!(catalog.get("record"), "Enregistrer");
        assert_eq!(
            catalog.format("on_air", &[("name", "alice"), ("frequency", "91.0")]),
            "alice sur 91.0 FM"
        );
    }
}
