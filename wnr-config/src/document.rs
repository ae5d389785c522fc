// SPDX-License-Identifier: MIT
//
// WNR Client Configuration: Entropy Source Factory
// Copyright (c) 2025 Valer Bocan, PhD, CSSLP
// Email: valer.bocan@upt.ro
//
// Department of Computer and Information Technology
// Politehnica University of Timisoara
//
// https://github.com/vbocan/qrng-data-diode

//! Configuration document handle
//!
//! Parses YAML text into a `config::Config` tree and exposes dotted-path lookups
//! (`WnrClient.drbg.type`) with the scalar coercion rules of the `config` crate.
//! Keys with a `null` value are treated as absent.

use crate::{Error, Result};
use config::{Config, ConfigError};
use serde_yaml::{Mapping, Value};

/// Parsed configuration document
#[derive(Debug)]
pub struct Document {
    tree: Config,
}

impl Document {
    /// Parse document text
    pub fn parse(text: &str) -> Result<Self> {
        let mut root = if text.trim().is_empty() {
            Value::Mapping(Mapping::new())
        } else {
            serde_yaml::from_str::<Value>(text)?
        };

        match root {
            Value::Null => root = Value::Mapping(Mapping::new()),
            Value::Mapping(_) => {}
            _ => {
                return Err(Error::DocumentSyntax {
                    line: None,
                    message: "document root must be a mapping".to_string(),
                })
            }
        }
        prune_nulls(&mut root);
        check_integers(&root, &mut Vec::new())?;

        let tree = Config::try_from(&root).map_err(|e| Error::DocumentSyntax {
            line: None,
            message: e.to_string(),
        })?;

        Ok(Self { tree })
    }

    /// Look up a string setting, `None` if absent
    pub fn lookup_str(&self, path: &str) -> Result<Option<String>> {
        present(self.tree.get_string(path), path)
    }

    /// Look up an integer setting, `None` if absent
    pub fn lookup_int(&self, path: &str) -> Result<Option<i64>> {
        present(self.tree.get_int(path), path)
    }

    pub fn require_str(&self, path: &str) -> Result<String> {
        self.lookup_str(path)?
            .ok_or_else(|| Error::MissingField(path.to_string()))
    }

    pub fn require_int(&self, path: &str) -> Result<i64> {
        self.lookup_int(path)?
            .ok_or_else(|| Error::MissingField(path.to_string()))
    }

    /// Look up a group of settings, `None` if absent
    pub fn setting(&self, path: &str) -> Result<Option<Setting<'_>>> {
        let table = present(self.tree.get_table(path), path)?;
        Ok(table.map(|_| Setting {
            document: self,
            path: path.to_string(),
        }))
    }
}

/// Named subtree of a document, with lookups relative to it
#[derive(Debug, Clone)]
pub struct Setting<'a> {
    document: &'a Document,
    path: String,
}

impl Setting<'_> {
    /// Full dotted path of the subtree
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment (`seed` for `WnrClient.source.seed`)
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Full dotted path of a key below this subtree
    pub fn key_path(&self, key: &str) -> String {
        format!("{}.{}", self.path, key)
    }

    pub fn lookup_str(&self, key: &str) -> Result<Option<String>> {
        self.document.lookup_str(&self.key_path(key))
    }

    pub fn lookup_int(&self, key: &str) -> Result<Option<i64>> {
        self.document.lookup_int(&self.key_path(key))
    }

    pub fn require_str(&self, key: &str) -> Result<String> {
        self.document.require_str(&self.key_path(key))
    }

    pub fn require_int(&self, key: &str) -> Result<i64> {
        self.document.require_int(&self.key_path(key))
    }
}

fn present<T>(lookup: std::result::Result<T, ConfigError>, path: &str) -> Result<Option<T>> {
    match lookup {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(Error::invalid(path, e.to_string())),
    }
}

fn prune_nulls(value: &mut Value) {
    match value {
        Value::Mapping(map) => map.retain(|_, v| {
            prune_nulls(v);
            !v.is_null()
        }),
        Value::Sequence(items) => items.iter_mut().for_each(prune_nulls),
        _ => {}
    }
}

/// Integers must fit an `i64`
fn check_integers(value: &Value, path: &mut Vec<String>) -> Result<()> {
    match value {
        Value::Number(n) if n.is_u64() && n.as_i64().is_none() => Err(Error::invalid(
            path.join("."),
            format!("integer {} is too large", n),
        )),
        Value::Mapping(map) => {
            for (key, child) in map {
                path.push(match key {
                    Value::String(s) => s.clone(),
                    other => serde_yaml::to_string(other)
                        .map(|s| s.trim_end().to_string())
                        .unwrap_or_default(),
                });
                check_integers(child, path)?;
                path.pop();
            }
            Ok(())
        }
        Value::Sequence(items) => items.iter().try_for_each(|item| check_integers(item, path)),
        Value::Tagged(tagged) => check_integers(&tagged.value, path),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = r#"
WnrClient:
  dir:
    working: /var/lib/wnr
  polling:
    interval: "250"
  source:
    seed:
      type: filepath
      URI: /api
      empty:
"#;

    #[test]
    fn test_dotted_lookup() {
        let doc = Document::parse(TEXT).unwrap();
        assert_eq!(
            doc.lookup_str("WnrClient.dir.working").unwrap().as_deref(),
            Some("/var/lib/wnr")
        );
        assert_eq!(doc.lookup_str("WnrClient.dir.socket").unwrap(), None);
        assert!(matches!(
            doc.require_str("WnrClient.dir.socket"),
            Err(Error::MissingField(p)) if p == "WnrClient.dir.socket"
        ));
    }

    #[test]
    fn test_integer_coercion() {
        let doc = Document::parse(TEXT).unwrap();
        assert_eq!(doc.lookup_int("WnrClient.polling.interval").unwrap(), Some(250));

        let err = doc.lookup_int("WnrClient.dir.working").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_setting_lookup() {
        let doc = Document::parse(TEXT).unwrap();
        let seed = doc.setting("WnrClient.source.seed").unwrap().unwrap();
        assert_eq!(seed.name(), "seed");
        assert_eq!(seed.path(), "WnrClient.source.seed");
        assert_eq!(seed.require_str("type").unwrap(), "filepath");
        assert_eq!(seed.lookup_str("URI").unwrap().as_deref(), Some("/api"));
        assert_eq!(seed.lookup_str("empty").unwrap(), None);

        assert!(doc.setting("WnrClient.source.stream").unwrap().is_none());
        // scalar where a group is expected
        assert!(doc.setting("WnrClient.dir.working").is_err());
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::parse("").unwrap();
        assert_eq!(doc.lookup_str("WnrClient.dir.working").unwrap(), None);
        let doc = Document::parse("   \n\n").unwrap();
        assert!(doc.setting("WnrClient").unwrap().is_none());
    }

    #[test]
    fn test_syntax_error_line() {
        let err = Document::parse("first: 1\nsecond: 2\nthird: a: b\n").unwrap_err();
        match err {
            Error::DocumentSyntax { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_oversized_integer() {
        let err = Document::parse("WnrClient:\n  drbg:\n    reseed_interval: 18446744073709551615\n")
            .unwrap_err();
        assert!(
            matches!(&err, Error::InvalidValue { path, .. } if path == "WnrClient.drbg.reseed_interval"),
            "{}",
            err
        );
    }

    #[test]
    fn test_float_rounds_to_integer() {
        let doc = Document::parse("WnrClient:\n  buffer:\n    size: 1024.6\n").unwrap();
        assert_eq!(doc.lookup_int("WnrClient.buffer.size").unwrap(), Some(1025));
    }

    #[test]
    fn test_key_case_ignored() {
        let doc = Document::parse("wnrclient:\n  source:\n    seed:\n      uri: /api\n").unwrap();
        assert_eq!(doc.lookup_str("WnrClient.source.seed.URI").unwrap().as_deref(), Some("/api"));
    }

    #[test]
    fn test_non_mapping_root() {
        let err = Document::parse("- just\n- a list\n").unwrap_err();
        assert!(matches!(err, Error::DocumentSyntax { line: None, .. }));
    }
}
