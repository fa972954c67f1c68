//! Where a deployment config comes from and how its text becomes JSON.
//!
//! Console deployments ship their config as a script that assigns an object
//! literal to a global (`var config = {...};`), frequently followed by
//! unrelated page bootstrap code. The loader only wants the literal, so text
//! sources are accepted either as bare JSON or in that wrapped form; anything
//! after the literal is ignored.

use crate::error::{CatalogError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// A configuration source: a file, text already in memory (bundled with
/// `include_str!` or embedded in a test), or a parsed JSON value.
#[derive(Debug, Clone)]
pub enum ConfigSource<'a> {
    Path(&'a Path),
    Text(&'a str),
    Value(Value),
}

impl<'a> ConfigSource<'a> {
    /// Human-readable label used in log events and error messages.
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Path(path) => path.display().to_string(),
            ConfigSource::Text(_) => "<inline text>".to_string(),
            ConfigSource::Value(_) => "<json value>".to_string(),
        }
    }

    /// Resolve the source to a JSON value.
    pub fn into_value(self) -> Result<Value> {
        match self {
            ConfigSource::Path(path) => {
                let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
                    path: PathBuf::from(path),
                    source,
                })?;
                parse_config_text(&text).map_err(|err| match err {
                    CatalogError::MalformedConfig(msg) => {
                        CatalogError::malformed(format!("{}: {msg}", path.display()))
                    }
                    other => other,
                })
            }
            ConfigSource::Text(text) => parse_config_text(text),
            ConfigSource::Value(value) => Ok(value),
        }
    }
}

/// Parse config text that is either bare JSON or a script assigning an
/// object literal.
///
/// The literal is read as JSON5, which covers what hand-maintained config
/// scripts contain beyond JSON: unquoted keys, trailing commas, single-quoted
/// strings and comments.
pub fn parse_config_text(text: &str) -> Result<Value> {
    let literal = extract_object_literal(text)?;
    json5::from_str::<Value>(literal)
        .map_err(|err| CatalogError::malformed(format!("invalid object literal: {err}")))
}

/// Return the first balanced `{...}` literal in `text`.
///
/// Bare JSON must start with `{`. Script text must assign the literal
/// (`= {`); leading directives such as `'use strict'` are skipped. Braces
/// inside string literals or comments do not count toward nesting.
pub fn extract_object_literal(text: &str) -> Result<&str> {
    let trimmed = text.trim_start();
    let start = if trimmed.starts_with('{') {
        text.len() - trimmed.len()
    } else {
        assignment_start(text).ok_or_else(|| {
            CatalogError::malformed("expected a JSON object or a `var <name> = {...}` assignment")
        })?
    };

    let bytes = &text.as_bytes()[start..];
    let mut depth = 0usize;
    let mut scan = Scan::Code;
    let mut idx = 0;
    while idx < bytes.len() {
        let byte = bytes[idx];
        let next = bytes.get(idx + 1).copied();
        match scan {
            Scan::Str { quote, escaped } => {
                scan = if escaped {
                    Scan::Str {
                        quote,
                        escaped: false,
                    }
                } else if byte == b'\\' {
                    Scan::Str {
                        quote,
                        escaped: true,
                    }
                } else if byte == quote {
                    Scan::Code
                } else {
                    scan
                };
            }
            Scan::LineComment => {
                if byte == b'\n' {
                    scan = Scan::Code;
                }
            }
            Scan::BlockComment => {
                if byte == b'*' && next == Some(b'/') {
                    scan = Scan::Code;
                    idx += 1;
                }
            }
            Scan::Code => match (byte, next) {
                (b'"' | b'\'', _) => {
                    scan = Scan::Str {
                        quote: byte,
                        escaped: false,
                    }
                }
                (b'/', Some(b'/')) => {
                    scan = Scan::LineComment;
                    idx += 1;
                }
                (b'/', Some(b'*')) => {
                    scan = Scan::BlockComment;
                    idx += 1;
                }
                (b'{', _) => depth += 1,
                (b'}', _) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&text[start..=start + idx]);
                    }
                }
                _ => {}
            },
        }
        idx += 1;
    }
    Err(CatalogError::malformed("unterminated object literal"))
}

#[derive(Clone, Copy)]
enum Scan {
    Code,
    Str { quote: u8, escaped: bool },
    LineComment,
    BlockComment,
}

fn assignment_start(text: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find('=') {
        let eq = search_from + rel;
        let rest = &text[eq + 1..];
        let after = rest.trim_start();
        if after.starts_with('{') {
            return Some(eq + 1 + (rest.len() - after.len()));
        }
        search_from = eq + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_passes_through() {
        let value = parse_config_text("  {\"appTitle\": \"Exosphere\"}\n").unwrap();
        assert_eq!(value["appTitle"], "Exosphere");
    }

    #[test]
    fn script_assignment_drops_trailing_code() {
        let text = r#"'use strict'

var config = {
  "appTitle": "Exosphere {beta}",
  "nested": {"quote": "a \" } b"}
}

var _paq = window._paq = window._paq || [];
_paq.push(['trackPageView']);
(function () { var u = "//stats.example.org/"; })();
"#;
        let value = parse_config_text(text).unwrap();
        assert_eq!(value["appTitle"], "Exosphere {beta}");
        assert_eq!(value["nested"]["quote"], "a \" } b");
        assert!(value.get("_paq").is_none());
    }

    #[test]
    fn relaxed_object_literal_parses() {
        let text = r#""use strict";

var cloud_configs = {
  // braces in comments { are ignored
  clouds: [
    {
      keystoneHostname: 'js2.jetstream-cloud.org',
      friendlySubName: null, /* } */
      note: 'closing } inside quotes',
    },
  ],
};
"#;
        let value = parse_config_text(text).unwrap();
        assert_eq!(value["clouds"][0]["keystoneHostname"], "js2.jetstream-cloud.org");
        assert!(value["clouds"][0]["friendlySubName"].is_null());
        assert_eq!(value["clouds"][0]["note"], "closing } inside quotes");
    }

    #[test]
    fn broken_literal_is_malformed() {
        let err = parse_config_text("var config = { appTitle: , };").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("invalid object literal"), "{err}");
    }

    #[test]
    fn text_without_literal_is_malformed() {
        let err = parse_config_text("'use strict'\nvar config = null;").unwrap_err();
        assert!(err.is_malformed());
        let err = parse_config_text("var config = {\"a\": 1").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ConfigSource::Path(Path::new("/nonexistent/config.js"))
            .into_value()
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
