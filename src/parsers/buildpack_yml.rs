//! buildpack.yml `bundler.version` key

use super::ParseError;
use serde::Deserialize;
use serde_yaml::Value;

/// Typed view used to read `bundler.version` as its source text.
#[derive(Debug, Deserialize)]
struct RawDocument {
    bundler: RawBundler,
}

#[derive(Debug, Deserialize)]
struct RawBundler {
    version: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildpackYmlParser;

impl BuildpackYmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Returns the version requested under `bundler.version`.
    pub fn parse(&self, content: &str) -> Result<Option<String>, ParseError> {
        if content.trim().is_empty() {
            return Ok(None);
        }

        let document: Value = serde_yaml::from_str(content)
            .map_err(|e| ParseError::MalformedConfig(e.to_string()))?;

        let root = match document {
            Value::Null => return Ok(None),
            Value::Mapping(root) => root,
            _ => {
                return Err(ParseError::MalformedConfig(
                    "top level must be a mapping".to_string(),
                ))
            }
        };

        let version = match root.get("bundler") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Mapping(bundler)) => bundler.get("version"),
            Some(_) => {
                return Err(ParseError::MalformedConfig(
                    "'bundler' must be a mapping".to_string(),
                ))
            }
        };

        match version {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(v)) if v.trim().is_empty() => Ok(None),
            Some(Value::String(v)) => Ok(Some(v.trim().to_string())),
            // a plain `2.10` resolves to the float 2.1; keep the scalar text
            Some(Value::Number(_)) => scalar_text(content).map(Some),
            Some(_) => Err(ParseError::MalformedConfig(
                "'bundler.version' must be a string".to_string(),
            )),
        }
    }
}

fn scalar_text(content: &str) -> Result<String, ParseError> {
    let raw: RawDocument = serde_yaml::from_str(content)
        .map_err(|e| ParseError::MalformedConfig(e.to_string()))?;
    Ok(raw.bundler.version.trim().to_string())
}
