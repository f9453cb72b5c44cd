use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

pub use serde_yaml::{from_value, Mapping, Number, Sequence, Value};

mod util;
pub use util::*;

use crate::version::ServerVersion;

/// Options for compiling queries against a Firebird server
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
pub struct CompilerConfig {
    /// The server version to target, in any format accepted by [`ServerVersion::parse`].
    /// Defaults to the latest known version.
    #[serde(default, deserialize_with = "version_string")]
    pub server_version: Option<String>,
    /// How bound parameters are written into the SQL
    #[serde(default)]
    pub placeholders: PlaceholderStyle,
    /// Truncates compiled statements longer than this when logging them
    pub log_max_length: Option<usize>,
}

/// The placeholder syntax for bound parameters
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?`
    #[default]
    Positional,
    /// `@name`
    Named,
}

impl CompilerConfig {
    pub fn parse(options: Value) -> Result<Self> {
        from_value::<Self>(options).context("Failed to parse compiler configuration options")
    }

    /// Parses the yaml, expanding `${env:NAME}` references in strings
    pub fn from_yaml(conf_str: &str) -> Result<Self> {
        Self::parse(interpolate_env(parse_config(conf_str)?)?)
    }

    /// Gets the configured server version
    pub fn server_version(&self) -> Result<ServerVersion> {
        match &self.server_version {
            Some(version) => ServerVersion::parse(version)
                .context("Failed to parse 'server_version' configuration option"),
            None => Ok(ServerVersion::LATEST),
        }
    }
}

/// Accepts a version string or a whole major version.
/// Unquoted versions such as 3.10 are yaml floats that lose digits, they must be quoted.
fn version_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) if n.is_u64() => Some(n.to_string()),
        Some(Value::Number(n)) => {
            return Err(serde::de::Error::custom(format!(
                "server version {} must be quoted, eg \"{}\"",
                n, n
            )))
        }
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a version string, found {:?}",
                other
            )))
        }
    })
}
