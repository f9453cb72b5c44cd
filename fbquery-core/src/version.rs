use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Error, Result};
use serde::{Deserialize, Serialize};

/// A Firebird server version, ordered lexicographically on its four fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// The most recent server version known to the compilers
    pub const LATEST: ServerVersion = ServerVersion::new(5, 0, 0, 0);

    /// Parses a version string.
    ///
    /// Accepts dotted versions with up to four fields ("3.0.7.33374", "3.0")
    /// as well as the server's version string ("WI-V3.0.7.33374 Firebird 3.0").
    pub fn parse(version: &str) -> Result<Self> {
        let version = version.trim();

        // Server strings are "<platform>-<type><version> <product> <product version>"
        let dotted = match version.split_once('-') {
            Some((platform, rest))
                if !platform.is_empty() && platform.chars().all(|c| c.is_ascii_alphabetic()) =>
            {
                let rest = rest.split_whitespace().next().unwrap_or_default();
                rest.trim_start_matches(|c: char| c.is_ascii_alphabetic())
            }
            _ => version,
        };

        if dotted.is_empty() {
            bail!("Failed to parse server version \"{}\": no version number found", version);
        }

        let mut fields = [0u32; 4];
        let parts = dotted.split('.').collect::<Vec<_>>();

        if parts.len() > fields.len() {
            bail!(
                "Failed to parse server version \"{}\": expected at most 4 fields",
                version
            );
        }

        for (field, part) in fields.iter_mut().zip(parts) {
            *field = part.parse().with_context(|| {
                format!(
                    "Failed to parse server version \"{}\": invalid field \"{}\"",
                    version, part
                )
            })?;
        }

        Ok(Self::new(fields[0], fields[1], fields[2], fields[3]))
    }
}

impl Default for ServerVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl FromStr for ServerVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_version_parse_full() {
        assert_eq!(
            ServerVersion::parse("3.0.7.33374").unwrap(),
            ServerVersion::new(3, 0, 7, 33374)
        );
    }

    #[test]
    fn test_server_version_parse_partial() {
        assert_eq!(
            ServerVersion::parse("3.0").unwrap(),
            ServerVersion::new(3, 0, 0, 0)
        );
        assert_eq!(
            ServerVersion::parse("4").unwrap(),
            ServerVersion::new(4, 0, 0, 0)
        );
    }

    #[test]
    fn test_server_version_parse_server_string() {
        assert_eq!(
            ServerVersion::parse("WI-V3.0.7.33374 Firebird 3.0").unwrap(),
            ServerVersion::new(3, 0, 7, 33374)
        );
        assert_eq!(
            ServerVersion::parse("LI-T6.0.0.123 Firebird 6.0 Initial").unwrap(),
            ServerVersion::new(6, 0, 0, 123)
        );
    }

    #[test]
    fn test_server_version_parse_invalid() {
        assert!(ServerVersion::parse("").is_err());
        assert!(ServerVersion::parse("abc").is_err());
        assert!(ServerVersion::parse("3.x").is_err());
        assert!(ServerVersion::parse("1.2.3.4.5").is_err());
        assert!(ServerVersion::parse("-3.0").is_err());
    }

    #[test]
    fn test_server_version_ordering() {
        assert!(ServerVersion::new(3, 0, 0, 0) > ServerVersion::new(2, 5, 9, 27139));
        assert!(ServerVersion::new(2, 5, 0, 0) < ServerVersion::new(2, 5, 0, 1));
        assert!(ServerVersion::new(2, 10, 0, 0) > ServerVersion::new(2, 9, 0, 0));
        assert!(ServerVersion::new(4, 0, 0, 0) >= ServerVersion::new(4, 0, 0, 0));
    }

    #[test]
    fn test_server_version_display_and_from_str() {
        let version: ServerVersion = "2.5".parse().unwrap();

        assert_eq!(version.to_string(), "2.5.0.0");
    }
}
