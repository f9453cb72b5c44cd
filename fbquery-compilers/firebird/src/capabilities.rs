use std::fmt;

use fbquery_core::{
    err::{CompileError, Result},
    version::ServerVersion,
};
use fbquery_logging::debug;
use serde::Serialize;

/// Dialect features which depend on the server version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// `SELECT CASE WHEN EXISTS (...) THEN TRUE ELSE FALSE END FROM RDB$DATABASE`
    TopLevelAny,
    /// The BOOLEAN data type and boolean expressions as values
    BooleanType,
    /// `CHAR_TO_UUID(...)`
    CharToUuid,
    /// `EXTRACT(MILLISECOND FROM ...)`
    MillisecondExtract,
    /// `AT TIME ZONE`
    TimeZones,
}

impl Feature {
    /// The first server version supporting the feature
    pub fn min_version(&self) -> ServerVersion {
        match self {
            Feature::TopLevelAny | Feature::BooleanType => ServerVersion::new(3, 0, 0, 0),
            Feature::CharToUuid => ServerVersion::new(2, 5, 0, 0),
            Feature::MillisecondExtract => ServerVersion::new(2, 1, 0, 0),
            Feature::TimeZones => ServerVersion::new(4, 0, 0, 0),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::TopLevelAny => "top-level Any",
            Feature::BooleanType => "BOOLEAN data type",
            Feature::CharToUuid => "CHAR_TO_UUID",
            Feature::MillisecondExtract => "EXTRACT(MILLISECOND)",
            Feature::TimeZones => "AT TIME ZONE",
        };

        write!(f, "{}", name)
    }
}

/// The SQL features available on a server, derived once per connection from its version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialectCapabilities {
    pub server_version: ServerVersion,
    pub supports_top_level_any: bool,
    pub supports_boolean_type: bool,
    pub substring_is_one_based: bool,
    pub supports_char_to_uuid: bool,
    pub supports_millisecond_extract: bool,
    pub supports_time_zones: bool,
    /// Maximum length of an identifier in characters
    pub max_identifier_length: usize,
}

/// Derives the capabilities of a server from its version
pub fn capabilities_for(version: ServerVersion) -> DialectCapabilities {
    let caps = DialectCapabilities {
        server_version: version,
        supports_top_level_any: version >= Feature::TopLevelAny.min_version(),
        supports_boolean_type: version >= Feature::BooleanType.min_version(),
        substring_is_one_based: true,
        supports_char_to_uuid: version >= Feature::CharToUuid.min_version(),
        supports_millisecond_extract: version >= Feature::MillisecondExtract.min_version(),
        supports_time_zones: version >= Feature::TimeZones.min_version(),
        max_identifier_length: if version >= ServerVersion::new(4, 0, 0, 0) {
            63
        } else {
            31
        },
    };

    debug!("Derived dialect capabilities for Firebird {}: {:?}", version, caps);
    caps
}

impl DialectCapabilities {
    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::TopLevelAny => self.supports_top_level_any,
            Feature::BooleanType => self.supports_boolean_type,
            Feature::CharToUuid => self.supports_char_to_uuid,
            Feature::MillisecondExtract => self.supports_millisecond_extract,
            Feature::TimeZones => self.supports_time_zones,
        }
    }

    /// Fails with [`CompileError::UnsupportedFeature`] if the feature is not available
    pub fn require(&self, feature: Feature) -> Result<()> {
        if self.supports(feature) {
            return Ok(());
        }

        Err(CompileError::unsupported_feature(format!(
            "{} requires Firebird {} or later, the server version is {}",
            feature,
            feature.min_version(),
            self.server_version
        ))
        .into())
    }
}

impl Default for DialectCapabilities {
    fn default() -> Self {
        capabilities_for(ServerVersion::LATEST)
    }
}
