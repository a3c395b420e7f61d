// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use jiff::tz::TimeZone;

/// Default cap on expansion iterations.
pub const DEFAULT_EXPANSION_LIMIT: usize = 100_000;

/// Default host part of generated continuation uids.
pub const DEFAULT_UID_DOMAIN: &str = "itipcal.local";

/// Configuration for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// IANA zone floating values are resolved in; the system zone when unset.
    pub default_timezone: Option<String>,

    /// Maximum number of iterations one rule expansion may take.
    pub expansion_limit: usize,

    /// Host part of generated continuation uids.
    pub uid_domain: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timezone: None,
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
            uid_domain: DEFAULT_UID_DOMAIN.to_owned(),
        }
    }
}

impl Config {
    /// Configuration with a fixed default zone.
    #[must_use]
    pub fn with_time_zone(tzid: impl Into<String>) -> Self {
        Self {
            default_timezone: Some(tzid.into()),
            ..Self::default()
        }
    }

    /// Normalize the configuration.
    ///
    /// # Errors
    /// If a value is out of range or the zone is unknown.
    pub fn normalize(&mut self) -> Result<(), ConfigError> {
        if let Some(tzid) = &mut self.default_timezone {
            let trimmed = tzid.trim();
            if trimmed.is_empty() {
                self.default_timezone = None;
            } else {
                *tzid = trimmed.to_owned();
            }
        }
        self.time_zone()?;

        if self.expansion_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "expansion_limit",
                reason: "must be positive".to_owned(),
            });
        }

        let domain = self.uid_domain.trim();
        if domain.is_empty() || domain.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                key: "uid_domain",
                reason: format!("`{}` is not a host name", self.uid_domain),
            });
        }
        self.uid_domain = domain.to_owned();
        Ok(())
    }

    /// Resolve the default zone.
    ///
    /// # Errors
    /// If `default_timezone` names no zone in the bundled database.
    pub fn time_zone(&self) -> Result<TimeZone, ConfigError> {
        match &self.default_timezone {
            Some(tzid) => TimeZone::get(tzid).map_err(|source| ConfigError::UnknownTimeZone {
                tzid: tzid.clone(),
                source,
            }),
            None => Ok(TimeZone::system()),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    /// Parse and normalize TOML text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config: Self = toml::from_str(s)?;
        config.normalize()?;
        Ok(config)
    }
}

/// Errors from loading a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML text is malformed or has unexpected keys
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The default zone is not known
    #[error("unknown time zone `{tzid}`: {source}")]
    UnknownTimeZone {
        /// The configured zone id
        tzid: String,
        /// Lookup failure
        source: jiff::Error,
    },

    /// A value is out of range
    #[error("invalid `{key}`: {reason}")]
    Invalid {
        /// The offending key
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
}
