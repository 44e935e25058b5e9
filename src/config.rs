//! Feed configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! NYC subway setup against the public MTA alerts endpoint.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::LineId;

const DEFAULT_ENDPOINT: &str =
    "https://collector-otp-prod.camsys-apps.com/realtime/gtfsrt/ALL/alerts?type=json";

const SUBWAY_LINES: [&str; 26] = [
    "1", "2", "3", "4", "5", "6", "7", "A", "B", "C", "D", "E", "F", "G", "J", "L", "M", "N",
    "Q", "R", "S", "W", "Z", "SI", "SF", "SR",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Alerts endpoint returning GTFS-realtime JSON
    pub endpoint: String,
    /// Sent as the `apikey` query parameter when set
    pub api_key: Option<String>,
    /// Informed entities for any other agency are ignored
    pub agency_id: String,
    /// IANA zone the refresh timestamp is reported in
    pub timezone: String,
    pub lines: BTreeSet<LineId>,
    pub timeout_secs: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            agency_id: "MTASBWY".to_string(),
            timezone: "US/Eastern".to_string(),
            lines: SUBWAY_LINES.iter().map(|l| l.to_string()).collect(),
            timeout_secs: None,
        }
    }
}

impl FeedConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tz()?;
        if self.lines.is_empty() {
            return Err(ConfigError::EmptyLines);
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_subway() {
        let config = FeedConfig::default();
        assert_eq!(config.lines.len(), 26);
        assert!(config.lines.contains("SI"));
        assert_eq!(config.agency_id, "MTASBWY");
        assert_eq!(config.tz().unwrap(), chrono_tz::US::Eastern);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: FeedConfig = toml::from_str(
            r#"
agency_id = "MTA NYCT"
lines = ["N", "Q"]
timeout_secs = 5
"#,
        )
        .unwrap();

        assert_eq!(config.agency_id, "MTA NYCT");
        assert_eq!(config.lines.len(), 2);
        assert_eq!(config.timezone, "US/Eastern");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_timezone() {
        let config = FeedConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownTimezone(tz)) if tz == "Mars/Olympus"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_lines() {
        let config = FeedConfig {
            lines: BTreeSet::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyLines)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config: FeedConfig = toml::from_str("timeout_secs = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));

        let config = FeedConfig {
            timeout_secs: Some(1),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
