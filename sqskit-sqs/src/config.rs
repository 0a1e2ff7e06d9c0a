//! Client configuration

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default endpoint template, `%s` is replaced by the region
pub const DEFAULT_ENDPOINT: &str = "sqs.%s.amazonaws.com";

/// AWS region the endpoint is built for
///
/// Known regions have constants; any other name is accepted as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(Cow<'static, str>);

impl Region {
    pub const US_EAST_1: Region = Region(Cow::Borrowed("us-east-1"));
    pub const US_WEST_1: Region = Region(Cow::Borrowed("us-west-1"));
    pub const US_WEST_2: Region = Region(Cow::Borrowed("us-west-2"));
    pub const EU_WEST_1: Region = Region(Cow::Borrowed("eu-west-1"));
    pub const AP_SOUTHEAST_1: Region = Region(Cow::Borrowed("ap-southeast-1"));
    pub const AP_NORTHEAST_1: Region = Region(Cow::Borrowed("ap-northeast-1"));
    pub const SA_EAST_1: Region = Region(Cow::Borrowed("sa-east-1"));

    pub const KNOWN: [Region; 7] = [
        Self::US_EAST_1,
        Self::US_WEST_1,
        Self::US_WEST_2,
        Self::EU_WEST_1,
        Self::AP_SOUTHEAST_1,
        Self::AP_NORTHEAST_1,
        Self::SA_EAST_1,
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(self)
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::US_EAST_1
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("region must not be empty".to_string());
        }
        Ok(Self::new(s.to_lowercase()))
    }
}

/// Endpoint template combined with a region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub template: String,
    pub region: Region,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            template: DEFAULT_ENDPOINT.to_string(),
            region: Region::default(),
        }
    }
}

impl Endpoint {
    pub fn new(template: impl Into<String>, region: Region) -> Self {
        Self {
            template: template.into(),
            region,
        }
    }

    /// Base HTTPS URL of the service
    pub fn url(&self) -> String {
        format!("https://{}", self.template.replace("%s", self.region.as_str()))
    }
}

/// Main configuration structure
#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    #[serde(default)]
    pub region: Region,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: Region::default(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Load configuration from an optional `sqskit.*` file and `SQSKIT_*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("sqskit").required(false))
            .add_source(config::Environment::with_prefix("SQSKIT"))
            .build()?;

        config.try_deserialize::<Config>()
    }

    /// Credentials must be present before any call can be signed
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.access_key.is_empty() {
            return Err(config::ConfigError::NotFound("access_key".to_string()));
        }
        if self.secret_key.is_empty() {
            return Err(config::ConfigError::NotFound("secret_key".to_string()));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.endpoint.clone(), self.region.clone())
    }

    pub fn url(&self) -> String {
        self.endpoint().url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let endpoint = Endpoint::new("sqs.%s.local", Region::new("region"));
        assert_eq!(endpoint.url(), "https://sqs.region.local");
    }

    #[test]
    fn test_default_endpoint() {
        assert_eq!(Endpoint::default().url(), "https://sqs.us-east-1.amazonaws.com");
        let endpoint = Endpoint::new(DEFAULT_ENDPOINT, Region::AP_SOUTHEAST_1);
        assert_eq!(endpoint.url(), "https://sqs.ap-southeast-1.amazonaws.com");
    }

    #[test]
    fn test_region_parse() {
        let region: Region = "EU-WEST-1".parse().unwrap();
        assert_eq!(region, Region::EU_WEST_1);
        assert!(region.is_known());
        assert!(!Region::new("mars-north-1").is_known());
        assert!("  ".parse::<Region>().is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::new("AKID", "secret");
        assert_eq!(config.region, Region::US_EAST_1);
        assert_eq!(config.url(), "https://sqs.us-east-1.amazonaws.com");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_requires_credentials() {
        assert!(Config::new("", "secret").validate().is_err());
        assert!(Config::new("AKID", "").validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", Config::new("AKID", "topsecret"));
        assert!(!rendered.contains("topsecret"));
    }
}
