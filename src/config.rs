//! Configuration file management for the exporter.
//!
//! The configuration is a flat YAML document read once at startup. Every key
//! is optional; a missing or broken file is logged and treated as an empty
//! configuration so the exporter still starts with its defaults.
//!
//! The document is parsed as a whole: a single mistyped value such as
//! `port: 70000` discards every other setting too, including the regions,
//! the role and the tag filter. The error log names the offending key.
//!
//! # Configuration Precedence
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (`/config/prometheus-acm-exporter.yaml` or `--config`)
//! 3. The `PORT` environment variable, for the listening port only
//!
//! # Example Configuration File
//!
//! ```yaml
//! port: 9102
//! regions:
//!   - us-east-1
//!   - eu-west-1
//! aws-assume-role-arn: arn:aws:iam::123456789012:role/acm-exporter
//! aws-assume-role-session: prometheus-acm-exporter
//! selected-tags:
//!   - Environment
//!   - Team
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::ConfigError;
use crate::tags::TagFilter;

/// Path read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/config/prometheus-acm-exporter.yaml";

/// Port served when neither the file nor `PORT` sets one.
pub const DEFAULT_PORT: u16 = 9102;

/// Session name used for role assumption unless configured.
pub const DEFAULT_SESSION_NAME: &str = "prometheus-acm-exporter";

/// Main configuration structure for the exporter.
///
/// All fields are optional; accessors below apply the defaults.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Listening port for the HTTP endpoints
    pub port: Option<u16>,
    /// Single region, kept for older configuration files
    pub region: Option<String>,
    /// Regions to collect from; wins over `region`
    pub regions: Option<Vec<String>>,
    /// Role to assume before calling ACM
    pub aws_assume_role_arn: Option<String>,
    /// Session name for the assumed role
    pub aws_assume_role_session: Option<String>,
    /// Tag keys to export; unset or empty exports every non-empty tag
    pub selected_tags: Option<Vec<String>>,
}

impl Config {
    /// Loads configuration from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid YAML
    ///
    /// An empty file yields the default configuration.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Option<Config> =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config.unwrap_or_default())
    }

    /// Loads the configuration the way the exporter does at startup.
    ///
    /// Reads `path`, or [`DEFAULT_CONFIG_PATH`] when none is given. A missing
    /// file is a warning, an unreadable or malformed one an error; both fall
    /// back to the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Config::default();
        }

        match Config::from_file(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "error loading config file, ignoring all of its settings and using defaults"
                );
                Config::default()
            }
        }
    }

    /// Resolves the listening port.
    ///
    /// `env_port` is the raw value of the `PORT` environment variable. When
    /// set it wins over the file and must be a valid port number.
    pub fn resolve_port(&self, env_port: Option<&str>) -> Result<u16, ConfigError> {
        match env_port {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::Validation(format!(
                    "PORT environment variable must be an integer port, got {:?}: {}",
                    raw, e
                ))
            }),
            None => Ok(self.port.unwrap_or(DEFAULT_PORT)),
        }
    }

    /// Regions named by the configuration, in order.
    ///
    /// `regions` wins when it is non-empty, otherwise `region` is used. An
    /// empty result means the ambient region should be used.
    pub fn configured_regions(&self) -> Vec<String> {
        let regions: Vec<String> = self
            .regions
            .iter()
            .flatten()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if !regions.is_empty() {
            return regions;
        }

        self.region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| vec![r.to_string()])
            .unwrap_or_default()
    }

    /// The role to assume, if any. Blank values count as unset.
    pub fn role_arn(&self) -> Option<&str> {
        self.aws_assume_role_arn
            .as_deref()
            .map(str::trim)
            .filter(|arn| !arn.is_empty())
    }

    pub fn session_name(&self) -> &str {
        self.aws_assume_role_session
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SESSION_NAME)
    }

    pub fn tag_filter(&self) -> TagFilter {
        TagFilter::new(self.selected_tags.iter().flatten())
    }

    /// Generates an example configuration file in YAML format.
    ///
    /// Printed by `--print-example-config`.
    pub fn example_yaml() -> String {
        let example = Config {
            port: Some(DEFAULT_PORT),
            region: None,
            regions: Some(vec!["us-east-1".to_string(), "eu-west-1".to_string()]),
            aws_assume_role_arn: Some("arn:aws:iam::123456789012:role/acm-exporter".to_string()),
            aws_assume_role_session: Some(DEFAULT_SESSION_NAME.to_string()),
            selected_tags: Some(vec!["Environment".to_string(), "Team".to_string()]),
        };

        serde_yaml::to_string(&example)
            .unwrap_or_else(|_| "# Error generating example\n".to_string())
    }
}
