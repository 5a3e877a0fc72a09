//! Configuration loading and management

use crate::core::error::{AdoptError, AdoptResult, ConfigError};
use crate::core::SortOrder;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Environment variable overriding [`SearchConfig::base_url`]
pub const ENV_API_URL: &str = "ADOPT_API_URL";

/// Environment variable overriding [`SearchConfig::page_size`]
pub const ENV_PAGE_SIZE: &str = "ADOPT_PAGE_SIZE";

/// Settings of a search session
///
/// # Example
/// ```yaml
/// base_url: https://frontend-take-home-service.fetch.com
/// page_size: 25
/// location_lookup_size: 10000
/// default_sort: breed:asc
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SearchConfig {
    /// Root URL of the catalog API
    #[validate(url)]
    pub base_url: String,

    /// Results per page, fixed for the session
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,

    /// Page size of each location lookup, large enough to mean "all"
    #[validate(range(min = 1, max = 10000))]
    pub location_lookup_size: u32,

    /// Sort applied before the user picks one
    pub default_sort: SortOrder,

    /// Buffer of the event bus
    #[validate(range(min = 1))]
    pub event_capacity: usize,

    /// Per-request timeout; unset means no timeout
    pub request_timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://frontend-take-home-service.fetch.com".to_string(),
            page_size: 25,
            location_lookup_size: 10_000,
            default_sort: SortOrder::default(),
            event_capacity: 1024,
            request_timeout_secs: None,
        }
    }
}

impl SearchConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AdoptError::Config(ConfigError::FileNotFound {
                path: path.display().to_string(),
            })
            .into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| {
                AdoptError::Config(ConfigError::IoError {
                    message: format!("{}: {}", path.display(), e),
                })
            })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            AdoptError::Config(ConfigError::ParseError {
                file: Some(path.display().to_string()),
                message: e.to_string(),
            })
        })?;
        config.validate_config()?;
        Ok(config)
    }

    /// Load and validate configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate_config()?;
        Ok(config)
    }

    /// Apply `ADOPT_API_URL` / `ADOPT_PAGE_SIZE` when set, then validate
    pub fn with_env_overrides(self) -> AdoptResult<Self> {
        self.with_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_PAGE_SIZE).ok(),
        )
    }

    fn with_overrides(
        mut self,
        base_url: Option<String>,
        page_size: Option<String>,
    ) -> AdoptResult<Self> {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(raw) = page_size {
            self.page_size = raw.trim().parse().map_err(|_| {
                AdoptError::Config(ConfigError::InvalidValue {
                    field: "page_size".to_string(),
                    value: raw.clone(),
                    message: "expected a positive integer".to_string(),
                })
            })?;
        }
        self.validate_config()?;
        Ok(self)
    }

    /// Check every field against its constraints
    pub fn validate_config(&self) -> AdoptResult<()> {
        self.validate()?;
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
