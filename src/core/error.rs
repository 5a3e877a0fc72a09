//! Typed error handling for the adopt search core
//!
//! Callers get a small hierarchy they can match on instead of a generic
//! `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`FetchError`]: network, HTTP status or decoding failures against the catalog API
//! - [`LocationError`]: failures while collapsing a location selection into ZIP codes
//! - [`ConfigError`]: configuration parsing and validation
//! - [`ValidationError`]: rejected user intents (inverted age range, malformed ZIP, ...)
//!
//! # Example
//!
//! ```rust,ignore
//! match session.set_age_range(Some(2), Some(8)).await {
//!     Ok(_) => {}
//!     Err(e) if e.is_transient() => tracing::warn!(error = %e, "search failed, keeping last results"),
//!     Err(AdoptError::Validation(v)) => eprintln!("bad input: {}", v),
//!     Err(e) => return Err(e),
//! }
//! ```

use serde::Serialize;
use std::fmt;

/// The main error type for the adopt crate
#[derive(Debug, Clone, PartialEq)]
pub enum AdoptError {
    /// Remote catalog request failed
    Fetch(FetchError),

    /// Location resolution failed as a whole
    Location(LocationError),

    /// Configuration errors
    Config(ConfigError),

    /// Rejected input
    Validation(ValidationError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for AdoptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdoptError::Fetch(e) => write!(f, "{}", e),
            AdoptError::Location(e) => write!(f, "{}", e),
            AdoptError::Config(e) => write!(f, "{}", e),
            AdoptError::Validation(e) => write!(f, "{}", e),
            AdoptError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AdoptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdoptError::Fetch(e) => Some(e),
            AdoptError::Location(e) => Some(e),
            AdoptError::Config(e) => Some(e),
            AdoptError::Validation(e) => Some(e),
            AdoptError::Internal(_) => None,
        }
    }
}

/// Serializable error summary handed to presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSummary {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Whether a user-triggered retry may succeed
    pub transient: bool,
}

impl AdoptError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AdoptError::Fetch(e) => e.error_code(),
            AdoptError::Location(e) => e.error_code(),
            AdoptError::Config(_) => "CONFIG_ERROR",
            AdoptError::Validation(_) => "VALIDATION_ERROR",
            AdoptError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure is a transient fetch failure
    ///
    /// Transient failures are recovered locally: the last committed results
    /// stay visible and an error flag is raised. There is no automatic retry.
    pub fn is_transient(&self) -> bool {
        match self {
            AdoptError::Fetch(e) => e.is_transient(),
            AdoptError::Location(LocationError::AllLookupsFailed { .. }) => true,
            _ => false,
        }
    }

    /// Convert to a summary suitable for display
    pub fn to_summary(&self) -> ErrorSummary {
        ErrorSummary {
            code: self.error_code().to_string(),
            message: self.to_string(),
            transient: self.is_transient(),
        }
    }
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors raised while talking to the catalog API
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, timeout or other transport failure
    Transport { endpoint: String, message: String },

    /// The server answered with a non-success status
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The response body did not match the expected shape
    Decode { endpoint: String, message: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport { endpoint, message } => {
                write!(f, "Request to {} failed: {}", endpoint, message)
            }
            FetchError::Status {
                endpoint,
                status,
                message,
            } => {
                write!(f, "{} returned status {}: {}", endpoint, status, message)
            }
            FetchError::Decode { endpoint, message } => {
                write!(f, "Failed to decode response from {}: {}", endpoint, message)
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "FETCH_TRANSPORT",
            FetchError::Status { .. } => "FETCH_STATUS",
            FetchError::Decode { .. } => "FETCH_DECODE",
        }
    }

    /// Network failures and 5xx answers
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Decode { .. } => false,
        }
    }

    /// Endpoint the failed request targeted
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Decode { endpoint, .. } => endpoint,
        }
    }
}

impl From<FetchError> for AdoptError {
    fn from(err: FetchError) -> Self {
        AdoptError::Fetch(err)
    }
}

// =============================================================================
// Location Errors
// =============================================================================

/// Errors related to location resolution
#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    /// A single state/city/county lookup failed
    LookupFailed {
        dimension: String,
        value: String,
        message: String,
    },

    /// Every lookup of a non-empty selection failed and no manual ZIP was given
    AllLookupsFailed { attempted: usize },
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::LookupFailed {
                dimension,
                value,
                message,
            } => {
                write!(f, "Location lookup for {} '{}' failed: {}", dimension, value, message)
            }
            LocationError::AllLookupsFailed { attempted } => {
                write!(f, "All {} location lookups failed", attempted)
            }
        }
    }
}

impl std::error::Error for LocationError {}

impl LocationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            LocationError::LookupFailed { .. } => "LOCATION_LOOKUP_FAILED",
            LocationError::AllLookupsFailed { .. } => "LOCATION_RESOLUTION_FAILED",
        }
    }
}

impl From<LocationError> for AdoptError {
    fn from(err: LocationError) -> Self {
        AdoptError::Location(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for AdoptError {
    fn from(err: ConfigError) -> Self {
        AdoptError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Rejected filter or navigation intents
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `age_min` greater than `age_max`
    InvalidAgeRange { min: u32, max: u32 },

    /// Manually entered ZIP code is not five digits
    InvalidZipCode { value: String },

    /// Sort token not of the form `field:direction`
    InvalidSort { value: String },

    /// Match requested without any candidate
    EmptyFavorites,

    /// Multiple field errors
    FieldErrors(Vec<FieldValidationError>),
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidAgeRange { min, max } => {
                write!(f, "Invalid age range: minimum {} exceeds maximum {}", min, max)
            }
            ValidationError::InvalidZipCode { value } => {
                write!(f, "Invalid ZIP code: '{}'", value)
            }
            ValidationError::InvalidSort { value } => {
                write!(f, "Invalid sort '{}': expected <name|breed|age>:<asc|desc>", value)
            }
            ValidationError::EmptyFavorites => {
                write!(f, "No favorites selected to match")
            }
            ValidationError::FieldErrors(errors) => {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation failed: {}", messages.join(", "))
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for AdoptError {
    fn from(err: ValidationError) -> Self {
        AdoptError::Validation(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for AdoptError {
    fn from(err: serde_yaml::Error) -> Self {
        AdoptError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<validator::ValidationErrors> for AdoptError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AdoptError::Validation(ValidationError::FieldErrors(fields))
    }
}

impl From<anyhow::Error> for AdoptError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AdoptError>() {
            Ok(adopt) => adopt,
            Err(other) => AdoptError::Internal(other.to_string()),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for adopt operations
pub type AdoptResult<T> = Result<T, AdoptError>;
