#![forbid(unsafe_code)]

//! Error kinds surfaced by state cells and the cell binder.
//!
//! # Failure Modes
//!
//! | Error | Raised by | Effect on state |
//! |-------|-----------|-----------------|
//! | [`ValidationError`] | `ValueCell::set`, `ValueCell::update` | None: value, version and callback untouched |
//! | [`InstanceError`] | `bind`, `bind_with` | None: initial effect is not run |
//! | [`ConfigError`] | `CellConfig::from_env_with` | Config not produced |
//!
//! Nothing in this crate retries or swallows these errors; they are returned to
//! the direct caller.

use std::fmt;

/// A value of the wrong runtime type was offered to a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Runtime type of the value currently stored in the cell.
    pub expected: &'static str,
    /// Runtime type of the rejected value.
    pub received: &'static str,
}

impl ValidationError {
    /// Create a type-mismatch error.
    #[must_use]
    pub fn new(expected: &'static str, received: &'static str) -> Self {
        Self { expected, received }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected type of {} but received {}",
            self.expected, self.received
        )
    }
}

impl std::error::Error for ValidationError {}

/// An instance handed to the binder is not backed by a genuine `ValueCell`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceError {
    /// Debug rendering of the rejected instance.
    pub instance: String,
}

impl InstanceError {
    /// Create an error for the given instance rendering.
    #[must_use]
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not an instance of the State class.", self.instance)
    }
}

impl std::error::Error for InstanceError {}

/// Invalid configuration value read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Environment key that carried the value.
    pub key: &'static str,
    /// Raw value as read.
    pub value: String,
    /// What was expected instead.
    pub message: &'static str,
}

impl ConfigError {
    /// Create a config error.
    #[must_use]
    pub fn new(key: &'static str, value: impl Into<String>, message: &'static str) -> Self {
        Self {
            key,
            value: value.into(),
            message,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.key, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Any error this crate can return.
///
/// Lets callers use `?` across `set` and `bind` in one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Type mismatch on `set` / `update`.
    Validation(ValidationError),
    /// Non-genuine instance passed to the binder.
    Instance(InstanceError),
    /// Bad environment configuration.
    Config(ConfigError),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => err.fmt(f),
            Self::Instance(err) => err.fmt(f),
            Self::Config(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Instance(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ValidationError> for StateError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<InstanceError> for StateError {
    fn from(err: InstanceError) -> Self {
        Self::Instance(err)
    }
}

impl From<ConfigError> for StateError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
