//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when policy configuration parameters are
//!   invalid (e.g. zero capacity, out-of-range fractions).
//! - [`SelectionError`]: Returned when `choose_victim` cannot name a resident
//!   victim, the fatal contract violation of an inconsistent engine.
//! - [`InvariantError`]: Returned when internal metadata invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::error::ConfigError;
//! use evictkit::policy::w_tiny_lfu::{WTinyLfuConfig, WTinyLfuCore};
//!
//! // Fallible constructor for user-configurable parameters
//! let cfg = WTinyLfuConfig::new(100);
//! let engine: Result<WTinyLfuCore<String>, ConfigError> =
//!     WTinyLfuCore::try_with_config(cfg);
//! assert!(engine.is_ok());
//!
//! // Invalid fraction is caught without panicking
//! let mut bad = WTinyLfuConfig::new(100);
//! bad.protected_frac = 2.0;
//! assert!(WTinyLfuCore::<String>::try_with_config(bad).is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when policy configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`WTinyLfuCore::try_with_config`](crate::policy::w_tiny_lfu::WTinyLfuCore::try_with_config).
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// SelectionError
// ---------------------------------------------------------------------------

/// Error returned when victim selection cannot produce a resident key.
///
/// Returned by
/// [`WTinyLfuCore::choose_victim`](crate::policy::w_tiny_lfu::WTinyLfuCore::choose_victim)
/// after repair has been attempted. Selecting a victim that is not resident
/// would corrupt every subsequent access, so the operation aborts instead of
/// guessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionError(String);

impl SelectionError {
    /// Creates a new `SelectionError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SelectionError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal policy invariants are violated.
///
/// Produced by debug-only `check_invariants` methods on the engine. Carries
/// a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }

    // -- SelectionError ---------------------------------------------------

    #[test]
    fn selection_display_shows_message() {
        let err = SelectionError::new("no resident candidates");
        assert_eq!(err.to_string(), "no resident candidates");
    }

    #[test]
    fn selection_debug_includes_message() {
        let err = SelectionError::new("empty segments");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("empty segments"));
    }

    #[test]
    fn selection_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<SelectionError>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("segment overlap");
        assert_eq!(err.to_string(), "segment overlap");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }
}
