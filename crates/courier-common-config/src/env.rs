//! Environment variable handling.

use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("required environment variable not set: {var}")]
    NotSet { var: String },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    pub const COURIER_CONFIG_PATH: &str = "COURIER_CONFIG_PATH";
}

/// Environment access.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env`, then `.env.local`.
    ///
    /// Missing files are skipped. Variables already set in the process win.
    pub fn init() -> Result<Self, EnvError> {
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        Ok(Self { _guard: () })
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet {
            var: var.to_string(),
        })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a variable with a default value.
    pub fn get_or(var: &str, default: &str) -> String {
        env::var(var).unwrap_or_else(|_| default.to_string())
    }

    /// Get a boolean variable (`true`, `1`, `yes`).
    pub fn get_bool(var: &str) -> Option<bool> {
        env::var(var)
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// Get a numeric variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match env::var(var) {
            Ok(v) => v.parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: "expected integer".to_string(),
            }),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_default() {
        let val = Environment::get_or("COURIER_TEST_NONEXISTENT_12345", "default");
        assert_eq!(val, "default");
    }

    #[test]
    fn test_require_missing() {
        let result = Environment::require("COURIER_TEST_REQUIRED_MISSING");
        assert!(matches!(result, Err(EnvError::NotSet { .. })));
    }

    #[test]
    fn test_bool_parsing() {
        env::set_var("COURIER_TEST_BOOL", "true");
        assert_eq!(Environment::get_bool("COURIER_TEST_BOOL"), Some(true));
        env::set_var("COURIER_TEST_BOOL", "yes");
        assert_eq!(Environment::get_bool("COURIER_TEST_BOOL"), Some(true));
        env::set_var("COURIER_TEST_BOOL", "off");
        assert_eq!(Environment::get_bool("COURIER_TEST_BOOL"), Some(false));
        env::remove_var("COURIER_TEST_BOOL");
        assert_eq!(Environment::get_bool("COURIER_TEST_BOOL"), None);
    }

    #[test]
    fn test_integer_parsing() {
        env::set_var("COURIER_TEST_INT", "42");
        let val: Result<Option<u64>, _> = Environment::get_int("COURIER_TEST_INT");
        assert_eq!(val.unwrap(), Some(42));

        env::set_var("COURIER_TEST_INT", "forty-two");
        let val: Result<Option<u64>, _> = Environment::get_int("COURIER_TEST_INT");
        assert!(val.is_err());

        env::remove_var("COURIER_TEST_INT");
        let val: Result<Option<u64>, _> = Environment::get_int("COURIER_TEST_INT");
        assert_eq!(val.unwrap(), None);
    }

    #[test]
    fn test_environment_init_without_files() {
        assert!(Environment::init().is_ok());
    }
}
