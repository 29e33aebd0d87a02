//! Error types for configuration loading.

use std::path::PathBuf;
use stompbox_core::CurveError;
use thiserror::Error;

/// Errors that can occur while loading or applying a device configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Unknown effect type
    #[error("unknown effect type: {0}")]
    UnknownEffect(String),

    /// Parameter name not found on the effect
    #[error("unknown parameter '{param}' for effect '{effect}'")]
    UnknownParameter {
        /// Effect type.
        effect: String,
        /// Parameter name as written.
        param: String,
    },

    /// Curve name not recognized
    #[error("unknown curve '{curve}' for parameter '{param}'")]
    UnknownCurve {
        /// Parameter name.
        param: String,
        /// Curve name as written.
        curve: String,
    },

    /// Custom taper with an illegal midpoint
    #[error("invalid taper for parameter '{param}': {source}")]
    InvalidTaper {
        /// Parameter name.
        param: String,
        /// Why the midpoint was rejected.
        #[source]
        source: CurveError,
    },

    /// Control timing that cannot run
    #[error("invalid control timing: {0}")]
    InvalidTiming(String),

    /// Pedal wiring that refers to controls the layout does not have
    #[error("invalid control wiring: {0}")]
    InvalidWiring(String),

    /// Nested effects on something other than a compound
    #[error("effect '{0}' cannot contain other effects")]
    UnexpectedChildren(String),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn read_file_display_and_source() {
        let err = ConfigError::read_file("/a/b.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/a/b.toml"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_taper_keeps_curve_error() {
        let err = ConfigError::InvalidTaper {
            param: "Level".into(),
            source: CurveError::LinearMidpoint,
        };
        assert!(err.to_string().contains("Level"));
        assert!(err.source().is_some());
    }

    #[test]
    fn unknown_parameter_display() {
        let err = ConfigError::UnknownParameter {
            effect: "delay".into(),
            param: "Drive".into(),
        };
        assert_eq!(err.to_string(), "unknown parameter 'Drive' for effect 'delay'");
    }
}
