//! Configuration errors
//!
//! Everything that can go wrong happens while reading settings or a level.
//! Once a world is built, the simulation has no failure paths.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid level '{level}': {reason}")]
    Invalid { level: String, reason: String },

    #[error("no levels configured")]
    NoLevels,
}

impl LevelError {
    pub fn invalid(level: impl Into<String>, reason: impl Into<String>) -> Self {
        LevelError::Invalid {
            level: level.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LevelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = LevelError::invalid("moon", "fuel count must be positive");
        assert_eq!(err.to_string(), "invalid level 'moon': fuel count must be positive");

        let json = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: LevelError = json.into();
        assert!(err.to_string().starts_with("malformed JSON"));
    }
}
