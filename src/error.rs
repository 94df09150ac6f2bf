//! Error types for loading scene descriptions.
//!
//! The simulation itself never fails; invalid parameters are clamped.

use std::fmt;

/// Errors that can occur while loading or validating a scene.
#[derive(Debug)]
pub enum SceneError {
    /// Failed to read the scene file.
    Io(std::io::Error),
    /// The scene file is not valid JSON for a scene.
    Json(serde_json::Error),
    /// The scene parsed but describes something that cannot run.
    Invalid(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "Failed to read scene file: {}", e),
            SceneError::Json(e) => write!(f, "Failed to parse scene: {}", e),
            SceneError::Invalid(msg) => write!(f, "Invalid scene: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io(e) => Some(e),
            SceneError::Json(e) => Some(e),
            SceneError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(e: serde_json::Error) -> Self {
        SceneError::Json(e)
    }
}
