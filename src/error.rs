//! Error types for the melon_score library

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for melon_score operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Pipeline-level failures surfaced to the caller
///
/// Individual heuristics never produce these; they degrade to a default
/// score instead (see [`DetectionError`]).
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Pixel buffer does not describe a usable image
    #[error("Invalid image: {reason}")]
    InvalidImage {
        /// What was wrong with the buffer
        reason: String,
    },

    /// Encoded image could not be decoded
    #[error("Failed to decode image: {message}")]
    Decode {
        /// Where the bytes came from or what was expected
        message: String,
        /// Underlying decoder error
        #[source]
        source: image::ImageError,
    },

    /// Image or configuration file could not be read
    #[error("Failed to read {}", path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration is malformed or inconsistent
    #[error("Invalid configuration: {message}")]
    Config {
        /// Which setting is invalid
        message: String,
    },

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Create a decode error with context
    pub fn decode(message: impl Into<String>, source: image::ImageError) -> Self {
        Self::Decode {
            message: message.into(),
            source,
        }
    }

    /// Create an IO error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Message suitable for showing to the person who took the photo
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::InvalidImage { .. } | AnalysisError::Decode { .. } => {
                "Could not read the photo. Please take another picture and try again.".to_string()
            }
            _ => "Analysis failed. Please try again.".to_string(),
        }
    }
}

/// Reasons a single heuristic could not produce a measured score
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// Too few usable pixels were sampled
    #[error("Insufficient pixel data for analysis ({found} samples, need {required})")]
    InsufficientSamples {
        /// Samples actually collected
        found: usize,
        /// Minimum samples needed
        required: usize,
    },

    /// Search rectangle is empty or outside the image
    #[error("Invalid search region")]
    InvalidRegion,

    /// Bounding box has no extent on at least one axis
    #[error("Could not detect watermelon shape")]
    DegenerateContour,
}
