//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`KinemaError`] covers:
//! - State graph authoring mistakes (duplicate or unknown names)
//! - Skeleton construction errors
//! - Parsing of the persisted clip / controller text formats
//! - Asset I/O and background loading failures
//!
//! Per-frame animation updates never return errors: a missing clip or a
//! vanished state degrades to the bind pose and is logged instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kinema_core::errors::{KinemaError, Result};
//!
//! fn add_idle(graph: &mut AnimationController) -> Result<()> {
//!     graph.add_state("Idle")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Kinema engine.
#[derive(Error, Debug)]
pub enum KinemaError {
    // ========================================================================
    // State Graph Errors
    // ========================================================================
    /// A state with this name already exists in the graph.
    #[error("Duplicate state name: {0}")]
    DuplicateState(String),

    /// No state with this name (or key) exists in the graph.
    #[error("Unknown state: {0}")]
    UnknownState(String),

    /// A parameter with this name is already declared.
    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),

    /// No parameter with this name is declared.
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// The link key no longer refers to a link of the graph.
    #[error("Unknown link")]
    UnknownLink,

    /// Index out of bounds in an ordered graph collection.
    #[error("Index out of bounds: {context} (index: {index})")]
    IndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// Bone index out of range.
    #[error("Invalid bone: {context} (index: {index})")]
    InvalidBone {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    /// A second parentless bone was added to a skeleton that already has a root.
    #[error("Skeleton '{0}' already has a root bone")]
    DuplicateRoot(String),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// Malformed line in a clip or controller file.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        message: String,
    },

    /// JSON parsing error (settings files).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// An asset was read but could not be turned into engine data.
    #[error("Failed to load asset '{path}': {reason}")]
    AssetLoadFailed {
        /// Path of the asset
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Background load task failed to complete.
    #[error("Task join error: {0}")]
    TaskJoinError(String),
}

impl KinemaError {
    /// Shorthand for a [`KinemaError::Parse`] at `line`.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        KinemaError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Alias for `Result<T, KinemaError>`.
pub type Result<T> = std::result::Result<T, KinemaError>;
