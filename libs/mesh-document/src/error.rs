//! # Mesh Document Errors
//!
//! Error types for document construction and mutation.

use crate::element::{EdgeId, FaceId, VertId};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type MeshDocResult<T> = Result<T, MeshDocError>;

/// Errors raised by document construction and the mutation engine.
#[derive(Debug, Error, PartialEq)]
pub enum MeshDocError {
    /// Snapshot indices or shape are malformed.
    #[error("Invalid snapshot: {message}")]
    InvalidSnapshot { message: String },

    /// World transform cannot be inverted.
    #[error("Singular world matrix")]
    SingularTransform,

    /// Handle refers to a deleted or never-created vertex.
    #[error("Invalid vertex handle: {0}")]
    InvalidVert(VertId),

    /// Handle refers to a deleted or never-created edge.
    #[error("Invalid edge handle: {0}")]
    InvalidEdge(EdgeId),

    /// Handle refers to a deleted or never-created face.
    #[error("Invalid face handle: {0}")]
    InvalidFace(FaceId),

    /// Edge endpoints must differ.
    #[error("Degenerate edge: both endpoints are {0}")]
    DegenerateEdge(VertId),

    /// Face loop is too short or repeats a vertex.
    #[error("Invalid face loop: {message}")]
    InvalidLoop { message: String },

    /// A face over the same vertex loop already exists.
    #[error("Face already exists: {0}")]
    FaceExists(FaceId),
}

impl MeshDocError {
    /// Creates an invalid snapshot error.
    pub fn invalid_snapshot(message: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            message: message.into(),
        }
    }

    /// Creates an invalid face loop error.
    pub fn invalid_loop(message: impl Into<String>) -> Self {
        Self::InvalidLoop {
            message: message.into(),
        }
    }
}
