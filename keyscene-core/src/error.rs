//! Error types for the core crate

use thiserror::Error;

/// Algebra errors (vectors and matrices)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgebraError {
    /// Runtime-sized input does not match the target dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Normalization of a vector whose magnitude is below tolerance
    #[error("Cannot normalize the zero vector")]
    ZeroVector,

    /// Inversion of a matrix whose determinant is effectively zero
    #[error("Matrix is singular and cannot be inverted")]
    Singular,
}

/// Result type for algebra operations
pub type AlgebraResult<T> = Result<T, AlgebraError>;

/// Scene graph errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// Handle refers to a removed or unknown node
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Node is not a direct child of the given parent
    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: String, child: String },

    /// Reparenting would make a node its own ancestor
    #[error("Cannot add {child} under {parent}: cycle detected")]
    CycleDetected { parent: String, child: String },

    /// Serialized node carries a type tag that cannot be imported
    #[error("Unsupported node type: {0}")]
    UnsupportedNodeType(String),

    /// Operation not permitted on the graph root
    #[error("Operation not permitted on the scene root")]
    RootNode,

    /// Serialized camera node without projection settings
    #[error("Camera node {0} has no projection settings")]
    MissingCamera(String),

    /// Camera operation on a non-camera node
    #[error("Node is not a camera: {0}")]
    NotACamera(String),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Animation errors
#[derive(Debug, Error)]
pub enum AnimationError {
    /// Easing name not recognized
    #[error("Unknown easing function: {0}")]
    UnknownEasing(String),

    /// Frame editing requires a current frame
    #[error("No current frame to edit")]
    NoFrame,

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for animation operations
pub type AnimationResult<T> = Result<T, AnimationError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the expected shape
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A named setting holds a value that is not understood
    #[error("Invalid setting {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Studio-level errors
#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Animation(#[from] AnimationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No model with this name in the library
    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

/// Result type for studio operations
pub type StudioResult<T> = Result<T, StudioError>;
