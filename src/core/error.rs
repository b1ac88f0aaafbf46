//! Core error types for lattice invariant computations

use thiserror::Error;

/// Error types for Gram matrix validation and discriminant group computations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LatticeError {
    /// The input matrix has no entries
    #[error("Matrix cannot be empty")]
    EmptyMatrix,

    /// A flat input whose length is not a perfect square
    #[error("Flat input of length {len} is not a square matrix")]
    NotSquare { len: usize },

    /// Invalid matrix or vector dimensions
    #[error("Invalid dimensions: expected {expected:?}, found {found:?}")]
    InvalidDimensions {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The Gram matrix is not symmetric
    #[error("Gram matrix is not symmetric: entry ({row}, {col}) differs from ({col}, {row})")]
    NotSymmetric { row: usize, col: usize },

    /// The Gram matrix has determinant zero
    #[error("Degenerate lattice: the Gram matrix has determinant 0")]
    DegenerateLattice,

    /// An intermediate integer left the i64 range
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// No multiplier up to the modulus annihilates a candidate element
    #[error("No order found for {coordinates:?} modulo {modulus}")]
    OrderNotFound { coordinates: Vec<i64>, modulus: i64 },

    /// A computed invariant contradicts what the discriminant predicts
    #[error("Internal consistency violated: {0}")]
    InternalConsistency(String),

    /// A brute-force search would exceed its configured limit
    #[error("Search space for {operation} has {size} points, limit is {limit}")]
    SearchSpaceTooLarge {
        operation: &'static str,
        size: u128,
        limit: u128,
    },

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Matrix text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reading or writing a Gram matrix file failed
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<serde_json::Error> for LatticeError {
    fn from(e: serde_json::Error) -> Self {
        LatticeError::parse(format!("JSON: {}", e))
    }
}

/// Result type for lattice operations
pub type Result<T> = std::result::Result<T, LatticeError>;

impl LatticeError {
    /// Create an invalid dimensions error
    pub fn invalid_dimensions(expected: (usize, usize), found: (usize, usize)) -> Self {
        LatticeError::InvalidDimensions { expected, found }
    }

    /// Create an overflow error naming the computation that overflowed
    pub fn overflow(context: impl Into<String>) -> Self {
        LatticeError::ArithmeticOverflow(context.into())
    }

    /// Create an internal consistency error
    pub fn internal(msg: impl Into<String>) -> Self {
        LatticeError::InternalConsistency(msg.into())
    }

    /// Create an invalid parameters error
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        LatticeError::InvalidParameters(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        LatticeError::IoError(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        LatticeError::Parse(msg.into())
    }

    /// Create a search space error
    pub fn search_space(operation: &'static str, size: u128, limit: u128) -> Self {
        LatticeError::SearchSpaceTooLarge {
            operation,
            size,
            limit,
        }
    }
}
