//! Error types for ourcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ourcalc-core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// A reference chain revisited a cell it had already passed through
    #[error("Circular reference detected involving cell {0}")]
    CyclicReference(String),

    /// A grid slot was mutably borrowed while being read
    #[error("Cannot read {0}: it is being modified")]
    BorrowConflict(String),

    /// The column accessor was handed a type name nobody registered
    #[error("Unknown type name: {0}")]
    UnknownTypeName(String),

    /// Binary operator applied to operand kinds that do not support it
    #[error("Unsupported operand types for {op}: {left} and {right}")]
    Operation {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    /// Unary operator applied to an operand kind that does not support it
    #[error("Bad operand type for unary {op}: {operand}")]
    UnaryOperation {
        op: &'static str,
        operand: &'static str,
    },

    /// Division or modulo by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Integer arithmetic overflowed
    #[error("Integer overflow in {0}")]
    Overflow(&'static str),

    /// Sequence index outside the valid range
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    /// Mapping lookup for a missing key
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Method name not available on the value's kind
    #[error("'{type_name}' has no method '{method}'")]
    UnknownMethod { method: String, type_name: &'static str },

    /// Invalid argument to a value method or conversion
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create an [`Error::InvalidArgument`] from a message
    pub fn argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
