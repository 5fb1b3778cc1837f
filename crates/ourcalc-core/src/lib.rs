//! # ourcalc-core
//!
//! The cell-value core of the ourcalc spreadsheet engine.
//!
//! This crate provides:
//! - [`CellValue`] - one grid slot's content: a concrete value or a reference to another slot
//! - [`ConcreteValue`] - numbers, text, dates and containers, with operator dispatch
//! - [`infer`] - turns raw typed-in text into the most specific value it denotes
//! - [`column_name`] / [`column_index`] - bijective base-26 column letters
//! - [`CellRef`], [`Range`] and [`ColumnView`] - lazy references over a [`CellSource`]
//!
//! ## Example
//!
//! ```rust
//! use ourcalc_core::{infer, make_cell, ConcreteValue};
//!
//! let x = make_cell(infer("5"), 0, 0, false, false).unwrap().into_shared();
//! let y = make_cell(&x, 1, 0, true, true).unwrap();
//!
//! assert!(y.is_reference());
//! assert_eq!((&y + 3).unwrap(), ConcreteValue::Integer(8));
//! ```

pub mod cell;
pub mod error;
pub mod infer;
pub mod reference;
pub mod value;

// Re-exports for convenience
pub use cell::{
    check_bounds, column_index, column_name, is_reference, make_cell, update_slot, CellAddress,
    CellInput, CellValue, Operand, Payload, SharedCell, UnanchoredCell,
};
pub use error::{Error, Result};
pub use infer::{
    current_date, current_datetime, infer, ChronoDateParser, Conversion, DateParser,
    InferenceSettings, TypeInference,
};
pub use reference::{cell_ref, range, CellRef, CellSource, Coercion, ColumnView, Range, TypeRegistry};
pub use value::{BinaryOp, ConcreteValue, Method, UnaryOp};

/// Maximum number of rows in a grid
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a grid
pub const MAX_COLS: u32 = 16_384;
