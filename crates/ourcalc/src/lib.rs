//! # ourcalc
//!
//! Spreadsheet cell values: references between cells, relocation on copy,
//! operator dispatch through reference chains, and type inference for
//! typed-in text.
//!
//! ## Features
//!
//! - Cells that hold a value or point at another cell, followed to any depth
//! - Cycle detection while resolving reference chains
//! - Copy semantics driven by `$`-pinned axes
//! - Arithmetic, comparison and container access straight on cells
//! - Inference of booleans, numbers, complex numbers, containers and dates
//! - Typed column access through a registry of type names
//!
//! ## Example
//!
//! ```rust
//! use ourcalc::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! sheet.set_input(0, 0, "5").unwrap();
//! sheet.set_input(1, 0, "3").unwrap();
//!
//! let x = sheet.slot(0, 0).unwrap();
//! let y = sheet.slot(1, 0).unwrap();
//! let sum = (&*x.borrow() + &y).unwrap();
//! assert_eq!(sum, ConcreteValue::Integer(8));
//! ```

pub mod prelude;
pub mod sheet;

pub use sheet::Sheet;

// Re-export core types
pub use ourcalc_core::{
    // Address codec
    check_bounds,
    column_index,
    column_name,
    // Cells
    is_reference,
    make_cell,
    update_slot,
    CellAddress,
    CellInput,
    CellValue,
    Operand,
    Payload,
    SharedCell,
    UnanchoredCell,

    // Values
    BinaryOp,
    ConcreteValue,
    Method,
    UnaryOp,

    // Inference
    current_date,
    current_datetime,
    infer,
    ChronoDateParser,
    Conversion,
    DateParser,
    InferenceSettings,
    TypeInference,

    // References
    cell_ref,
    range,
    CellRef,
    CellSource,
    Coercion,
    ColumnView,
    Range,
    TypeRegistry,

    // Error types
    Error,
    Result,

    // Constants
    MAX_COLS,
    MAX_ROWS,
};
