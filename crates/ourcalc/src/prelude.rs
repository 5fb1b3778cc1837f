//! Prelude module - common imports for ourcalc users
//!
//! ```rust
//! use ourcalc::prelude::*;
//! ```

pub use crate::{
    // Cell types
    cell_ref,
    infer,
    make_cell,
    range,
    CellAddress,
    CellRef,
    CellSource,
    CellValue,
    ColumnView,
    ConcreteValue,
    Range,
    SharedCell,

    // Error types
    Error,
    Result,

    // Main types
    Sheet,
    TypeInference,
    TypeRegistry,
};
