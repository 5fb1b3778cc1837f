//! Cell-related types and utilities
//!
//! This module contains:
//! - [`column_name`] / [`column_index`] - bijective base-26 column letters
//! - [`CellAddress`] - a cell's location (e.g., "A1", "$B$2")
//! - [`CellValue`] - the content of one grid slot, value or reference

mod address;
mod value;

pub use address::{check_bounds, column_index, column_name, CellAddress};
pub use value::{
    is_reference, make_cell, update_slot, CellInput, CellValue, Operand, Payload, SharedCell,
    UnanchoredCell,
};
