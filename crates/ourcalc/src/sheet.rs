//! An in-memory grid of cells

use ahash::AHashMap;
use ourcalc_core::{
    check_bounds, make_cell, CellRef, CellSource, CellValue, ColumnView, ConcreteValue, Error,
    Payload, Result, SharedCell, TypeInference, TypeRegistry,
};
use std::rc::Rc;

#[derive(Debug)]
struct Entry {
    slot: SharedCell,
    type_name: Option<String>,
}

/// A sparse grid of cell slots
///
/// Each occupied coordinate owns one slot. Writing to an occupied
/// coordinate replaces the slot's content in place, so references that
/// point at the slot see the new value.
///
/// # Example
///
/// ```rust
/// use ourcalc::prelude::*;
///
/// let mut sheet = Sheet::new();
/// sheet.set_input(0, 0, "5").unwrap();
/// sheet.copy_cell(cell_ref(0, 0), cell_ref(1, 0)).unwrap();
///
/// assert_eq!(sheet.get_value(1, 0).unwrap(), Some(ConcreteValue::Integer(5)));
/// ```
#[derive(Debug, Default)]
pub struct Sheet {
    cells: AHashMap<(u32, u32), Entry>,
    inference: TypeInference,
}

impl Sheet {
    /// Create an empty sheet with default type inference
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sheet with a custom inference engine
    pub fn with_inference(inference: TypeInference) -> Self {
        Self {
            cells: AHashMap::new(),
            inference,
        }
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is occupied
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Store typed-in text, inferring its value and recording the type name
    pub fn set_input(&mut self, column: u32, row: u32, text: &str) -> Result<()> {
        let value = self.inference.infer(text);
        log::debug!(
            "input {:?} at {} inferred as {}",
            text,
            CellRef::new(column, row),
            value.type_name()
        );
        self.set_value(column, row, value)
    }

    /// Store a concrete value, recording its type name
    pub fn set_value<V: Into<ConcreteValue>>(&mut self, column: u32, row: u32, value: V) -> Result<()> {
        let value = value.into();
        let type_name = value.type_name().to_string();
        let cell = make_cell(value, column, row, false, false)?;
        self.store(column, row, cell, Some(type_name))
    }

    /// Store a prepared cell
    ///
    /// A reference cell has no recorded type name of its own.
    pub fn set_cell(&mut self, column: u32, row: u32, cell: CellValue) -> Result<()> {
        let type_name = match cell.value() {
            Payload::Value(v) => Some(v.type_name().to_string()),
            Payload::Reference(_) => None,
        };
        self.store(column, row, cell, type_name)
    }

    /// The slot at a coordinate, if occupied
    pub fn slot(&self, column: u32, row: u32) -> Option<SharedCell> {
        self.cells.get(&(column, row)).map(|e| Rc::clone(&e.slot))
    }

    /// Copy the cell at `from` to `to`
    ///
    /// The source cell's pin flags decide the outcome: an unpinned cell is
    /// duplicated at the destination, a cell with any pinned axis is
    /// pasted as a reference to the source slot.
    pub fn copy_cell(&mut self, from: CellRef, to: CellRef) -> Result<()> {
        let source = self
            .slot(from.column, from.row)
            .ok_or_else(|| Error::InvalidAddress(format!("no cell at {}", from)))?;
        let (column_pinned, row_pinned) = {
            let cell = source
                .try_borrow()
                .map_err(|_| Error::BorrowConflict(format!("cell {}", from)))?;
            (cell.column_pinned(), cell.row_pinned())
        };
        let type_name = self
            .cells
            .get(&(from.column, from.row))
            .and_then(|e| e.type_name.clone());

        let cell = make_cell(&source, to.column, to.row, column_pinned, row_pinned)?;
        log::trace!(
            "copy {} -> {} ({})",
            from,
            to,
            if column_pinned || row_pinned {
                "reference"
            } else {
                "duplicate"
            }
        );
        self.store(to.column, to.row, cell, type_name)
    }

    /// The final value at a coordinate, or `None` for an empty slot
    pub fn get_value(&self, column: u32, row: u32) -> Result<Option<ConcreteValue>> {
        CellRef::new(column, row).value(self)
    }

    /// Clear a coordinate, returning the slot it held
    ///
    /// Cells that referenced the slot keep it alive and keep resolving to
    /// its last content.
    pub fn remove(&mut self, column: u32, row: u32) -> Option<SharedCell> {
        self.cells.remove(&(column, row)).map(|e| e.slot)
    }

    /// Typed access to one column
    pub fn column<'a>(&'a self, registry: &'a TypeRegistry, column: u32) -> ColumnView<'a, Self> {
        ColumnView::new(self, registry, column)
    }

    fn store(
        &mut self,
        column: u32,
        row: u32,
        cell: CellValue,
        type_name: Option<String>,
    ) -> Result<()> {
        check_bounds(column, row)?;
        match self.cells.get_mut(&(column, row)) {
            Some(entry) => {
                *entry.slot.try_borrow_mut().map_err(|_| {
                    Error::BorrowConflict(format!("cell {}", CellRef::new(column, row)))
                })? = cell;
                entry.type_name = type_name;
            }
            None => {
                self.cells.insert(
                    (column, row),
                    Entry {
                        slot: cell.into_shared(),
                        type_name,
                    },
                );
            }
        }
        Ok(())
    }
}

impl CellSource for Sheet {
    fn cell_value(&self, column: u32, row: u32) -> Option<SharedCell> {
        self.slot(column, row)
    }

    fn cell_type(&self, column: u32, row: u32) -> Option<String> {
        self.cells
            .get(&(column, row))
            .and_then(|e| e.type_name.clone())
    }
}
