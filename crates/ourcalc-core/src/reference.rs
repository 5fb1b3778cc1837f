//! Cell and range references, and typed column access
//!
//! A [`CellRef`] is a coordinate pair that looks the cell up through a
//! [`CellSource`] every time it is resolved. Two refs combine into a
//! [`Range`] for range-aware formula functions; enumerating the cells of a
//! range belongs to the grid, not here.
//!
//! [`ColumnView`] reads a column back through the type name the grid
//! recorded for each cell, rebuilding the value with the matching
//! constructor from a [`TypeRegistry`].

use crate::cell::{column_index, column_name, CellAddress, SharedCell};
use crate::error::{Error, Result};
use crate::infer::{self, literal};
use crate::value::ConcreteValue;
use std::collections::HashMap;
use std::fmt;

/// Grid lookups the core consumes
///
/// Implementations must not mutate the grid from inside these calls.
pub trait CellSource {
    /// The slot stored at a coordinate, if any
    fn cell_value(&self, column: u32, row: u32) -> Option<SharedCell>;

    /// The type name recorded for a coordinate, if any
    fn cell_type(&self, column: u32, row: u32) -> Option<String>;
}

/// A lazy handle to one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// Column index (0-based)
    pub column: u32,
    /// Row index (0-based)
    pub row: u32,
}

/// Create a [`CellRef`]
pub fn cell_ref(column: u32, row: u32) -> CellRef {
    CellRef::new(column, row)
}

impl CellRef {
    /// Create a new reference
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Parse an A1-style reference; `$` pins are accepted and dropped
    pub fn parse(s: &str) -> Result<Self> {
        let addr = CellAddress::parse(s)?;
        Ok(Self::new(addr.column, addr.row))
    }

    /// The referenced location as an address
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.column, self.row)
    }

    /// Look the cell up; nothing is cached between calls
    pub fn resolve<S: CellSource + ?Sized>(&self, source: &S) -> Option<SharedCell> {
        source.cell_value(self.column, self.row)
    }

    /// The final value of the referenced cell, or `None` for an empty slot
    pub fn value<S: CellSource + ?Sized>(&self, source: &S) -> Result<Option<ConcreteValue>> {
        let Some(slot) = self.resolve(source) else {
            return Ok(None);
        };
        let cell = slot
            .try_borrow()
            .map_err(|_| Error::BorrowConflict(format!("cell {}", self)))?;
        cell.final_value().map(Some)
    }

    /// Combine with another reference into a range
    pub fn to(self, end: CellRef) -> Range {
        Range::new(self, end)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}

/// A rectangular span between two cell references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// Conventionally the top-left corner
    pub start: CellRef,
    /// Conventionally the bottom-right corner
    pub end: CellRef,
}

/// Combine two references into a [`Range`]
pub fn range(start: CellRef, end: CellRef) -> Range {
    Range::new(start, end)
}

impl Range {
    /// Create a range; the endpoints are kept as given
    pub fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Rebuilds a value of a named type from a stored value
pub type Coercion = fn(&ConcreteValue) -> Result<ConcreteValue>;

/// Type name to constructor table, built once and passed where needed
#[derive(Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Coercion>,
}

impl TypeRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// A registry holding every built-in value kind
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("bool", to_bool);
        registry.register("int", to_int);
        registry.register("float", to_float);
        registry.register("complex", to_complex);
        registry.register("str", to_str);
        registry.register("date", to_date);
        registry.register("datetime", to_datetime);
        registry.register("list", to_list);
        registry.register("tuple", to_tuple);
        registry.register("set", to_set);
        registry.register("dict", to_dict);
        registry
    }

    /// Register (or replace) a constructor
    pub fn register<S: Into<String>>(&mut self, name: S, coercion: Coercion) {
        self.types.insert(name.into(), coercion);
    }

    /// Look up a constructor by type name
    pub fn get(&self, name: &str) -> Option<Coercion> {
        self.types.get(name).copied()
    }

    /// Whether a type name is known
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Rebuild `value` as the named type
    pub fn coerce(&self, name: &str, value: &ConcreteValue) -> Result<ConcreteValue> {
        let coercion = self
            .get(name)
            .ok_or_else(|| Error::UnknownTypeName(name.to_string()))?;
        coercion(value)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn cannot_convert(value: &ConcreteValue, target: &str) -> Error {
    Error::argument(format!(
        "cannot convert {} '{}' to {}",
        value.type_name(),
        value,
        target
    ))
}

fn to_bool(value: &ConcreteValue) -> Result<ConcreteValue> {
    Ok(ConcreteValue::Boolean(value.is_truthy()))
}

fn to_int(value: &ConcreteValue) -> Result<ConcreteValue> {
    match value {
        ConcreteValue::Integer(_) => Ok(value.clone()),
        ConcreteValue::Boolean(b) => Ok(ConcreteValue::Integer(i64::from(*b))),
        ConcreteValue::Float(n) if n.is_finite() => {
            let truncated = n.trunc();
            if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                Ok(ConcreteValue::Integer(truncated as i64))
            } else {
                Err(Error::Overflow("int"))
            }
        }
        ConcreteValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(ConcreteValue::Integer)
            .map_err(|_| cannot_convert(value, "int")),
        _ => Err(cannot_convert(value, "int")),
    }
}

fn to_float(value: &ConcreteValue) -> Result<ConcreteValue> {
    if let Some(n) = value.as_float() {
        return Ok(ConcreteValue::Float(n));
    }
    match value {
        ConcreteValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(ConcreteValue::Float)
            .map_err(|_| cannot_convert(value, "float")),
        _ => Err(cannot_convert(value, "float")),
    }
}

fn to_complex(value: &ConcreteValue) -> Result<ConcreteValue> {
    if let Some(c) = value.as_complex() {
        return Ok(ConcreteValue::Complex(c));
    }
    match value {
        ConcreteValue::Text(s) => literal::parse_complex(s)
            .or_else(|| {
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .map(|re| num_complex::Complex64::new(re, 0.0))
            })
            .map(ConcreteValue::Complex)
            .ok_or_else(|| cannot_convert(value, "complex")),
        _ => Err(cannot_convert(value, "complex")),
    }
}

fn to_str(value: &ConcreteValue) -> Result<ConcreteValue> {
    Ok(ConcreteValue::Text(value.to_string()))
}

fn to_date(value: &ConcreteValue) -> Result<ConcreteValue> {
    match value {
        ConcreteValue::Date(_) => Ok(value.clone()),
        ConcreteValue::DateTime(dt) => Ok(ConcreteValue::Date(dt.date())),
        ConcreteValue::Text(s) => match infer::infer(s) {
            ConcreteValue::Date(d) => Ok(ConcreteValue::Date(d)),
            ConcreteValue::DateTime(dt) => Ok(ConcreteValue::Date(dt.date())),
            _ => Err(cannot_convert(value, "date")),
        },
        _ => Err(cannot_convert(value, "date")),
    }
}

fn to_datetime(value: &ConcreteValue) -> Result<ConcreteValue> {
    let midnight = |d: chrono::NaiveDate| {
        d.and_hms_opt(0, 0, 0)
            .map(ConcreteValue::DateTime)
            .ok_or_else(|| cannot_convert(value, "datetime"))
    };
    match value {
        ConcreteValue::DateTime(_) => Ok(value.clone()),
        ConcreteValue::Date(d) => midnight(*d),
        ConcreteValue::Text(s) => match infer::infer(s) {
            ConcreteValue::DateTime(dt) => Ok(ConcreteValue::DateTime(dt)),
            ConcreteValue::Date(d) => midnight(d),
            _ => Err(cannot_convert(value, "datetime")),
        },
        _ => Err(cannot_convert(value, "datetime")),
    }
}

/// Elements of an iterable value; mappings yield their keys
fn elements(value: &ConcreteValue, target: &str) -> Result<Vec<ConcreteValue>> {
    match value {
        ConcreteValue::Sequence(items) | ConcreteValue::Tuple(items) | ConcreteValue::Set(items) => {
            Ok(items.clone())
        }
        ConcreteValue::Mapping(entries) => Ok(entries.iter().map(|(k, _)| k.clone()).collect()),
        ConcreteValue::Text(s) => Ok(s.chars().map(|c| ConcreteValue::Text(c.into())).collect()),
        _ => Err(cannot_convert(value, target)),
    }
}

fn to_list(value: &ConcreteValue) -> Result<ConcreteValue> {
    elements(value, "list").map(ConcreteValue::Sequence)
}

fn to_tuple(value: &ConcreteValue) -> Result<ConcreteValue> {
    elements(value, "tuple").map(ConcreteValue::Tuple)
}

fn to_set(value: &ConcreteValue) -> Result<ConcreteValue> {
    elements(value, "set").map(ConcreteValue::set)
}

fn to_dict(value: &ConcreteValue) -> Result<ConcreteValue> {
    match value {
        ConcreteValue::Mapping(_) => Ok(value.clone()),
        ConcreteValue::Sequence(items) | ConcreteValue::Tuple(items) => {
            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    ConcreteValue::Sequence(pair) | ConcreteValue::Tuple(pair)
                        if pair.len() == 2 =>
                    {
                        entries.push((pair[0].clone(), pair[1].clone()));
                    }
                    _ => return Err(cannot_convert(value, "dict")),
                }
            }
            Ok(ConcreteValue::mapping(entries))
        }
        _ => Err(cannot_convert(value, "dict")),
    }
}

/// Typed access to one column of a grid
pub struct ColumnView<'a, S: CellSource + ?Sized> {
    source: &'a S,
    registry: &'a TypeRegistry,
    column: u32,
}

impl<'a, S: CellSource + ?Sized> ColumnView<'a, S> {
    /// Create a view over `column`
    pub fn new(source: &'a S, registry: &'a TypeRegistry, column: u32) -> Self {
        Self {
            source,
            registry,
            column,
        }
    }

    /// Create a view from column letters ("B")
    pub fn named(source: &'a S, registry: &'a TypeRegistry, name: &str) -> Result<Self> {
        Ok(Self::new(source, registry, column_index(name)?))
    }

    /// The column index
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Rebuild the value at `row` as its recorded type
    ///
    /// Empty slots give `None`. A slot without a recorded type gives its
    /// final value unchanged. A type name missing from the registry is
    /// logged and gives `None`.
    pub fn get(&self, row: u32) -> Result<Option<ConcreteValue>> {
        let Some(value) = CellRef::new(self.column, row).value(self.source)? else {
            return Ok(None);
        };
        let Some(type_name) = self.source.cell_type(self.column, row) else {
            return Ok(Some(value));
        };
        match self.registry.get(&type_name) {
            Some(coercion) => coercion(&value).map(Some),
            None => {
                log::warn!(
                    "unknown type name '{}' for cell {}",
                    type_name,
                    CellAddress::new(self.column, row)
                );
                Ok(None)
            }
        }
    }
}

impl<S: CellSource + ?Sized> fmt::Debug for ColumnView<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnView")
            .field("column", &column_name(self.column))
            .finish_non_exhaustive()
    }
}
