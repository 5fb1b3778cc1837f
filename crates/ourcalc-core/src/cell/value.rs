//! Cell values: a concrete value or a reference to another grid slot
//!
//! A [`CellValue`] is what one grid slot holds. Its payload is either a
//! [`ConcreteValue`] or a reference to another slot; every operator first
//! follows the reference chain to its concrete end (see
//! [`CellValue::final_value`]) and then dispatches on the concrete kinds.

use super::address::{check_bounds, CellAddress};
use crate::error::{Error, Result};
use crate::value::{BinaryOp, ConcreteValue, UnaryOp};
use std::borrow::Cow;
use std::cell::{Ref, RefCell};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// A grid slot: the shared, mutable home of one cell's content
///
/// The grid owns slots; reference payloads point at them.
pub type SharedCell = Rc<RefCell<CellValue>>;

/// What a cell holds directly
#[derive(Clone)]
pub enum Payload {
    /// A concrete value
    Value(ConcreteValue),
    /// Another grid slot, resolved on every read
    Reference(SharedCell),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Value(v) => f.debug_tuple("Value").field(v).finish(),
            // Targets may refer back to us, so only the address is shown
            Payload::Reference(target) => match target.try_borrow() {
                Ok(cell) => write!(f, "Reference({})", cell.address()),
                Err(_) => write!(f, "Reference(<busy>)"),
            },
        }
    }
}

impl From<ConcreteValue> for Payload {
    fn from(value: ConcreteValue) -> Self {
        Payload::Value(value)
    }
}

impl From<SharedCell> for Payload {
    fn from(target: SharedCell) -> Self {
        Payload::Reference(target)
    }
}

/// Input to [`make_cell`]: either a plain value or an existing cell
#[derive(Debug, Clone)]
pub enum CellInput {
    /// A concrete value, e.g. from type inference or formula evaluation
    Value(ConcreteValue),
    /// An existing grid slot, e.g. a formula that evaluated to a cell
    Cell(SharedCell),
}

impl From<ConcreteValue> for CellInput {
    fn from(value: ConcreteValue) -> Self {
        CellInput::Value(value)
    }
}

impl From<SharedCell> for CellInput {
    fn from(cell: SharedCell) -> Self {
        CellInput::Cell(cell)
    }
}

impl From<&SharedCell> for CellInput {
    fn from(cell: &SharedCell) -> Self {
        CellInput::Cell(Rc::clone(cell))
    }
}

/// Check whether a value handed to the core is a cell rather than a plain value
pub fn is_reference(input: &CellInput) -> bool {
    matches!(input, CellInput::Cell(_))
}

/// Build the content of the grid slot at `(column, row)`
///
/// When `input` is an existing cell and neither axis is pinned, the cell is
/// copied and re-anchored at the new coordinates: the copy keeps pointing at
/// whatever the original pointed at, but now lives at `(column, row)`.
/// Otherwise `input` becomes the payload of a fresh cell, so a pinned
/// reference keeps resolving to the same slot wherever it is pasted.
///
/// # Examples
/// ```
/// use ourcalc_core::{make_cell, ConcreteValue};
///
/// let cell = make_cell(ConcreteValue::Integer(5), 0, 0, false, false).unwrap();
/// assert_eq!(cell.final_value().unwrap(), ConcreteValue::Integer(5));
/// ```
pub fn make_cell(
    input: impl Into<CellInput>,
    column: u32,
    row: u32,
    column_pinned: bool,
    row_pinned: bool,
) -> Result<CellValue> {
    check_bounds(column, row)?;

    match input.into() {
        CellInput::Cell(source) if !column_pinned && !row_pinned => {
            let mut copy = borrow_slot(&source, "relocated cell")?.clone();
            copy.column = column;
            copy.row = row;
            copy.column_pinned = column_pinned;
            copy.row_pinned = row_pinned;
            Ok(copy)
        }
        CellInput::Cell(source) => CellValue::unanchored(Payload::Reference(source))
            .pinned(column_pinned, row_pinned)
            .anchor(column, row),
        CellInput::Value(value) => CellValue::unanchored(Payload::Value(value))
            .pinned(column_pinned, row_pinned)
            .anchor(column, row),
    }
}

/// A cell whose coordinates have not been assigned yet
///
/// It has no operator surface; [`UnanchoredCell::anchor`] is the one step
/// that assigns coordinates and produces a usable [`CellValue`].
#[derive(Debug, Clone)]
pub struct UnanchoredCell {
    payload: Payload,
    column_pinned: bool,
    row_pinned: bool,
}

impl UnanchoredCell {
    /// Set the pin flags of the cell-to-be
    pub fn pinned(mut self, column_pinned: bool, row_pinned: bool) -> Self {
        self.column_pinned = column_pinned;
        self.row_pinned = row_pinned;
        self
    }

    /// Assign coordinates
    pub fn anchor(self, column: u32, row: u32) -> Result<CellValue> {
        check_bounds(column, row)?;
        Ok(CellValue {
            payload: self.payload,
            column,
            row,
            column_pinned: self.column_pinned,
            row_pinned: self.row_pinned,
        })
    }
}

/// The content of one grid slot
#[derive(Debug, Clone)]
pub struct CellValue {
    payload: Payload,
    column: u32,
    row: u32,
    column_pinned: bool,
    row_pinned: bool,
}

impl CellValue {
    /// Start building a cell; coordinates are assigned with
    /// [`UnanchoredCell::anchor`]
    pub fn unanchored(payload: impl Into<Payload>) -> UnanchoredCell {
        UnanchoredCell {
            payload: payload.into(),
            column_pinned: false,
            row_pinned: false,
        }
    }

    /// The immediate payload (possibly a reference)
    pub fn value(&self) -> &Payload {
        &self.payload
    }

    /// Whether the immediate payload is another cell
    pub fn is_reference(&self) -> bool {
        matches!(self.payload, Payload::Reference(_))
    }

    /// Column index (0-based)
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Row index (0-based)
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Whether the column is pinned
    pub fn column_pinned(&self) -> bool {
        self.column_pinned
    }

    /// Whether the row is pinned
    pub fn row_pinned(&self) -> bool {
        self.row_pinned
    }

    /// The cell's own address, including pin flags
    pub fn address(&self) -> CellAddress {
        CellAddress::with_pins(self.column, self.row, self.column_pinned, self.row_pinned)
    }

    /// Move the cell into a new grid slot
    pub fn into_shared(self) -> SharedCell {
        Rc::new(RefCell::new(self))
    }

    fn concrete(&self) -> Option<&ConcreteValue> {
        match &self.payload {
            Payload::Value(v) => Some(v),
            Payload::Reference(_) => None,
        }
    }

    /// Follow references until a concrete value is reached
    ///
    /// Fails with [`Error::CyclicReference`] when the chain comes back to a
    /// slot it has already passed through.
    pub fn final_value(&self) -> Result<ConcreteValue> {
        match &self.payload {
            Payload::Value(v) => Ok(v.clone()),
            Payload::Reference(target) => {
                let slot = terminal_slot(target, self.address())?;
                let cell = borrow_slot(&slot, "referenced cell")?;
                cell.concrete()
                    .cloned()
                    .ok_or_else(|| Error::CyclicReference(cell.address().to_string()))
            }
        }
    }

    /// Run `f` on the concrete value at the end of the chain, mutably
    fn with_final_value_mut<R>(
        &mut self,
        f: impl FnOnce(&mut ConcreteValue) -> Result<R>,
    ) -> Result<R> {
        let origin = self.address();
        match &mut self.payload {
            Payload::Value(v) => f(v),
            Payload::Reference(target) => {
                let slot = terminal_slot(target, origin)?;
                let mut cell = slot
                    .try_borrow_mut()
                    .map_err(|_| Error::BorrowConflict(format!("cell referenced from {}", origin)))?;
                let address = cell.address();
                match &mut cell.payload {
                    Payload::Value(v) => f(v),
                    Payload::Reference(_) => Err(Error::CyclicReference(address.to_string())),
                }
            }
        }
    }

    /// `self OP rhs`
    pub fn binary<R: Operand + ?Sized>(&self, op: BinaryOp, rhs: &R) -> Result<ConcreteValue> {
        let left = self.final_value()?;
        let right = rhs.resolve()?;
        left.apply(op, &right)
    }

    /// `lhs OP self`, the reflected form of [`CellValue::binary`]
    pub fn binary_reflected<L: Operand + ?Sized>(
        &self,
        op: BinaryOp,
        lhs: &L,
    ) -> Result<ConcreteValue> {
        let left = lhs.resolve()?;
        let right = self.final_value()?;
        left.apply(op, &right)
    }

    /// `OP self`
    pub fn unary(&self, op: UnaryOp) -> Result<ConcreteValue> {
        self.final_value()?.apply_unary(op)
    }

    /// In-place `self OP= rhs`
    ///
    /// The result replaces this cell's payload (a reference payload becomes
    /// the computed value) and is returned, so a caller holding the cell
    /// outside its slot can write it back.
    pub fn update<R: Operand + ?Sized>(&mut self, op: BinaryOp, rhs: &R) -> Result<ConcreteValue> {
        let result = self.binary(op, rhs)?;
        self.payload = Payload::Value(result.clone());
        Ok(result)
    }

    /// Equality of the final values
    pub fn equals<R: Operand + ?Sized>(&self, other: &R) -> Result<bool> {
        Ok(self.final_value()? == *other.resolve()?)
    }

    /// Ordering of the final values
    pub fn compare<R: Operand + ?Sized>(&self, other: &R) -> Result<Option<Ordering>> {
        self.final_value()?.compare(&*other.resolve()?)
    }

    /// `self < other`
    pub fn lt<R: Operand + ?Sized>(&self, other: &R) -> Result<bool> {
        self.final_value()?.lt(&*other.resolve()?)
    }

    /// `self <= other`
    pub fn le<R: Operand + ?Sized>(&self, other: &R) -> Result<bool> {
        self.final_value()?.le(&*other.resolve()?)
    }

    /// `self > other`
    pub fn gt<R: Operand + ?Sized>(&self, other: &R) -> Result<bool> {
        self.final_value()?.gt(&*other.resolve()?)
    }

    /// `self >= other`
    pub fn ge<R: Operand + ?Sized>(&self, other: &R) -> Result<bool> {
        self.final_value()?.ge(&*other.resolve()?)
    }

    /// `self[key]` on the final value
    pub fn get_item<K: Operand + ?Sized>(&self, key: &K) -> Result<ConcreteValue> {
        self.final_value()?.get_item(&*key.resolve()?)
    }

    /// `self[key] = value` on the final value, wherever it lives
    pub fn set_item<K: Operand + ?Sized, V: Operand + ?Sized>(
        &mut self,
        key: &K,
        value: &V,
    ) -> Result<()> {
        let key = key.resolve()?.into_owned();
        let value = value.resolve()?.into_owned();
        self.with_final_value_mut(|target| target.set_item(key, value))
    }

    /// `del self[key]` on the final value, wherever it lives
    pub fn del_item<K: Operand + ?Sized>(&mut self, key: &K) -> Result<()> {
        let key = key.resolve()?.into_owned();
        self.with_final_value_mut(|target| target.del_item(&key))
    }

    /// Call a named method of the final value
    pub fn call(&self, method: &str, args: &[ConcreteValue]) -> Result<ConcreteValue> {
        self.final_value()?.call(method, args)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.final_value() {
            Ok(v) => write!(f, "{}", v),
            Err(_) => write!(f, "#REF!"),
        }
    }
}

/// Apply `slot OP= rhs` and store the result in the slot
///
/// The result is computed before the slot is borrowed mutably, so `rhs`
/// may itself read the slot (`x += x`).
pub fn update_slot<R: Operand + ?Sized>(
    slot: &SharedCell,
    op: BinaryOp,
    rhs: &R,
) -> Result<ConcreteValue> {
    let (result, address) = {
        let cell = borrow_slot(slot, "updated cell")?;
        (cell.binary(op, rhs)?, cell.address())
    };
    let mut cell = slot
        .try_borrow_mut()
        .map_err(|_| Error::BorrowConflict(format!("cell {}", address)))?;
    cell.payload = Payload::Value(result.clone());
    Ok(result)
}

fn borrow_slot<'a>(slot: &'a SharedCell, what: &str) -> Result<Ref<'a, CellValue>> {
    slot.try_borrow()
        .map_err(|_| Error::BorrowConflict(what.to_string()))
}

/// Walk a reference chain to the slot holding a concrete value
fn terminal_slot(start: &SharedCell, origin: CellAddress) -> Result<SharedCell> {
    let mut visited: HashSet<*const RefCell<CellValue>> = HashSet::new();
    let mut current = Rc::clone(start);
    let mut via = origin;

    loop {
        if !visited.insert(Rc::as_ptr(&current)) {
            let address = borrow_slot(&current, "referenced cell")?.address();
            log::debug!("cyclic reference: {} leads back to {}", via, address);
            return Err(Error::CyclicReference(address.to_string()));
        }

        let next = {
            let cell = borrow_slot(&current, &format!("cell referenced from {}", via))?;
            log::trace!("dereference {} -> {}", via, cell.address());
            via = cell.address();
            match &cell.payload {
                Payload::Value(_) => None,
                Payload::Reference(target) => Some(Rc::clone(target)),
            }
        };

        match next {
            Some(target) => current = target,
            None => return Ok(current),
        }
    }
}

/// Anything that can stand on either side of a cell operator
///
/// Cells resolve to their final value; plain values resolve to themselves.
pub trait Operand {
    /// Resolve to a concrete value
    fn resolve(&self) -> Result<Cow<'_, ConcreteValue>>;
}

impl Operand for CellValue {
    fn resolve(&self) -> Result<Cow<'_, ConcreteValue>> {
        self.final_value().map(Cow::Owned)
    }
}

impl Operand for SharedCell {
    fn resolve(&self) -> Result<Cow<'_, ConcreteValue>> {
        borrow_slot(self, "operand cell")?
            .final_value()
            .map(Cow::Owned)
    }
}

impl Operand for ConcreteValue {
    fn resolve(&self) -> Result<Cow<'_, ConcreteValue>> {
        Ok(Cow::Borrowed(self))
    }
}

impl<T: Operand + ?Sized> Operand for &T {
    fn resolve(&self) -> Result<Cow<'_, ConcreteValue>> {
        (**self).resolve()
    }
}

macro_rules! operand_from_primitive {
    ($($ty:ty),*) => {
        $(
            impl Operand for $ty {
                fn resolve(&self) -> Result<Cow<'_, ConcreteValue>> {
                    Ok(Cow::Owned(ConcreteValue::from(*self)))
                }
            }
        )*
    };
}

operand_from_primitive!(bool, i32, i64, f64);

macro_rules! cell_operators {
    ($($trait:ident :: $method:ident => $op:expr),* $(,)?) => {
        $(
            impl<R: Operand> std::ops::$trait<R> for &CellValue {
                type Output = Result<ConcreteValue>;

                fn $method(self, rhs: R) -> Self::Output {
                    self.binary($op, &rhs)
                }
            }

            impl std::ops::$trait<&CellValue> for ConcreteValue {
                type Output = Result<ConcreteValue>;

                fn $method(self, rhs: &CellValue) -> Self::Output {
                    rhs.binary_reflected($op, &self)
                }
            }

            impl std::ops::$trait<&CellValue> for &ConcreteValue {
                type Output = Result<ConcreteValue>;

                fn $method(self, rhs: &CellValue) -> Self::Output {
                    rhs.binary_reflected($op, self)
                }
            }

            cell_operators!(@reflected $trait :: $method => $op; i64, f64);
        )*
    };
    (@reflected $trait:ident :: $method:ident => $op:expr; $($ty:ty),*) => {
        $(
            impl std::ops::$trait<&CellValue> for $ty {
                type Output = Result<ConcreteValue>;

                fn $method(self, rhs: &CellValue) -> Self::Output {
                    rhs.binary_reflected($op, &self)
                }
            }
        )*
    };
}

cell_operators! {
    Add::add => BinaryOp::Add,
    Sub::sub => BinaryOp::Sub,
    Mul::mul => BinaryOp::Mul,
    Div::div => BinaryOp::Div,
    Rem::rem => BinaryOp::Rem,
    BitAnd::bitand => BinaryOp::BitAnd,
    BitOr::bitor => BinaryOp::BitOr,
    BitXor::bitxor => BinaryOp::BitXor,
    Shl::shl => BinaryOp::Shl,
    Shr::shr => BinaryOp::Shr,
}

impl std::ops::Neg for &CellValue {
    type Output = Result<ConcreteValue>;

    fn neg(self) -> Self::Output {
        self.unary(UnaryOp::Neg)
    }
}
