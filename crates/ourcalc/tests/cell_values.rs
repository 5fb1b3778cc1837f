//! End-to-end tests for cells on a sheet

use ourcalc::prelude::*;
use ourcalc::{column_index, column_name, update_slot, BinaryOp};
use pretty_assertions::assert_eq;
use std::rc::Rc;

/// Test the column letter codec at its boundaries
#[test]
fn test_column_codec() {
    let cases = [(0, "A"), (25, "Z"), (26, "AA"), (27, "AB"), (701, "ZZ"), (702, "AAA")];
    for (index, name) in cases {
        assert_eq!(column_name(index), name);
        assert_eq!(column_index(name).unwrap(), index);
    }
    for index in 0..=10_000 {
        assert_eq!(column_index(&column_name(index)).unwrap(), index);
    }
}

/// Test inference of typed-in text
#[test]
fn test_infer_examples() {
    assert!(matches!(infer("42"), ConcreteValue::Integer(42)));
    assert!(matches!(infer("3.14"), ConcreteValue::Float(_)));
    assert!(matches!(infer("2024-01-01"), ConcreteValue::Date(_)));
    assert!(matches!(infer("2024-01-01T10:30:00"), ConcreteValue::DateTime(_)));
    assert_eq!(infer("hello world"), ConcreteValue::text("hello world"));
}

/// Test operators on a plain cell and a reference cell
#[test]
fn test_operators_through_references() {
    let mut sheet = Sheet::new();
    sheet.set_input(0, 0, "5").unwrap();
    sheet.set_input(1, 0, "3").unwrap();

    let x = sheet.slot(0, 0).unwrap();
    let three = sheet.slot(1, 0).unwrap();
    let y = make_cell(&three, 2, 0, true, true).unwrap();
    assert!(y.is_reference());

    assert_eq!((&*x.borrow() + &y).unwrap(), ConcreteValue::Integer(8));
    assert_eq!((&y + 10).unwrap(), ConcreteValue::Integer(13));
    assert_eq!((10 + &y).unwrap(), ConcreteValue::Integer(13));
    assert!(y.lt(&x).unwrap());
    assert!(y.equals(&3).unwrap());
}

/// Test that a chain of references resolves to the value at its end
#[test]
fn test_reference_chain() {
    let mut sheet = Sheet::new();
    sheet.set_value(0, 0, 1.5).unwrap();
    for column in 1..5 {
        let previous = sheet.slot(column - 1, 0).unwrap();
        let cell = make_cell(&previous, column, 0, true, true).unwrap();
        sheet.set_cell(column, 0, cell).unwrap();
    }
    assert_eq!(sheet.get_value(4, 0).unwrap(), Some(1.5.into()));

    sheet.set_value(0, 0, 2.5).unwrap();
    assert_eq!(sheet.get_value(4, 0).unwrap(), Some(2.5.into()));
}

/// Test that cyclic chains fail instead of looping
#[test]
fn test_cycle_detection() {
    let mut sheet = Sheet::new();
    sheet.set_value(0, 0, 1).unwrap();
    sheet.set_value(1, 0, 2).unwrap();
    let a1 = sheet.slot(0, 0).unwrap();
    let b1 = sheet.slot(1, 0).unwrap();

    sheet
        .set_cell(0, 0, make_cell(&b1, 0, 0, true, true).unwrap())
        .unwrap();
    sheet
        .set_cell(1, 0, make_cell(&a1, 1, 0, true, true).unwrap())
        .unwrap();

    assert!(matches!(
        sheet.get_value(0, 0),
        Err(Error::CyclicReference(_))
    ));
    let err = a1.borrow().final_value().unwrap_err();
    assert!(err.to_string().starts_with("Circular reference detected"));
    assert!((&*a1.borrow() + 1).is_err());
}

/// Test that copying an unpinned cell duplicates it
#[test]
fn test_copy_unpinned_duplicates() {
    let mut sheet = Sheet::new();
    sheet.set_input(0, 0, "5").unwrap();
    sheet
        .copy_cell(CellRef::parse("A1").unwrap(), CellRef::parse("C3").unwrap())
        .unwrap();

    let copy = sheet.slot(2, 2).unwrap();
    assert_eq!(copy.borrow().address().to_string(), "C3");
    assert!(!copy.borrow().is_reference());
    assert_eq!(sheet.cell_type(2, 2).as_deref(), Some("int"));

    sheet.set_value(0, 0, 9).unwrap();
    assert_eq!(sheet.get_value(2, 2).unwrap(), Some(5.into()));
}

/// Test that copying an unpinned reference keeps its target
#[test]
fn test_copy_unpinned_reference() {
    let mut sheet = Sheet::new();
    sheet.set_value(0, 0, 4).unwrap();
    let a1 = sheet.slot(0, 0).unwrap();
    let alias = CellValue::unanchored(Rc::clone(&a1)).anchor(1, 0).unwrap();
    sheet.set_cell(1, 0, alias).unwrap();

    sheet.copy_cell(cell_ref(1, 0), cell_ref(1, 4)).unwrap();
    let copy = sheet.slot(1, 4).unwrap();
    assert!(copy.borrow().is_reference());
    assert_eq!(copy.borrow().row(), 4);

    sheet.set_value(0, 0, 6).unwrap();
    assert_eq!(sheet.get_value(1, 4).unwrap(), Some(6.into()));
}

/// Test that copying a pinned cell pastes a reference to the source
#[test]
fn test_copy_pinned_references_source() {
    let mut sheet = Sheet::new();
    let pinned = make_cell(ConcreteValue::Integer(7), 0, 1, true, false).unwrap();
    sheet.set_cell(0, 1, pinned).unwrap();

    sheet.copy_cell(cell_ref(0, 1), cell_ref(3, 3)).unwrap();
    let pasted = sheet.slot(3, 3).unwrap();
    assert!(pasted.borrow().is_reference());
    assert!(pasted.borrow().column_pinned());
    assert_eq!(sheet.get_value(3, 3).unwrap(), Some(7.into()));

    sheet.set_value(0, 1, 8).unwrap();
    assert_eq!(sheet.get_value(3, 3).unwrap(), Some(8.into()));
}

/// Test that in-place operators write the result back
#[test]
fn test_update_writes_back() {
    let mut sheet = Sheet::new();
    sheet.set_value(0, 0, 10).unwrap();
    let slot = sheet.slot(0, 0).unwrap();

    let result = update_slot(&slot, BinaryOp::Add, &5).unwrap();
    assert_eq!(result, 15.into());
    assert_eq!(sheet.get_value(0, 0).unwrap(), Some(15.into()));

    // x += x reads the slot before writing it
    update_slot(&slot, BinaryOp::Mul, &Rc::clone(&slot)).unwrap();
    assert_eq!(sheet.get_value(0, 0).unwrap(), Some(225.into()));
}

/// Test container access and methods through a reference
#[test]
fn test_containers_through_reference() {
    let mut sheet = Sheet::new();
    sheet.set_input(0, 0, "[1, 2, 3]").unwrap();
    sheet.set_input(0, 1, "{'name': 'ada'}").unwrap();

    let list = make_cell(&sheet.slot(0, 0).unwrap(), 1, 0, true, true).unwrap();
    assert_eq!(list.get_item(&-1).unwrap(), 3.into());
    assert_eq!(list.call("len", &[]).unwrap(), 3.into());

    let map = make_cell(&sheet.slot(0, 1).unwrap(), 1, 1, true, true).unwrap();
    let name = map.get_item(&ConcreteValue::text("name")).unwrap();
    assert_eq!(name.call("upper", &[]).unwrap(), "ADA".into());
}

/// Test ranges and typed column access
#[test]
fn test_ranges_and_columns() {
    let r = range(CellRef::parse("A1").unwrap(), CellRef::parse("C3").unwrap());
    assert_eq!(r.to_string(), "A1:C3");

    let mut sheet = Sheet::new();
    sheet.set_input(1, 0, "12").unwrap();
    sheet.set_input(1, 1, "2024-06-30").unwrap();
    sheet.set_input(1, 2, "(1, 'a')").unwrap();

    let registry = TypeRegistry::builtin();
    let column = sheet.column(&registry, column_index("B").unwrap());
    assert_eq!(column.get(0).unwrap(), Some(12.into()));
    assert!(matches!(column.get(1).unwrap(), Some(ConcreteValue::Date(_))));
    assert!(matches!(column.get(2).unwrap(), Some(ConcreteValue::Tuple(_))));
    assert_eq!(column.get(3).unwrap(), None);
}
