//! Concrete (non-reference) cell values
//!
//! This module contains:
//! - [`ConcreteValue`] - the closed set of kinds a cell can ultimately hold
//! - [`BinaryOp`] / [`UnaryOp`] - the operator surface, dispatched per kind
//! - container access and the explicit method surface (`len`, `upper`, ...)

mod methods;
mod ops;

pub use methods::Method;
pub use ops::{BinaryOp, UnaryOp};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use num_complex::Complex64;
use std::fmt;

/// A concrete value held by a cell at the end of any reference chain
#[derive(Debug, Clone)]
pub enum ConcreteValue {
    /// Boolean value (True/False)
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// Complex number
    Complex(Complex64),
    /// Text value
    Text(String),
    /// Calendar date without a time of day
    Date(NaiveDate),
    /// Date with a time of day
    DateTime(NaiveDateTime),
    /// Ordered, growable sequence
    Sequence(Vec<ConcreteValue>),
    /// Ordered, fixed-arity sequence
    Tuple(Vec<ConcreteValue>),
    /// Unordered collection of unique elements
    Set(Vec<ConcreteValue>),
    /// Key to value mapping with unique keys, in insertion order
    Mapping(Vec<(ConcreteValue, ConcreteValue)>),
}

impl ConcreteValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        ConcreteValue::Text(s.into())
    }

    /// Create a set, dropping duplicate elements
    pub fn set<I: IntoIterator<Item = ConcreteValue>>(items: I) -> Self {
        let mut unique: Vec<ConcreteValue> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        ConcreteValue::Set(unique)
    }

    /// Create a mapping; a repeated key keeps its first position and last value
    pub fn mapping<I: IntoIterator<Item = (ConcreteValue, ConcreteValue)>>(entries: I) -> Self {
        let mut map: Vec<(ConcreteValue, ConcreteValue)> = Vec::new();
        for (key, value) in entries {
            match map.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => map.push((key, value)),
            }
        }
        ConcreteValue::Mapping(map)
    }

    /// Get the type name for error messages
    ///
    /// These are also the names the column accessor's type registry uses.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConcreteValue::Boolean(_) => "bool",
            ConcreteValue::Integer(_) => "int",
            ConcreteValue::Float(_) => "float",
            ConcreteValue::Complex(_) => "complex",
            ConcreteValue::Text(_) => "str",
            ConcreteValue::Date(_) => "date",
            ConcreteValue::DateTime(_) => "datetime",
            ConcreteValue::Sequence(_) => "list",
            ConcreteValue::Tuple(_) => "tuple",
            ConcreteValue::Set(_) => "set",
            ConcreteValue::Mapping(_) => "dict",
        }
    }

    /// Check if the value is numeric (boolean, integer, float or complex)
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConcreteValue::Boolean(_)
                | ConcreteValue::Integer(_)
                | ConcreteValue::Float(_)
                | ConcreteValue::Complex(_)
        )
    }

    /// Try to get the value as an integer (booleans count as 0/1)
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConcreteValue::Integer(n) => Some(*n),
            ConcreteValue::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Try to get the value as a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConcreteValue::Float(n) => Some(*n),
            ConcreteValue::Integer(n) => Some(*n as f64),
            ConcreteValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Try to get the value as a complex number
    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            ConcreteValue::Complex(c) => Some(*c),
            other => other.as_float().map(|re| Complex64::new(re, 0.0)),
        }
    }

    /// Try to get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConcreteValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness: zero, empty text and empty containers are false
    pub fn is_truthy(&self) -> bool {
        match self {
            ConcreteValue::Boolean(b) => *b,
            ConcreteValue::Integer(n) => *n != 0,
            ConcreteValue::Float(n) => *n != 0.0,
            ConcreteValue::Complex(c) => c.re != 0.0 || c.im != 0.0,
            ConcreteValue::Text(s) => !s.is_empty(),
            ConcreteValue::Date(_) | ConcreteValue::DateTime(_) => true,
            ConcreteValue::Sequence(items)
            | ConcreteValue::Tuple(items)
            | ConcreteValue::Set(items) => !items.is_empty(),
            ConcreteValue::Mapping(entries) => !entries.is_empty(),
        }
    }

    /// Render the value the way it appears inside a container literal
    ///
    /// Text is quoted here; at the top level [`fmt::Display`] shows it bare.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcreteValue::Text(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            other => write!(f, "{}", other),
        }
    }
}

impl PartialEq for ConcreteValue {
    fn eq(&self, other: &Self) -> bool {
        ops::values_equal(self, other)
    }
}

fn fmt_items(f: &mut fmt::Formatter<'_>, items: &[ConcreteValue]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        item.fmt_nested(f)?;
    }
    Ok(())
}

fn fmt_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        write!(f, "{:.1}", n)
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for ConcreteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcreteValue::Boolean(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            ConcreteValue::Integer(n) => write!(f, "{}", n),
            ConcreteValue::Float(n) => fmt_float(f, *n),
            ConcreteValue::Complex(c) => {
                let sign = if c.im.is_sign_negative() {
                    '-'
                } else {
                    '+'
                };
                write!(f, "({}{}{}j)", c.re, sign, c.im.abs())
            }
            ConcreteValue::Text(s) => write!(f, "{}", s),
            ConcreteValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ConcreteValue::DateTime(dt) => {
                if dt.nanosecond() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.6f"))
                }
            }
            ConcreteValue::Sequence(items) => {
                write!(f, "[")?;
                fmt_items(f, items)?;
                write!(f, "]")
            }
            ConcreteValue::Tuple(items) => {
                write!(f, "(")?;
                fmt_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            ConcreteValue::Set(items) => {
                if items.is_empty() {
                    return write!(f, "set()");
                }
                write!(f, "{{")?;
                fmt_items(f, items)?;
                write!(f, "}}")
            }
            ConcreteValue::Mapping(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    key.fmt_nested(f)?;
                    write!(f, ": ")?;
                    value.fmt_nested(f)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for ConcreteValue {
    fn from(b: bool) -> Self {
        ConcreteValue::Boolean(b)
    }
}

impl From<i32> for ConcreteValue {
    fn from(n: i32) -> Self {
        ConcreteValue::Integer(i64::from(n))
    }
}

impl From<i64> for ConcreteValue {
    fn from(n: i64) -> Self {
        ConcreteValue::Integer(n)
    }
}

impl From<f64> for ConcreteValue {
    fn from(n: f64) -> Self {
        ConcreteValue::Float(n)
    }
}

impl From<Complex64> for ConcreteValue {
    fn from(c: Complex64) -> Self {
        ConcreteValue::Complex(c)
    }
}

impl From<&str> for ConcreteValue {
    fn from(s: &str) -> Self {
        ConcreteValue::Text(s.to_string())
    }
}

impl From<String> for ConcreteValue {
    fn from(s: String) -> Self {
        ConcreteValue::Text(s)
    }
}

impl From<NaiveDate> for ConcreteValue {
    fn from(d: NaiveDate) -> Self {
        ConcreteValue::Date(d)
    }
}

impl From<NaiveDateTime> for ConcreteValue {
    fn from(dt: NaiveDateTime) -> Self {
        ConcreteValue::DateTime(dt)
    }
}

impl From<Vec<ConcreteValue>> for ConcreteValue {
    fn from(items: Vec<ConcreteValue>) -> Self {
        ConcreteValue::Sequence(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_conversions() {
        assert_eq!(ConcreteValue::from(42), ConcreteValue::Integer(42));
        assert_eq!(ConcreteValue::from(3.5), ConcreteValue::Float(3.5));
        assert_eq!(ConcreteValue::from(true), ConcreteValue::Boolean(true));
        assert_eq!(ConcreteValue::from("hi").as_str(), Some("hi"));
    }

    #[test]
    fn test_set_and_mapping_uniqueness() {
        let set = ConcreteValue::set(vec![1.into(), 2.into(), 1.into()]);
        assert_eq!(set, ConcreteValue::Set(vec![1.into(), 2.into()]));

        let map = ConcreteValue::mapping(vec![
            ("a".into(), 1.into()),
            ("b".into(), 2.into()),
            ("a".into(), 3.into()),
        ]);
        match map {
            ConcreteValue::Mapping(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0], ("a".into(), 3.into()));
            }
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ConcreteValue::Boolean(false).to_string(), "False");
        assert_eq!(ConcreteValue::Float(3.0).to_string(), "3.0");
        assert_eq!(ConcreteValue::Float(3.25).to_string(), "3.25");
        assert_eq!(
            ConcreteValue::Complex(Complex64::new(1.0, -2.0)).to_string(),
            "(1-2j)"
        );
        assert_eq!(
            ConcreteValue::Sequence(vec![1.into(), "a".into()]).to_string(),
            "[1, 'a']"
        );
        assert_eq!(ConcreteValue::Tuple(vec![1.into()]).to_string(), "(1,)");
        assert_eq!(ConcreteValue::Set(vec![]).to_string(), "set()");
        assert_eq!(
            ConcreteValue::mapping(vec![("k".into(), 1.5.into())]).to_string(),
            "{'k': 1.5}"
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!ConcreteValue::Integer(0).is_truthy());
        assert!(ConcreteValue::text("x").is_truthy());
        assert!(!ConcreteValue::Sequence(vec![]).is_truthy());
    }
}
