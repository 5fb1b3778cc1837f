//! Container access and the named method surface of concrete values
//!
//! Formulas reach kind-specific behaviour (text case conversion, slicing,
//! date parts, ...) through [`ConcreteValue::call`]. Only the methods listed
//! in [`Method`] exist; anything else is [`Error::UnknownMethod`].

use super::ConcreteValue;
use crate::error::{Error, Result};
use chrono::{Datelike, Timelike};
use std::str::FromStr;

/// Methods that can be called on a concrete value by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Len,
    Upper,
    Lower,
    Strip,
    Slice,
    Contains,
    Keys,
    Values,
    Real,
    Imag,
    Conjugate,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Date,
    IsoFormat,
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        Ok(match s {
            "len" => Method::Len,
            "upper" => Method::Upper,
            "lower" => Method::Lower,
            "strip" => Method::Strip,
            "slice" => Method::Slice,
            "contains" => Method::Contains,
            "keys" => Method::Keys,
            "values" => Method::Values,
            "real" => Method::Real,
            "imag" => Method::Imag,
            "conjugate" => Method::Conjugate,
            "year" => Method::Year,
            "month" => Method::Month,
            "day" => Method::Day,
            "hour" => Method::Hour,
            "minute" => Method::Minute,
            "second" => Method::Second,
            "date" => Method::Date,
            "isoformat" => Method::IsoFormat,
            _ => return Err(()),
        })
    }
}

/// Map a possibly negative index onto `0..len`
fn normalize_index(index: i64, len: usize) -> Result<usize> {
    let len_i = i64::try_from(len).map_err(|_| Error::Overflow("index"))?;
    let resolved = if index < 0 { index + len_i } else { index };
    if resolved < 0 || resolved >= len_i {
        return Err(Error::IndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}

/// Clamp slice bounds the way sequence slicing does
fn slice_bounds(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let len_i = len as i64;
    let clamp = |i: i64| -> usize {
        let i = if i < 0 { i + len_i } else { i };
        i.clamp(0, len_i) as usize
    };
    let start = start.map(clamp).unwrap_or(0);
    let end = end.map(clamp).unwrap_or(len);
    (start, end.max(start))
}

fn integer_arg(args: &[ConcreteValue], pos: usize, method: &str) -> Result<Option<i64>> {
    match args.get(pos) {
        None => Ok(None),
        Some(v) => v
            .as_integer()
            .map(Some)
            .ok_or_else(|| Error::argument(format!("{}() expects integer arguments", method))),
    }
}

impl ConcreteValue {
    /// Number of elements (characters for text)
    pub fn len(&self) -> Result<usize> {
        match self {
            ConcreteValue::Text(s) => Ok(s.chars().count()),
            ConcreteValue::Sequence(items)
            | ConcreteValue::Tuple(items)
            | ConcreteValue::Set(items) => Ok(items.len()),
            ConcreteValue::Mapping(entries) => Ok(entries.len()),
            other => Err(Error::UnknownMethod {
                method: "len".into(),
                type_name: other.type_name(),
            }),
        }
    }

    /// `self[key]`
    pub fn get_item(&self, key: &ConcreteValue) -> Result<ConcreteValue> {
        match (self, key.as_integer()) {
            (ConcreteValue::Sequence(items) | ConcreteValue::Tuple(items), Some(i)) => {
                Ok(items[normalize_index(i, items.len())?].clone())
            }
            (ConcreteValue::Text(s), Some(i)) => {
                let idx = normalize_index(i, s.chars().count())?;
                Ok(ConcreteValue::Text(
                    s.chars().nth(idx).map(String::from).unwrap_or_default(),
                ))
            }
            (ConcreteValue::Mapping(entries), _) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| Error::KeyNotFound(key.to_string())),
            _ => Err(Error::Operation {
                op: "[]",
                left: self.type_name(),
                right: key.type_name(),
            }),
        }
    }

    /// `self[key] = value`
    ///
    /// Only sequences and mappings are mutable containers.
    pub fn set_item(&mut self, key: ConcreteValue, value: ConcreteValue) -> Result<()> {
        match (self, key.as_integer()) {
            (ConcreteValue::Sequence(items), Some(i)) => {
                let idx = normalize_index(i, items.len())?;
                items[idx] = value;
                Ok(())
            }
            (ConcreteValue::Mapping(entries), _) => {
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
                Ok(())
            }
            (container, _) => Err(Error::Operation {
                op: "[]=",
                left: container.type_name(),
                right: key.type_name(),
            }),
        }
    }

    /// `del self[key]`
    pub fn del_item(&mut self, key: &ConcreteValue) -> Result<()> {
        match (self, key.as_integer()) {
            (ConcreteValue::Sequence(items), Some(i)) => {
                let idx = normalize_index(i, items.len())?;
                items.remove(idx);
                Ok(())
            }
            (ConcreteValue::Mapping(entries), _) => {
                let pos = entries
                    .iter()
                    .position(|(k, _)| k == key)
                    .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
                entries.remove(pos);
                Ok(())
            }
            (container, _) => Err(Error::Operation {
                op: "del []",
                left: container.type_name(),
                right: key.type_name(),
            }),
        }
    }

    /// Membership test: substring for text, element for sequences and sets,
    /// key for mappings
    pub fn contains(&self, item: &ConcreteValue) -> Result<bool> {
        match (self, item) {
            (ConcreteValue::Text(s), ConcreteValue::Text(needle)) => Ok(s.contains(needle.as_str())),
            (
                ConcreteValue::Sequence(items)
                | ConcreteValue::Tuple(items)
                | ConcreteValue::Set(items),
                _,
            ) => Ok(items.contains(item)),
            (ConcreteValue::Mapping(entries), _) => Ok(entries.iter().any(|(k, _)| k == item)),
            _ => Err(Error::Operation {
                op: "in",
                left: item.type_name(),
                right: self.type_name(),
            }),
        }
    }

    /// `self[start:end]` for text, sequences and tuples
    pub fn slice(&self, start: Option<i64>, end: Option<i64>) -> Result<ConcreteValue> {
        match self {
            ConcreteValue::Text(s) => {
                let (a, b) = slice_bounds(start, end, s.chars().count());
                Ok(ConcreteValue::Text(s.chars().skip(a).take(b - a).collect()))
            }
            ConcreteValue::Sequence(items) => {
                let (a, b) = slice_bounds(start, end, items.len());
                Ok(ConcreteValue::Sequence(items[a..b].to_vec()))
            }
            ConcreteValue::Tuple(items) => {
                let (a, b) = slice_bounds(start, end, items.len());
                Ok(ConcreteValue::Tuple(items[a..b].to_vec()))
            }
            other => Err(Error::UnknownMethod {
                method: "slice".into(),
                type_name: other.type_name(),
            }),
        }
    }

    /// Call a named method on the value
    ///
    /// # Examples
    /// ```
    /// use ourcalc_core::ConcreteValue;
    ///
    /// let text = ConcreteValue::text("Hello");
    /// assert_eq!(text.call("upper", &[]).unwrap(), ConcreteValue::text("HELLO"));
    /// ```
    pub fn call(&self, method: &str, args: &[ConcreteValue]) -> Result<ConcreteValue> {
        use ConcreteValue as V;

        let unknown = || Error::UnknownMethod {
            method: method.to_string(),
            type_name: self.type_name(),
        };
        let parsed: Method = method.parse().map_err(|_| unknown())?;

        match (parsed, self) {
            (Method::Len, _) => {
                let len = self.len()?;
                Ok(V::Integer(i64::try_from(len).map_err(|_| Error::Overflow("len"))?))
            }
            (Method::Upper, V::Text(s)) => Ok(V::Text(s.to_uppercase())),
            (Method::Lower, V::Text(s)) => Ok(V::Text(s.to_lowercase())),
            (Method::Strip, V::Text(s)) => Ok(V::Text(s.trim().to_string())),
            (Method::Slice, _) => self.slice(
                integer_arg(args, 0, method)?,
                integer_arg(args, 1, method)?,
            ),
            (Method::Contains, _) => {
                let item = args
                    .first()
                    .ok_or_else(|| Error::argument("contains() takes one argument"))?;
                Ok(V::Boolean(self.contains(item)?))
            }
            (Method::Keys, V::Mapping(entries)) => {
                Ok(V::Sequence(entries.iter().map(|(k, _)| k.clone()).collect()))
            }
            (Method::Values, V::Mapping(entries)) => {
                Ok(V::Sequence(entries.iter().map(|(_, v)| v.clone()).collect()))
            }
            (Method::Real, V::Complex(c)) => Ok(V::Float(c.re)),
            (Method::Imag, V::Complex(c)) => Ok(V::Float(c.im)),
            (Method::Conjugate, V::Complex(c)) => Ok(V::Complex(c.conj())),
            (Method::Real | Method::Conjugate, V::Integer(_) | V::Float(_)) => Ok(self.clone()),
            (Method::Real | Method::Conjugate, V::Boolean(b)) => Ok(V::Integer(i64::from(*b))),
            (Method::Imag, V::Integer(_) | V::Boolean(_)) => Ok(V::Integer(0)),
            (Method::Imag, V::Float(_)) => Ok(V::Float(0.0)),
            (Method::Year, V::Date(d)) => Ok(V::Integer(i64::from(d.year()))),
            (Method::Year, V::DateTime(dt)) => Ok(V::Integer(i64::from(dt.year()))),
            (Method::Month, V::Date(d)) => Ok(V::Integer(i64::from(d.month()))),
            (Method::Month, V::DateTime(dt)) => Ok(V::Integer(i64::from(dt.month()))),
            (Method::Day, V::Date(d)) => Ok(V::Integer(i64::from(d.day()))),
            (Method::Day, V::DateTime(dt)) => Ok(V::Integer(i64::from(dt.day()))),
            (Method::Hour, V::DateTime(dt)) => Ok(V::Integer(i64::from(dt.hour()))),
            (Method::Minute, V::DateTime(dt)) => Ok(V::Integer(i64::from(dt.minute()))),
            (Method::Second, V::DateTime(dt)) => Ok(V::Integer(i64::from(dt.second()))),
            (Method::Date, V::Date(d)) => Ok(V::Date(*d)),
            (Method::Date, V::DateTime(dt)) => Ok(V::Date(dt.date())),
            (Method::IsoFormat, V::Date(d)) => Ok(V::Text(d.format("%Y-%m-%d").to_string())),
            (Method::IsoFormat, V::DateTime(dt)) => {
                Ok(V::Text(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
            }
            _ => Err(unknown()),
        }
    }
}
