//! Operator dispatch over concrete values
//!
//! Every operator is resolved by matching on both operand kinds. Numbers
//! follow the tower boolean < integer < float < complex; integer arithmetic
//! is checked and reports overflow instead of wrapping.

use super::ConcreteValue;
use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use num_complex::Complex64;
use std::cmp::Ordering;
use std::fmt;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Largest element (or byte) count a repetition may produce
const MAX_REPEAT_LEN: usize = 1 << 28;

/// Binary operators available on cell values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// True division, always produces a float (or complex)
    Div,
    /// Division rounding toward negative infinity
    FloorDiv,
    /// Remainder whose sign follows the divisor
    Rem,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    /// Operator symbol, used in error messages
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unary operators available on cell values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    /// Bitwise complement
    Invert,
    /// Logical negation of truthiness
    Not,
    Abs,
}

impl UnaryOp {
    /// Operator symbol, used in error messages
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not",
            UnaryOp::Abs => "abs()",
        }
    }
}

/// A number lifted onto the numeric tower
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
    Complex(Complex64),
}

impl Num {
    fn of(value: &ConcreteValue) -> Option<Num> {
        match value {
            ConcreteValue::Boolean(b) => Some(Num::Int(i64::from(*b))),
            ConcreteValue::Integer(n) => Some(Num::Int(*n)),
            ConcreteValue::Float(n) => Some(Num::Float(*n)),
            ConcreteValue::Complex(c) => Some(Num::Complex(*c)),
            _ => None,
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(n) => n,
            Num::Complex(c) => c.re,
        }
    }

    fn to_complex(self) -> Complex64 {
        match self {
            Num::Complex(c) => c,
            other => Complex64::new(other.to_f64(), 0.0),
        }
    }
}

fn unsupported(op: BinaryOp, left: &ConcreteValue, right: &ConcreteValue) -> Error {
    Error::Operation {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

impl ConcreteValue {
    /// Apply a binary operator with `self` on the left
    pub fn apply(&self, op: BinaryOp, rhs: &ConcreteValue) -> Result<ConcreteValue> {
        use ConcreteValue as V;

        // bool op bool stays boolean for the bitwise operators
        if let (V::Boolean(l), V::Boolean(r)) = (self, rhs) {
            match op {
                BinaryOp::BitAnd => return Ok(V::Boolean(*l & *r)),
                BinaryOp::BitOr => return Ok(V::Boolean(*l | *r)),
                BinaryOp::BitXor => return Ok(V::Boolean(*l ^ *r)),
                _ => {}
            }
        }

        if let (Some(l), Some(r)) = (Num::of(self), Num::of(rhs)) {
            return numeric(op, l, r).map_err(|e| match e {
                Error::Operation { op, .. } => Error::Operation {
                    op,
                    left: self.type_name(),
                    right: rhs.type_name(),
                },
                other => other,
            });
        }

        match (op, self, rhs) {
            (BinaryOp::Add, V::Text(l), V::Text(r)) => Ok(V::Text(format!("{}{}", l, r))),
            (BinaryOp::Add, V::Sequence(l), V::Sequence(r)) => Ok(V::Sequence(concat(l, r))),
            (BinaryOp::Add, V::Tuple(l), V::Tuple(r)) => Ok(V::Tuple(concat(l, r))),

            (BinaryOp::Mul, V::Text(s), n) | (BinaryOp::Mul, n, V::Text(s))
                if n.as_integer().is_some() =>
            {
                let times = repeat_count(n, s.len())?;
                Ok(V::Text(s.repeat(times)))
            }
            (BinaryOp::Mul, V::Sequence(items), n) | (BinaryOp::Mul, n, V::Sequence(items))
                if n.as_integer().is_some() =>
            {
                Ok(V::Sequence(repeat(items, repeat_count(n, items.len())?)))
            }
            (BinaryOp::Mul, V::Tuple(items), n) | (BinaryOp::Mul, n, V::Tuple(items))
                if n.as_integer().is_some() =>
            {
                Ok(V::Tuple(repeat(items, repeat_count(n, items.len())?)))
            }

            (BinaryOp::BitOr, V::Set(l), V::Set(r)) => {
                Ok(ConcreteValue::set(l.iter().chain(r.iter()).cloned()))
            }
            (BinaryOp::BitAnd, V::Set(l), V::Set(r)) => Ok(V::Set(
                l.iter().filter(|x| r.contains(x)).cloned().collect(),
            )),
            (BinaryOp::Sub, V::Set(l), V::Set(r)) => Ok(V::Set(
                l.iter().filter(|x| !r.contains(x)).cloned().collect(),
            )),
            (BinaryOp::BitXor, V::Set(l), V::Set(r)) => Ok(V::Set(
                l.iter()
                    .filter(|x| !r.contains(x))
                    .chain(r.iter().filter(|x| !l.contains(x)))
                    .cloned()
                    .collect(),
            )),
            (BinaryOp::BitOr, V::Mapping(l), V::Mapping(r)) => Ok(ConcreteValue::mapping(
                l.iter().chain(r.iter()).cloned(),
            )),

            (BinaryOp::Add, V::Date(d), V::Integer(n))
            | (BinaryOp::Add, V::Integer(n), V::Date(d)) => shift_date(*d, *n),
            (BinaryOp::Sub, V::Date(d), V::Integer(n)) => {
                shift_date(*d, n.checked_neg().ok_or(Error::Overflow("date arithmetic"))?)
            }
            (BinaryOp::Sub, V::Date(l), V::Date(r)) => {
                Ok(V::Integer(l.signed_duration_since(*r).num_days()))
            }

            (BinaryOp::Add, V::DateTime(dt), n @ (V::Integer(_) | V::Float(_)))
            | (BinaryOp::Add, n @ (V::Integer(_) | V::Float(_)), V::DateTime(dt)) => {
                shift_datetime(*dt, n.as_float().unwrap_or_default())
            }
            (BinaryOp::Sub, V::DateTime(dt), n @ (V::Integer(_) | V::Float(_))) => {
                shift_datetime(*dt, -n.as_float().unwrap_or_default())
            }
            (BinaryOp::Sub, V::DateTime(l), V::DateTime(r)) => {
                let millis = l.signed_duration_since(*r).num_milliseconds();
                Ok(V::Float(millis as f64 / MILLIS_PER_DAY))
            }

            _ => Err(unsupported(op, self, rhs)),
        }
    }

    /// Apply a unary operator
    pub fn apply_unary(&self, op: UnaryOp) -> Result<ConcreteValue> {
        use ConcreteValue as V;

        if op == UnaryOp::Not {
            return Ok(V::Boolean(!self.is_truthy()));
        }

        let num = Num::of(self).ok_or(Error::UnaryOperation {
            op: op.symbol(),
            operand: self.type_name(),
        })?;

        match (op, num) {
            (UnaryOp::Pos, Num::Int(n)) => Ok(V::Integer(n)),
            (UnaryOp::Pos, _) => Ok(self.clone()),
            (UnaryOp::Neg, Num::Int(n)) => n
                .checked_neg()
                .map(V::Integer)
                .ok_or(Error::Overflow("negation")),
            (UnaryOp::Neg, Num::Float(n)) => Ok(V::Float(-n)),
            (UnaryOp::Neg, Num::Complex(c)) => Ok(V::Complex(-c)),
            (UnaryOp::Abs, Num::Int(n)) => n
                .checked_abs()
                .map(V::Integer)
                .ok_or(Error::Overflow("abs")),
            (UnaryOp::Abs, Num::Float(n)) => Ok(V::Float(n.abs())),
            (UnaryOp::Abs, Num::Complex(c)) => Ok(V::Float(c.norm())),
            (UnaryOp::Invert, Num::Int(n)) => Ok(V::Integer(!n)),
            _ => Err(Error::UnaryOperation {
                op: op.symbol(),
                operand: self.type_name(),
            }),
        }
    }

    /// Order two values
    ///
    /// `Ok(None)` means the values are comparable in kind but unordered
    /// (NaN, or two sets where neither contains the other). Kind pairs with
    /// no ordering at all are an [`Error::Operation`].
    pub fn compare(&self, other: &ConcreteValue) -> Result<Option<Ordering>> {
        use ConcreteValue as V;

        match (self, other) {
            (V::Complex(_), _) | (_, V::Complex(_)) => Err(Error::Operation {
                op: "<",
                left: self.type_name(),
                right: other.type_name(),
            }),
            (l, r) if l.is_numeric() && r.is_numeric() => match (Num::of(l), Num::of(r)) {
                (Some(Num::Int(a)), Some(Num::Int(b))) => Ok(Some(a.cmp(&b))),
                (Some(a), Some(b)) => Ok(a.to_f64().partial_cmp(&b.to_f64())),
                _ => Ok(None),
            },
            (V::Text(l), V::Text(r)) => Ok(Some(l.cmp(r))),
            (V::Date(l), V::Date(r)) => Ok(Some(l.cmp(r))),
            (V::DateTime(l), V::DateTime(r)) => Ok(Some(l.cmp(r))),
            (V::Sequence(l), V::Sequence(r)) | (V::Tuple(l), V::Tuple(r)) => {
                for (a, b) in l.iter().zip(r.iter()) {
                    if a != b {
                        return a.compare(b);
                    }
                }
                Ok(Some(l.len().cmp(&r.len())))
            }
            (V::Set(l), V::Set(r)) => {
                let l_in_r = l.iter().all(|x| r.contains(x));
                let r_in_l = r.iter().all(|x| l.contains(x));
                Ok(match (l_in_r, r_in_l) {
                    (true, true) => Some(Ordering::Equal),
                    (true, false) => Some(Ordering::Less),
                    (false, true) => Some(Ordering::Greater),
                    (false, false) => None,
                })
            }
            _ => Err(Error::Operation {
                op: "<",
                left: self.type_name(),
                right: other.type_name(),
            }),
        }
    }

    /// `self < other`
    pub fn lt(&self, other: &ConcreteValue) -> Result<bool> {
        Ok(self.compare(other)? == Some(Ordering::Less))
    }

    /// `self <= other`
    pub fn le(&self, other: &ConcreteValue) -> Result<bool> {
        Ok(matches!(
            self.compare(other)?,
            Some(Ordering::Less | Ordering::Equal)
        ))
    }

    /// `self > other`
    pub fn gt(&self, other: &ConcreteValue) -> Result<bool> {
        Ok(self.compare(other)? == Some(Ordering::Greater))
    }

    /// `self >= other`
    pub fn ge(&self, other: &ConcreteValue) -> Result<bool> {
        Ok(matches!(
            self.compare(other)?,
            Some(Ordering::Greater | Ordering::Equal)
        ))
    }
}

/// Structural equality; numbers compare across kinds (`1 == 1.0 == True`)
pub(crate) fn values_equal(a: &ConcreteValue, b: &ConcreteValue) -> bool {
    use ConcreteValue as V;

    if let (Some(l), Some(r)) = (Num::of(a), Num::of(b)) {
        return match (l, r) {
            (Num::Int(x), Num::Int(y)) => x == y,
            (Num::Complex(_), _) | (_, Num::Complex(_)) => l.to_complex() == r.to_complex(),
            _ => l.to_f64() == r.to_f64(),
        };
    }

    match (a, b) {
        (V::Text(l), V::Text(r)) => l == r,
        (V::Date(l), V::Date(r)) => l == r,
        (V::DateTime(l), V::DateTime(r)) => l == r,
        (V::Sequence(l), V::Sequence(r)) | (V::Tuple(l), V::Tuple(r)) => l == r,
        (V::Set(l), V::Set(r)) => l.len() == r.len() && l.iter().all(|x| r.contains(x)),
        (V::Mapping(l), V::Mapping(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(k, v)| r.iter().any(|(rk, rv)| rk == k && rv == v))
        }
        _ => false,
    }
}

fn numeric(op: BinaryOp, l: Num, r: Num) -> Result<ConcreteValue> {
    use ConcreteValue as V;

    match (l, r) {
        (Num::Complex(_), _) | (_, Num::Complex(_)) => {
            let (a, b) = (l.to_complex(), r.to_complex());
            match op {
                BinaryOp::Add => Ok(V::Complex(a + b)),
                BinaryOp::Sub => Ok(V::Complex(a - b)),
                BinaryOp::Mul => Ok(V::Complex(a * b)),
                BinaryOp::Div if b == Complex64::new(0.0, 0.0) => Err(Error::DivisionByZero),
                BinaryOp::Div => Ok(V::Complex(a / b)),
                BinaryOp::Pow => Ok(V::Complex(a.powc(b))),
                _ => Err(placeholder(op)),
            }
        }
        (Num::Int(a), Num::Int(b)) => integer(op, a, b),
        _ => float(op, l.to_f64(), r.to_f64()),
    }
}

/// Operand kinds are filled in by the caller, which still has the values
fn placeholder(op: BinaryOp) -> Error {
    Error::Operation {
        op: op.symbol(),
        left: "",
        right: "",
    }
}

fn integer(op: BinaryOp, a: i64, b: i64) -> Result<ConcreteValue> {
    use ConcreteValue as V;

    let overflow = Error::Overflow(op.symbol());
    match op {
        BinaryOp::Add => a.checked_add(b).map(V::Integer).ok_or(overflow),
        BinaryOp::Sub => a.checked_sub(b).map(V::Integer).ok_or(overflow),
        BinaryOp::Mul => a.checked_mul(b).map(V::Integer).ok_or(overflow),
        BinaryOp::Div => {
            if b == 0 {
                return Err(Error::DivisionByZero);
            }
            Ok(V::Float(a as f64 / b as f64))
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(Error::DivisionByZero);
            }
            let q = a.checked_div(b).ok_or(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                Ok(V::Integer(q - 1))
            } else {
                Ok(V::Integer(q))
            }
        }
        BinaryOp::Rem => {
            if b == 0 {
                return Err(Error::DivisionByZero);
            }
            if b == -1 {
                return Ok(V::Integer(0));
            }
            let m = a.checked_rem(b).ok_or(overflow)?;
            if m != 0 && ((m < 0) != (b < 0)) {
                Ok(V::Integer(m + b))
            } else {
                Ok(V::Integer(m))
            }
        }
        BinaryOp::Pow => {
            if b >= 0 {
                let exp = u32::try_from(b).map_err(|_| overflow.clone())?;
                a.checked_pow(exp).map(V::Integer).ok_or(overflow)
            } else if a == 0 {
                Err(Error::DivisionByZero)
            } else {
                Ok(V::Float((a as f64).powf(b as f64)))
            }
        }
        BinaryOp::BitAnd => Ok(V::Integer(a & b)),
        BinaryOp::BitOr => Ok(V::Integer(a | b)),
        BinaryOp::BitXor => Ok(V::Integer(a ^ b)),
        BinaryOp::Shl => {
            if b < 0 {
                return Err(Error::argument("negative shift count"));
            }
            if a == 0 {
                return Ok(V::Integer(0));
            }
            if b >= 64 {
                return Err(overflow);
            }
            let shifted = i128::from(a) << b;
            i64::try_from(shifted).map(V::Integer).map_err(|_| overflow)
        }
        BinaryOp::Shr => {
            if b < 0 {
                return Err(Error::argument("negative shift count"));
            }
            if b >= 64 {
                return Ok(V::Integer(if a < 0 { -1 } else { 0 }));
            }
            Ok(V::Integer(a >> b))
        }
    }
}

fn float(op: BinaryOp, a: f64, b: f64) -> Result<ConcreteValue> {
    use ConcreteValue as V;

    match op {
        BinaryOp::Add => Ok(V::Float(a + b)),
        BinaryOp::Sub => Ok(V::Float(a - b)),
        BinaryOp::Mul => Ok(V::Float(a * b)),
        BinaryOp::Div if b == 0.0 => Err(Error::DivisionByZero),
        BinaryOp::Div => Ok(V::Float(a / b)),
        BinaryOp::FloorDiv if b == 0.0 => Err(Error::DivisionByZero),
        BinaryOp::FloorDiv => Ok(V::Float((a / b).floor())),
        BinaryOp::Rem if b == 0.0 => Err(Error::DivisionByZero),
        BinaryOp::Rem => {
            let m = a % b;
            if m != 0.0 && ((m < 0.0) != (b < 0.0)) {
                Ok(V::Float(m + b))
            } else {
                Ok(V::Float(m))
            }
        }
        BinaryOp::Pow if a == 0.0 && b < 0.0 => Err(Error::DivisionByZero),
        BinaryOp::Pow if a < 0.0 && b.fract() != 0.0 => {
            Ok(V::Complex(Complex64::new(a, 0.0).powf(b)))
        }
        BinaryOp::Pow => Ok(V::Float(a.powf(b))),
        _ => Err(placeholder(op)),
    }
}

fn concat(l: &[ConcreteValue], r: &[ConcreteValue]) -> Vec<ConcreteValue> {
    l.iter().chain(r.iter()).cloned().collect()
}

/// Repetition count for `len` units, refused before anything is allocated
/// when the result would exceed [`MAX_REPEAT_LEN`]
fn repeat_count(n: &ConcreteValue, len: usize) -> Result<usize> {
    let n = n.as_integer().unwrap_or_default();
    let times = usize::try_from(n.max(0)).map_err(|_| Error::Overflow("repetition"))?;
    match len.checked_mul(times) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(times),
        _ => Err(Error::Overflow("repetition")),
    }
}

fn repeat(items: &[ConcreteValue], times: usize) -> Vec<ConcreteValue> {
    let mut out = Vec::with_capacity(items.len().saturating_mul(times));
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    out
}

fn shift_date(date: NaiveDate, days: i64) -> Result<ConcreteValue> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .map(ConcreteValue::Date)
        .ok_or(Error::Overflow("date arithmetic"))
}

fn shift_datetime(datetime: NaiveDateTime, days: f64) -> Result<ConcreteValue> {
    let millis = (days * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(Error::Overflow("date arithmetic"));
    }
    Duration::try_milliseconds(millis as i64)
        .and_then(|delta| datetime.checked_add_signed(delta))
        .map(ConcreteValue::DateTime)
        .ok_or(Error::Overflow("date arithmetic"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(n: i64) -> ConcreteValue {
        ConcreteValue::Integer(n)
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(int(5).apply(BinaryOp::Add, &int(3)).unwrap(), int(8));
        assert_eq!(int(5).apply(BinaryOp::Sub, &int(8)).unwrap(), int(-3));
        assert_eq!(int(7).apply(BinaryOp::Div, &int(2)).unwrap(), 3.5.into());
        assert_eq!(int(-7).apply(BinaryOp::FloorDiv, &int(2)).unwrap(), int(-4));
        assert_eq!(int(-7).apply(BinaryOp::Rem, &int(3)).unwrap(), int(2));
        assert_eq!(int(7).apply(BinaryOp::Rem, &int(-3)).unwrap(), int(-2));
        assert_eq!(int(2).apply(BinaryOp::Pow, &int(10)).unwrap(), int(1024));
        assert_eq!(int(2).apply(BinaryOp::Pow, &int(-1)).unwrap(), 0.5.into());
    }

    #[test]
    fn test_integer_errors() {
        assert_eq!(
            int(1).apply(BinaryOp::Div, &int(0)),
            Err(Error::DivisionByZero)
        );
        assert_eq!(
            int(i64::MAX).apply(BinaryOp::Add, &int(1)),
            Err(Error::Overflow("+"))
        );
        assert!(int(1).apply(BinaryOp::Shl, &int(-1)).is_err());
    }

    #[test]
    fn test_remainder_by_minus_one() {
        assert_eq!(int(i64::MIN).apply(BinaryOp::Rem, &int(-1)).unwrap(), int(0));
        assert_eq!(int(7).apply(BinaryOp::Rem, &int(-1)).unwrap(), int(0));
        assert_eq!(int(-7).apply(BinaryOp::Rem, &int(2)).unwrap(), int(1));
    }

    #[test]
    fn test_huge_repetition_is_an_error() {
        let seq = ConcreteValue::Sequence(vec![int(1), int(2)]);
        assert_eq!(
            seq.apply(BinaryOp::Mul, &int(i64::MAX)),
            Err(Error::Overflow("repetition"))
        );
        assert_eq!(
            ConcreteValue::text("ab").apply(BinaryOp::Mul, &int(i64::MAX)),
            Err(Error::Overflow("repetition"))
        );
        assert_eq!(
            int(i64::MAX).apply(BinaryOp::Mul, &ConcreteValue::Tuple(vec![int(1)])),
            Err(Error::Overflow("repetition"))
        );
        // Nothing to repeat stays cheap however large the count
        assert_eq!(
            ConcreteValue::text("").apply(BinaryOp::Mul, &int(i64::MAX)).unwrap(),
            "".into()
        );
        assert_eq!(
            seq.apply(BinaryOp::Mul, &int(-3)).unwrap(),
            ConcreteValue::Sequence(vec![])
        );
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(int(6).apply(BinaryOp::BitAnd, &int(3)).unwrap(), int(2));
        assert_eq!(int(6).apply(BinaryOp::BitOr, &int(3)).unwrap(), int(7));
        assert_eq!(int(1).apply(BinaryOp::Shl, &int(4)).unwrap(), int(16));
        assert_eq!(int(-16).apply(BinaryOp::Shr, &int(2)).unwrap(), int(-4));
        assert_eq!(
            ConcreteValue::Boolean(true)
                .apply(BinaryOp::BitXor, &ConcreteValue::Boolean(true))
                .unwrap(),
            ConcreteValue::Boolean(false)
        );
    }

    #[test]
    fn test_mixed_numeric() {
        assert_eq!(
            int(1).apply(BinaryOp::Add, &ConcreteValue::Float(0.5)).unwrap(),
            1.5.into()
        );
        assert_eq!(
            ConcreteValue::Boolean(true).apply(BinaryOp::Add, &int(1)).unwrap(),
            int(2)
        );
        let c = ConcreteValue::Complex(Complex64::new(1.0, 2.0));
        assert_eq!(
            c.apply(BinaryOp::Mul, &int(2)).unwrap(),
            ConcreteValue::Complex(Complex64::new(2.0, 4.0))
        );
        assert!(matches!(
            c.apply(BinaryOp::FloorDiv, &int(2)),
            Err(Error::Operation {
                op: "//",
                left: "complex",
                right: "int"
            })
        ));
    }

    #[test]
    fn test_text_and_containers() {
        let hello = ConcreteValue::text("ab");
        assert_eq!(
            hello.apply(BinaryOp::Add, &"cd".into()).unwrap(),
            "abcd".into()
        );
        assert_eq!(int(3).apply(BinaryOp::Mul, &hello).unwrap(), "ababab".into());

        let seq = ConcreteValue::Sequence(vec![int(1)]);
        assert_eq!(
            seq.apply(BinaryOp::Mul, &int(2)).unwrap(),
            ConcreteValue::Sequence(vec![int(1), int(1)])
        );

        let a = ConcreteValue::set(vec![int(1), int(2)]);
        let b = ConcreteValue::set(vec![int(2), int(3)]);
        assert_eq!(
            a.apply(BinaryOp::BitOr, &b).unwrap(),
            ConcreteValue::set(vec![int(1), int(2), int(3)])
        );
        assert_eq!(
            a.apply(BinaryOp::BitAnd, &b).unwrap(),
            ConcreteValue::set(vec![int(2)])
        );
        assert_eq!(
            a.apply(BinaryOp::BitXor, &b).unwrap(),
            ConcreteValue::set(vec![int(1), int(3)])
        );
    }

    #[test]
    fn test_unsupported_operation() {
        let map = ConcreteValue::mapping(vec![("k".into(), int(1))]);
        assert_eq!(
            map.apply(BinaryOp::Add, &int(1)),
            Err(Error::Operation {
                op: "+",
                left: "dict",
                right: "int"
            })
        );
    }

    #[test]
    fn test_date_arithmetic() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        assert_eq!(
            ConcreteValue::Date(d).apply(BinaryOp::Add, &int(2)).unwrap(),
            ConcreteValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        let later = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(
            ConcreteValue::Date(later)
                .apply(BinaryOp::Sub, &ConcreteValue::Date(d))
                .unwrap(),
            int(11)
        );
        let noon = d.and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(
            ConcreteValue::DateTime(noon)
                .apply(BinaryOp::Add, &ConcreteValue::Float(0.5))
                .unwrap(),
            ConcreteValue::DateTime(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unary() {
        assert_eq!(int(5).apply_unary(UnaryOp::Neg).unwrap(), int(-5));
        assert_eq!(int(5).apply_unary(UnaryOp::Invert).unwrap(), int(-6));
        assert_eq!(
            ConcreteValue::Float(-2.5).apply_unary(UnaryOp::Abs).unwrap(),
            2.5.into()
        );
        assert_eq!(
            ConcreteValue::text("").apply_unary(UnaryOp::Not).unwrap(),
            ConcreteValue::Boolean(true)
        );
        assert!(ConcreteValue::text("x").apply_unary(UnaryOp::Neg).is_err());
    }

    #[test]
    fn test_equality_across_kinds() {
        assert_eq!(int(1), ConcreteValue::Float(1.0));
        assert_eq!(int(1), ConcreteValue::Boolean(true));
        assert_ne!(int(1), ConcreteValue::text("1"));
        assert_eq!(
            ConcreteValue::set(vec![int(1), int(2)]),
            ConcreteValue::set(vec![int(2), int(1)])
        );
        assert_ne!(
            ConcreteValue::Sequence(vec![int(1)]),
            ConcreteValue::Tuple(vec![int(1)])
        );
    }

    #[test]
    fn test_ordering() {
        assert!(int(1).lt(&ConcreteValue::Float(1.5)).unwrap());
        assert!(ConcreteValue::text("b").gt(&"a".into()).unwrap());
        assert!(ConcreteValue::Sequence(vec![int(1), int(2)])
            .lt(&ConcreteValue::Sequence(vec![int(1), int(3)]))
            .unwrap());
        let small = ConcreteValue::set(vec![int(1)]);
        let big = ConcreteValue::set(vec![int(1), int(2)]);
        assert!(small.lt(&big).unwrap());
        assert!(!ConcreteValue::set(vec![int(3)]).lt(&big).unwrap());
        assert!(int(1).lt(&"a".into()).is_err());
    }
}
