//! Column letters and A1-style cell addresses

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Convert a 0-based column index to its letters (0 = A, 25 = Z, 26 = AA, etc.)
///
/// Column letters are bijective base-26: there is no zero digit, so after
/// each letter the remaining quotient is shifted down by one.
///
/// # Examples
/// ```
/// use ourcalc_core::column_name;
///
/// assert_eq!(column_name(0), "A");
/// assert_eq!(column_name(26), "AA");
/// assert_eq!(column_name(702), "AAA");
/// ```
pub fn column_name(index: u32) -> String {
    let mut letters = Vec::new();
    let mut n = i64::from(index);

    while n >= 0 {
        letters.push((b'A' + (n % 26) as u8) as char);
        n = n / 26 - 1;
    }

    letters.iter().rev().collect()
}

/// Convert column letters back to a 0-based index (A = 0, Z = 25, AA = 26, etc.)
///
/// Letters are case-insensitive.
pub fn column_index(name: &str) -> Result<u32> {
    if name.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut col: u64 = 0;
    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
        if col > u64::from(u32::MAX) {
            return Err(Error::ColumnOutOfBounds(u32::MAX, MAX_COLS - 1));
        }
    }

    Ok((col - 1) as u32)
}

/// Check that a coordinate pair fits the grid
pub fn check_bounds(column: u32, row: u32) -> Result<()> {
    if column >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(column, MAX_COLS - 1));
    }
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    Ok(())
}

/// A cell address (e.g., "A1", "$B$2")
///
/// The optional `$` prefix pins an axis: a pinned column or row does not
/// shift when the cell is copied elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Column index (0-based, A=0)
    pub column: u32,
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Whether the column is pinned ($)
    pub column_pinned: bool,
    /// Whether the row is pinned ($)
    pub row_pinned: bool,
}

impl CellAddress {
    /// Create a new address with both axes relative
    pub fn new(column: u32, row: u32) -> Self {
        Self {
            column,
            row,
            column_pinned: false,
            row_pinned: false,
        }
    }

    /// Create an address with explicit pin flags
    pub fn with_pins(column: u32, row: u32, column_pinned: bool, row_pinned: bool) -> Self {
        Self {
            column,
            row,
            column_pinned,
            row_pinned,
        }
    }

    /// Parse an address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use ourcalc_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("$B3").unwrap();
    /// assert_eq!(addr.column, 1);
    /// assert_eq!(addr.row, 2);
    /// assert!(addr.column_pinned);
    /// assert!(!addr.row_pinned);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let column_pinned = if bytes.first() == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        let column = column_index(&s[col_start..pos])?;

        let row_pinned = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let row = row - 1;
        check_bounds(column, row)?;

        Ok(Self {
            column,
            row,
            column_pinned,
            row_pinned,
        })
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = String::new();
        if self.column_pinned {
            result.push('$');
        }
        result.push_str(&column_name(self.column));
        if self.row_pinned {
            result.push('$');
        }
        result.push_str(&(u64::from(self.row) + 1).to_string());
        result
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
