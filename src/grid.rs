//! In-memory spreadsheet grid with 1-based `(row, column)` addressing.

use crate::Error;
use chrono::format::{Item, Numeric, StrftimeItems};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt::{self, Write};
use std::str::FromStr;

/// Value held by a single spreadsheet cell
#[derive(Derivative)]
#[derivative(Default)]
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    #[derivative(Default)]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Time(NaiveTime),
    /// Elapsed time, for times of day at or past midnight of the service day (`25:30`)
    Duration(Duration),
    DateTime(NaiveDateTime),
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    /// A cell is empty when it has no value or holds an empty string
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The value rendered as a lookup key, `None` for empty cells
    ///
    /// Whole numbers are rendered without decimals, so that a stop numbered `1001`
    /// gives the same token whether the cell was typed as text or as a number.
    pub fn token(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) if s.is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Time(t) => Some(t.format("%H:%M:%S").to_string()),
            CellValue::Duration(d) => Some(format_duration(d, "%H:%M:%S")),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// True if the cell holds exactly the given text
    pub fn is_text(&self, text: &str) -> bool {
        matches!(self, CellValue::Text(s) if s == text)
    }

    /// Numeric value of number cells and of text cells holding a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Renders a time-like value with the given strftime format
    ///
    /// Values that are not times are passed through as their token.
    pub fn format_time(&self, format: &str) -> String {
        match self {
            CellValue::Time(t) => t.format(format).to_string(),
            CellValue::Duration(d) => format_duration(d, format),
            CellValue::DateTime(dt) => dt.format(format).to_string(),
            other => other.token().unwrap_or_default(),
        }
    }
}

/// Hours are not wrapped at 24, as GTFS expects for trips running past midnight
fn format_duration(duration: &Duration, format: &str) -> String {
    let seconds = duration.num_seconds();
    let mut out = String::new();
    for item in StrftimeItems::new(format) {
        // writing to a String cannot fail
        let _ = match item {
            Item::Literal(s) | Item::Space(s) => write!(out, "{}", s),
            Item::OwnedLiteral(s) | Item::OwnedSpace(s) => write!(out, "{}", s),
            Item::Numeric(Numeric::Hour, _) => write!(out, "{:02}", seconds / 3600),
            Item::Numeric(Numeric::Minute, _) => write!(out, "{:02}", seconds / 60 % 60),
            Item::Numeric(Numeric::Second, _) => write!(out, "{:02}", seconds % 60),
            _ => Ok(()),
        };
    }
    out
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token().unwrap_or_default())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::from(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveTime> for CellValue {
    fn from(t: NaiveTime) -> Self {
        CellValue::Time(t)
    }
}

impl From<Duration> for CellValue {
    fn from(d: Duration) -> Self {
        CellValue::Duration(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

/// A 1-based spreadsheet column, written with letters in configuration files (`"A"`, `"AB"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Column(pub u32);

impl Column {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl TryFrom<String> for Column {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        column_index(&s).map(Column)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", column_name(self.0))
    }
}

/// Converts column letters to a 1-based index (`"A"` is 1, `"AA"` is 27)
pub fn column_index(letters: &str) -> Result<u32, Error> {
    let mk_err = || Error::InvalidColumn(letters.to_owned());
    // XFD, the last excel column, has three letters
    if letters.is_empty() || letters.len() > 3 {
        return Err(mk_err());
    }
    letters.chars().try_fold(0u32, |acc, c| {
        if c.is_ascii_alphabetic() {
            Ok(acc * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
        } else {
            Err(mk_err())
        }
    })
}

/// Converts a 1-based column index to its letters
pub fn column_name(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Position of a cell, parsed from the A1 notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct CellCoord {
    pub row: u32,
    pub column: u32,
}

impl CellCoord {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl FromStr for CellCoord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let mk_err = || Error::InvalidCellReference(s.to_owned());
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(mk_err)?;
        let (letters, digits) = s.split_at(split);
        let column = column_index(letters).map_err(|_| mk_err())?;
        let row: u32 = digits.parse().map_err(|_| mk_err())?;
        if row == 0 {
            return Err(mk_err());
        }
        Ok(Self { row, column })
    }
}

impl TryFrom<String> for CellCoord {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", column_name(self.column), self.row)
    }
}

/// A cell yielded while walking a [Grid]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRef<'a> {
    pub row: u32,
    pub column: u32,
    pub value: &'a CellValue,
}

/// Sparse rectangular grid of cells
///
/// Only non-empty values are stored, but the extents grow with every cell that is set,
/// like the used range of a worksheet.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: HashMap<(u32, u32), CellValue>,
    max_row: u32,
    max_column: u32,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a grid from rows of values, the first value landing in `A1`
    ///
    /// ```
    /// let grid = x2gtfs::Grid::from_rows(vec![vec!["A10", "", "07:00"]]);
    /// assert_eq!(3, grid.max_column());
    /// assert!(grid.cell(1, 2).is_empty());
    /// ```
    pub fn from_rows<R, V>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let mut grid = Self::new();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                grid.set(r as u32 + 1, c as u32 + 1, value);
            }
        }
        grid
    }

    /// Sets the value of a cell, rows and columns start at 1
    pub fn set(&mut self, row: u32, column: u32, value: impl Into<CellValue>) {
        debug_assert!(row > 0 && column > 0, "grid coordinates are 1-based");
        self.max_row = self.max_row.max(row);
        self.max_column = self.max_column.max(column);
        let value = value.into();
        if value.is_empty() {
            self.cells.remove(&(row, column));
        } else {
            self.cells.insert((row, column), value);
        }
    }

    /// Value of a cell, [CellValue::Empty] outside of the grid
    pub fn cell(&self, row: u32, column: u32) -> &CellValue {
        self.cells.get(&(row, column)).unwrap_or(&EMPTY)
    }

    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    pub fn max_column(&self) -> u32 {
        self.max_column
    }
}
