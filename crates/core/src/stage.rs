//! Tabular view of a stage's output, handed to a [`crate::store::StageStore`]
//! for materialization.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
}

impl Column {
    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: ColumnType::Integer }
    }

    pub const fn real(name: &'static str) -> Self {
        Self { name, kind: ColumnType::Real }
    }

    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: ColumnType::Text }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

pub type StageRows<'a> = Box<dyn Iterator<Item = Vec<Cell>> + Send + 'a>;

/// A named table whose rows are produced lazily from the stage output it borrows.
pub struct StageTable<'a> {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub rows: StageRows<'a>,
}

impl<'a> StageTable<'a> {
    pub fn new(
        name: &'static str,
        columns: &'static [Column],
        rows: impl Iterator<Item = Vec<Cell>> + Send + 'a,
    ) -> Self {
        Self { name, columns, rows: Box::new(rows) }
    }
}

impl fmt::Debug for StageTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageTable")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}
