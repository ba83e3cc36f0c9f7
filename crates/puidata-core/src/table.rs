//! In-memory tables produced by the pipeline.

use std::fmt;

/// Rows of string cells under named columns.
///
/// Column order is first-seen order in the source and row order is source
/// order. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding short rows with empty cells.
    ///
    /// Returns the row back if it is wider than the header.
    pub fn push_row(&mut self, mut row: Vec<String>) -> Result<(), Vec<String>> {
        if row.len() > self.columns.len() {
            return Err(row);
        }
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of the named column, top to bottom.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r[idx].as_str()))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }
}

/// Either one table or a named, ordered collection (one per sheet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabularResult {
    Table(Table),
    Sheets(Vec<(String, Table)>),
}

/// Picks one sheet out of a multi-sheet result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Name(String),
    Index(usize),
}

impl TabularResult {
    /// True iff at least one table has at least one row. A header-only or
    /// empty result is "absent" for caching and short-circuiting.
    pub fn is_present(&self) -> bool {
        self.tables().any(|(_, t)| !t.is_empty())
    }

    /// All tables with their names; a single table is unnamed.
    pub fn tables(&self) -> Box<dyn Iterator<Item = (Option<&str>, &Table)> + '_> {
        match self {
            TabularResult::Table(t) => Box::new(std::iter::once((None, t))),
            TabularResult::Sheets(sheets) => {
                Box::new(sheets.iter().map(|(name, t)| (Some(name.as_str()), t)))
            }
        }
    }

    /// The single table, or the first sheet.
    pub fn primary(&self) -> Option<&Table> {
        match self {
            TabularResult::Table(t) => Some(t),
            TabularResult::Sheets(sheets) => sheets.first().map(|(_, t)| t),
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        match self {
            TabularResult::Table(_) => None,
            TabularResult::Sheets(sheets) => {
                sheets.iter().find(|(n, _)| n == name).map(|(_, t)| t)
            }
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        match self {
            TabularResult::Table(_) => Vec::new(),
            TabularResult::Sheets(sheets) => sheets.iter().map(|(n, _)| n.as_str()).collect(),
        }
    }

    /// Collapses a multi-sheet result to one table.
    ///
    /// A name that does not exist falls back to the index, if one is given
    /// via `fallback`. A single-table result is returned unchanged.
    pub fn into_sheet(
        self,
        selector: &SheetSelector,
        fallback: Option<usize>,
    ) -> Result<TabularResult, TabularResult> {
        let sheets = match self {
            TabularResult::Table(t) => return Ok(TabularResult::Table(t)),
            TabularResult::Sheets(sheets) => sheets,
        };
        let pos = match selector {
            SheetSelector::Name(name) => sheets
                .iter()
                .position(|(n, _)| n == name)
                .or_else(|| fallback.filter(|i| *i < sheets.len())),
            SheetSelector::Index(i) => Some(*i).filter(|i| *i < sheets.len()),
        };
        match pos {
            Some(i) => {
                let mut sheets = sheets;
                Ok(TabularResult::Table(sheets.swap_remove(i).1))
            }
            None => Err(TabularResult::Sheets(sheets)),
        }
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Name(n) => write!(f, "sheet {:?}", n),
            SheetSelector::Index(i) => write!(f, "sheet #{}", i),
        }
    }
}
