//! Workbooks: one table per sheet.

use super::TableFormat;
use crate::error::{PipelineError, Result};
use crate::table::{Table, TabularResult};
use calamine::{Data, Range, Reader};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;

const NAME: &str = "xlsx";

/// Sheet name used when a single table is written as a workbook.
const SINGLE_SHEET_NAME: &str = "Sheet1";

/// Excel reader/writer. Reads xlsx, xls, xlsb and ods; writes xlsx.
#[derive(Debug, Clone, Default)]
pub struct ExcelFormat {
    /// Sheets to materialize, in this order. `None` reads every sheet in
    /// workbook order.
    pub sheets: Option<Vec<String>>,
}

impl ExcelFormat {
    pub fn with_sheets<I, S>(mut self, sheets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sheets = Some(sheets.into_iter().map(Into::into).collect());
        self
    }
}

impl TableFormat for ExcelFormat {
    fn name(&self) -> &'static str {
        NAME
    }

    fn extension(&self) -> &str {
        ".xlsx"
    }

    fn parse(&self, bytes: &[u8]) -> Result<TabularResult> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| PipelineError::parse(NAME, e))?;
        let available = workbook.sheet_names();
        let wanted = match &self.sheets {
            Some(sheets) if !sheets.is_empty() => sheets.clone(),
            _ => available.clone(),
        };

        let mut tables = Vec::with_capacity(wanted.len());
        for name in wanted {
            if !available.contains(&name) {
                return Err(PipelineError::parse(
                    NAME,
                    format!("worksheet {:?} not found (have: {})", name, available.join(", ")),
                ));
            }
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| PipelineError::parse(NAME, e))?;
            tables.push((name, range_to_table(&range)));
        }
        Ok(TabularResult::Sheets(tables))
    }

    fn serialize(&self, result: &TabularResult) -> Result<Option<Vec<u8>>> {
        let mut workbook = Workbook::new();
        for (name, table) in result.tables() {
            write_sheet(&mut workbook, name.unwrap_or(SINGLE_SHEET_NAME), table)
                .map_err(|e| PipelineError::serialize(NAME, e))?;
        }
        let bytes = workbook
            .save_to_buffer()
            .map_err(|e| PipelineError::serialize(NAME, e))?;
        Ok(Some(bytes))
    }
}

/// First row is the header; blank header cells get pandas-style
/// `Unnamed: <i>` names so columns stay addressable.
fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("Unnamed: {}", i),
                other => other.to_string(),
            })
            .collect(),
        None => return Table::default(),
    };
    let mut table = Table::new(columns);
    for row in rows {
        // Rows of a range share the header's width.
        let _ = table.push_row(row.iter().map(ToString::to_string).collect());
    }
    table
}

fn write_sheet(
    workbook: &mut Workbook,
    name: &str,
    table: &Table,
) -> std::result::Result<(), String> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name).map_err(|e| format!("sheet {:?}: {}", name, e))?;
    for (c, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(c).map_err(|_| format!("sheet {:?}: too many columns", name))?;
        sheet
            .write_string(0, col, column.as_str())
            .map_err(|e| e.to_string())?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        let row_num =
            u32::try_from(r + 1).map_err(|_| format!("sheet {:?}: too many rows", name))?;
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let col = u16::try_from(c).map_err(|_| format!("sheet {:?}: too many columns", name))?;
            sheet
                .write_string(row_num, col, cell.as_str())
                .map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}
