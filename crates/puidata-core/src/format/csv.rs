//! Delimited text.

use super::TableFormat;
use crate::error::{PipelineError, Result};
use crate::table::{Table, TabularResult};
use std::path::Path;

const NAME: &str = "csv";

/// CSV reader/writer options.
///
/// `skip_rows` and `has_headers` describe the *source*; cache files are
/// always written with a header and read back without skipping.
#[derive(Debug, Clone)]
pub struct CsvFormat {
    pub delimiter: u8,
    /// Raw lines dropped before the header (preamble rows in some exports).
    pub skip_rows: usize,
    /// If false, columns are named `0`, `1`, ... in order.
    pub has_headers: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_rows: 0,
            has_headers: true,
        }
    }
}

impl CsvFormat {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    fn read_table(&self, bytes: &[u8]) -> Result<Table> {
        let data = skip_lines(bytes, self.skip_rows);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        let mut records = reader.records();
        let mut pending = Vec::new();
        let columns: Vec<String> = if self.has_headers {
            match records.next() {
                Some(header) => header
                    .map_err(|e| PipelineError::parse(NAME, e))?
                    .iter()
                    .map(str::to_string)
                    .collect(),
                None => return Err(PipelineError::parse(NAME, "no columns to parse from input")),
            }
        } else {
            for record in records.by_ref() {
                let record = record.map_err(|e| PipelineError::parse(NAME, e))?;
                pending.push(record.iter().map(str::to_string).collect::<Vec<_>>());
            }
            let width = pending.iter().map(Vec::len).max().unwrap_or(0);
            if width == 0 {
                return Err(PipelineError::parse(NAME, "no columns to parse from input"));
            }
            (0..width).map(|i| i.to_string()).collect()
        };

        let width = columns.len();
        let mut table = Table::new(columns);
        let rest = records.map(|r| {
            r.map(|rec| rec.iter().map(str::to_string).collect::<Vec<_>>())
                .map_err(|e| PipelineError::parse(NAME, e))
        });
        for (i, row) in pending.into_iter().map(Ok).chain(rest).enumerate() {
            table.push_row(row?).map_err(|row| {
                PipelineError::parse(
                    NAME,
                    format!(
                        "data row {}: expected {} fields, saw {}",
                        i + 1,
                        width,
                        row.len()
                    ),
                )
            })?;
        }
        Ok(table)
    }
}

impl TableFormat for CsvFormat {
    fn name(&self) -> &'static str {
        NAME
    }

    fn extension(&self) -> &str {
        ".csv"
    }

    fn parse(&self, bytes: &[u8]) -> Result<TabularResult> {
        self.read_table(bytes).map(TabularResult::Table)
    }

    fn parse_cached(&self, path: &Path) -> Result<TabularResult> {
        let cache_format = CsvFormat::default().with_delimiter(self.delimiter);
        cache_format.parse_path(path)
    }

    fn serialize(&self, result: &TabularResult) -> Result<Option<Vec<u8>>> {
        let table = match result {
            TabularResult::Table(t) => t,
            TabularResult::Sheets(sheets) if sheets.len() == 1 => &sheets[0].1,
            TabularResult::Sheets(sheets) => {
                return Err(PipelineError::serialize(
                    NAME,
                    format!("{} sheets cannot share one CSV file; select a sheet first", sheets.len()),
                ))
            }
        };

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        writer
            .write_record(table.columns())
            .map_err(|e| PipelineError::serialize(NAME, e))?;
        for row in table.rows() {
            writer
                .write_record(row)
                .map_err(|e| PipelineError::serialize(NAME, e))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| PipelineError::serialize(NAME, e))?;
        Ok(Some(bytes))
    }
}

/// Drops the first `n` raw lines.
fn skip_lines(bytes: &[u8], n: usize) -> &[u8] {
    let mut rest = bytes;
    for _ in 0..n {
        match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return &rest[rest.len()..],
        }
    }
    rest
}
