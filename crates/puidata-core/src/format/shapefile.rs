//! ESRI shapefiles: attribute table plus geometry type.
//!
//! A `.shp` cannot be parsed from a byte stream because its attributes live
//! in the sibling `.dbf` (and index in `.shx`), so the pipeline extracts the
//! archive to disk and parses by path. Cache files are the extracted
//! members themselves; nothing is serialized back.

use super::{InputMode, TableFormat};
use crate::error::{PipelineError, Result};
use crate::table::{Table, TabularResult};
use crate::url_model::file_stem;
use shapefile::dbase::{self, FieldValue};
use std::path::Path;

const NAME: &str = "shapefile";

/// Name of the trailing column holding each record's shape type.
pub const GEOMETRY_COLUMN: &str = "geometry";

#[derive(Debug, Clone, Copy, Default)]
pub struct ShapefileFormat;

impl TableFormat for ShapefileFormat {
    fn name(&self) -> &'static str {
        NAME
    }

    fn extension(&self) -> &str {
        ".shp"
    }

    fn input_mode(&self) -> InputMode {
        InputMode::ExtractedDirectory
    }

    /// Archives are unpacked under a folder named after the archive
    /// (`mn_mappluto_16v2.zip` → `mn_mappluto_16v2/`).
    fn default_subdir(&self, source: &str) -> Option<String> {
        file_stem(source)
    }

    fn parse(&self, _bytes: &[u8]) -> Result<TabularResult> {
        Err(PipelineError::parse(
            NAME,
            "shapefiles are read from a path next to their .dbf/.shx files, not from a stream",
        ))
    }

    fn parse_path(&self, path: &Path) -> Result<TabularResult> {
        let dbf_path = path.with_extension("dbf");
        let fields: Vec<String> = dbase::Reader::from_path(&dbf_path)
            .map_err(|e| PipelineError::parse(NAME, format!("{}: {}", dbf_path.display(), e)))?
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect();

        let mut reader = shapefile::Reader::from_path(path)
            .map_err(|e| PipelineError::parse(NAME, format!("{}: {}", path.display(), e)))?;

        let mut columns = fields.clone();
        columns.push(GEOMETRY_COLUMN.to_string());
        let mut table = Table::new(columns);

        for item in reader.iter_shapes_and_records() {
            let (shape, record) = item.map_err(|e| PipelineError::parse(NAME, e))?;
            let mut row: Vec<String> = fields
                .iter()
                .map(|name| record.get(name).map(field_to_string).unwrap_or_default())
                .collect();
            row.push(format!("{:?}", shape.shapetype()));
            // Row width is fields + geometry by construction.
            let _ = table.push_row(row);
        }
        Ok(TabularResult::Table(table))
    }

    fn serialize(&self, _result: &TabularResult) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Cell text for one attribute. Null values are empty cells; dates are ISO 8601.
fn field_to_string(value: &FieldValue) -> String {
    match value {
        FieldValue::Character(s) => s.clone().unwrap_or_default(),
        FieldValue::Numeric(n) => n.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::Float(f) => f.map(|f| f.to_string()).unwrap_or_default(),
        FieldValue::Logical(b) => b.map(|b| b.to_string()).unwrap_or_default(),
        FieldValue::Date(d) => d.as_ref().map(iso_date).unwrap_or_default(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Currency(c) => c.to_string(),
        FieldValue::Double(d) => d.to_string(),
        FieldValue::DateTime(dt) => {
            let time = dt.time();
            format!(
                "{}T{:02}:{:02}:{:02}",
                iso_date(&dt.date()),
                time.hours(),
                time.minutes(),
                time.seconds()
            )
        }
        FieldValue::Memo(s) => s.clone(),
    }
}

fn iso_date(date: &dbase::Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}
