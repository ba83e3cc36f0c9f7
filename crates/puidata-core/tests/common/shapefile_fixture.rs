//! Small but valid shapefiles written with the `shapefile` crate.

use shapefile::dbase::{self, FieldValue, Record};
use std::convert::TryInto;
use std::path::Path;

/// Writes `<stem>.shp`, `.shx` and `.dbf` under `dir` with two point
/// records carrying `name` (character) and `units` (numeric) attributes.
/// Returns (member name, bytes) for each file.
pub fn write_points(dir: &Path, stem: &str) -> Vec<(String, Vec<u8>)> {
    let shp = dir.join(format!("{}.shp", stem));
    let table = dbase::TableWriterBuilder::new()
        .add_character_field("name".try_into().unwrap(), 32)
        .add_numeric_field("units".try_into().unwrap(), 8, 0);
    let mut writer = shapefile::Writer::from_path(&shp, table).unwrap();
    for (name, units, x) in [("1 Centre St", 40.0, 1.0), ("250 Broadway", 12.0, 2.0)] {
        let mut record = Record::default();
        record.insert("name".to_string(), FieldValue::Character(Some(name.to_string())));
        record.insert("units".to_string(), FieldValue::Numeric(Some(units)));
        writer
            .write_shape_and_record(&shapefile::Point::new(x, 0.5), &record)
            .unwrap();
    }
    drop(writer);

    ["shp", "shx", "dbf"]
        .iter()
        .map(|ext| {
            let name = format!("{}.{}", stem, ext);
            let bytes = std::fs::read(dir.join(&name)).unwrap();
            (name, bytes)
        })
        .collect()
}
