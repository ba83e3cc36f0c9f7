//! Integration test: cached-fetch pipeline against a local HTTP server.
//!
//! Each test serves fixtures from an in-process server, runs the pipeline
//! with the real curl transport and a temporary cache root, and checks rows,
//! cache files and request counts.

mod common;

use common::{shapefile_fixture, static_server};
use puidata_core::table::SheetSelector;
use puidata_core::{
    CsvFormat, Descriptor, ExcelFormat, FetchError, FetchOptions, Pipeline, PipelineError,
    ShapefileFormat, Table, TableFormat, TabularResult,
};
use std::io::{Cursor, Write};
use tempfile::tempdir;

fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn row_count(result: &Option<TabularResult>) -> usize {
    result
        .as_ref()
        .and_then(TabularResult::primary)
        .map(Table::row_count)
        .unwrap_or(0)
}

#[test]
fn csv_over_http_has_one_row_per_data_line() {
    let body = "borough,count\nBronx,12\nBrooklyn,30\nManhattan,27\n";
    let server = static_server::builder().file("counts.csv", body).start();
    let cache = tempdir().unwrap();

    let loaded = Pipeline::new(CsvFormat::default())
        .cached_load(Descriptor::in_cache(cache.path()).with_url(server.url("counts.csv")))
        .unwrap();

    assert_eq!(row_count(&loaded.result), 3);
    assert_eq!(loaded.descriptor.filename(), Some("counts.csv"));
    assert_eq!(
        std::fs::read_to_string(cache.path().join("counts.csv")).unwrap(),
        body
    );
}

#[test]
fn second_cached_load_is_a_pure_cache_read() {
    let server = static_server::builder()
        .file("counts.csv", "a,b\n1,2\n3,4\n")
        .start();
    let cache = tempdir().unwrap();
    let pipeline = Pipeline::new(CsvFormat::default());
    let descriptor = Descriptor::in_cache(cache.path()).with_url(server.url("counts.csv"));

    let first = pipeline.cached_load(descriptor.clone()).unwrap();
    let written = std::fs::metadata(cache.path().join("counts.csv"))
        .unwrap()
        .modified()
        .unwrap();
    let second = pipeline.cached_load(descriptor).unwrap();

    assert_eq!(server.hits("counts.csv"), 1);
    assert_eq!(first.result, second.result);
    assert_eq!(
        std::fs::metadata(cache.path().join("counts.csv"))
            .unwrap()
            .modified()
            .unwrap(),
        written
    );
}

#[test]
fn refresh_goes_back_to_the_server() {
    let server = static_server::builder()
        .file("counts.csv", "a\n1\n")
        .start();
    let cache = tempdir().unwrap();
    let pipeline = Pipeline::new(CsvFormat::default());
    let descriptor = Descriptor::in_cache(cache.path()).with_url(server.url("counts.csv"));

    pipeline.cached_load(descriptor.clone()).unwrap();
    pipeline
        .fetch(descriptor, &FetchOptions::default().refresh(true))
        .unwrap();

    assert_eq!(server.hits("counts.csv"), 2);
}

#[test]
fn query_parameters_are_url_encoded() {
    let server = static_server::builder()
        .file("resource/rows.csv", "id\n1\n")
        .start();
    let cache = tempdir().unwrap();
    let options = FetchOptions::default()
        .with_query("$where", "year > 2010")
        .with_query("$limit", "5");

    Pipeline::new(CsvFormat::default())
        .fetch(
            Descriptor::in_cache(cache.path())
                .with_url(server.url("resource/rows.csv"))
                .with_filename("rows.csv"),
            &options,
        )
        .unwrap();

    assert_eq!(
        server.targets(),
        vec!["/resource/rows.csv?%24where=year+%3E+2010&%24limit=5".to_string()]
    );
}

#[test]
fn zipped_csv_member_is_selected_and_cached_under_its_name() {
    let archive = zip_of(&[
        ("README.txt", b"see data"),
        ("API_SP.POP.TOTL.csv", b"\"Data Source\",\"WDI\"\n\nCountry,1960\nAruba,54208\nAndorra,13414\n"),
    ]);
    let server = static_server::builder().file("population.zip", archive).start();
    let cache = tempdir().unwrap();
    let pipeline = Pipeline::new(CsvFormat::default().with_skip_rows(2));
    let descriptor = Descriptor::in_cache(cache.path())
        .with_url(server.url("population.zip"))
        .with_filename("API_SP.POP.TOTL.csv")
        .archived(true);

    let loaded = pipeline.cached_load(descriptor.clone()).unwrap();
    let again = pipeline.cached_load(descriptor).unwrap();

    assert_eq!(row_count(&loaded.result), 2);
    assert_eq!(loaded.result, again.result);
    assert_eq!(server.hits("population.zip"), 1);
    assert!(cache.path().join("API_SP.POP.TOTL.csv").is_file());
}

#[test]
fn excel_sheet_selection_over_http() {
    let mut teams = Table::new(vec!["Team".into(), "Members".into()]);
    teams
        .push_row(vec!["Red".into(), "Ann".into()])
        .unwrap();
    let mut notes = Table::new(vec!["Note".into()]);
    notes.push_row(vec!["weekly".into()]).unwrap();
    let workbook = ExcelFormat::default()
        .serialize(&TabularResult::Sheets(vec![
            ("Teams".into(), teams),
            ("Notes".into(), notes),
        ]))
        .unwrap()
        .unwrap();
    let server = static_server::builder().file("teams.xlsx", workbook).start();
    let cache = tempdir().unwrap();

    let loaded = Pipeline::new(ExcelFormat::default())
        .cached_load(Descriptor::in_cache(cache.path()).with_url(server.url("teams.xlsx")))
        .unwrap()
        .select_sheet(&SheetSelector::Name("Notes".into()), Some(0))
        .unwrap();

    let table = loaded.result.as_ref().and_then(TabularResult::primary).unwrap();
    assert_eq!(table.columns(), ["Note"]);
    assert!(cache.path().join("teams.xlsx").is_file());
}

#[test]
fn not_found_is_fetch_error_and_nothing_cached() {
    let server = static_server::builder().status("gone.csv", 404).start();
    let cache = tempdir().unwrap();

    let err = Pipeline::new(CsvFormat::default())
        .cached_load(Descriptor::in_cache(cache.path()).with_url(server.url("gone.csv")))
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Fetch(FetchError::Http { code: 404, .. })
    ));
    assert!(!cache.path().join("gone.csv").exists());
}

#[test]
fn refused_connection_is_fetch_error() {
    let cache = tempdir().unwrap();
    let err = Pipeline::new(CsvFormat::default())
        .cached_load(
            Descriptor::in_cache(cache.path()).with_url(static_server::refused_url("x.csv")),
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::Fetch(FetchError::Curl(_))));
}

#[test]
fn corrupt_archive_is_parse_error() {
    let server = static_server::builder()
        .file("bundle.zip", "this is not a zip")
        .start();
    let cache = tempdir().unwrap();
    let err = Pipeline::new(CsvFormat::default())
        .cached_load(
            Descriptor::in_cache(cache.path())
                .with_url(server.url("bundle.zip"))
                .archived(true),
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::Parse { format: "zip", .. }));
}

#[test]
fn shapefile_archive_is_extracted_under_its_stem() {
    let archive = zip_of(&[
        ("MNMapPLUTO.dbf", b"not a real dbf"),
        ("MNMapPLUTO.shp", b"not a real shp"),
        ("MNMapPLUTO.shx", b""),
    ]);
    let server = static_server::builder()
        .file("mn_mappluto_16v2.zip", archive)
        .start();
    let cache = tempdir().unwrap();

    let err = Pipeline::new(ShapefileFormat)
        .cached_load(
            Descriptor::in_cache(cache.path())
                .with_url(server.url("mn_mappluto_16v2.zip"))
                .archived(true),
        )
        .unwrap_err();

    // The members are extracted before parsing; the fixtures themselves are
    // not valid shapefiles.
    assert!(matches!(err, PipelineError::Parse { format: "shapefile", .. }));
    let dir = cache.path().join("mn_mappluto_16v2");
    assert!(dir.join("MNMapPLUTO.shp").is_file());
    assert!(dir.join("MNMapPLUTO.dbf").is_file());
    assert!(dir.join("MNMapPLUTO.shx").is_file());
}

#[test]
fn zipped_shapefile_loads_then_reads_from_extracted_cache() {
    let scratch = tempdir().unwrap();
    let members = shapefile_fixture::write_points(scratch.path(), "parcels");
    let entries: Vec<(&str, &[u8])> = members
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
        .collect();
    let server = static_server::builder()
        .file("parcels.zip", zip_of(&entries))
        .start();
    let cache = tempdir().unwrap();
    let pipeline = Pipeline::new(ShapefileFormat);
    let descriptor = Descriptor::in_cache(cache.path())
        .with_url(server.url("parcels.zip"))
        .with_filename("parcels.shp")
        .archived(true);

    let first = pipeline.cached_load(descriptor.clone()).unwrap();
    let second = pipeline.cached_load(descriptor).unwrap();

    assert_eq!(server.hits("parcels.zip"), 1);
    assert_eq!(first.result, second.result);
    let table = second.result.as_ref().and_then(TabularResult::primary).unwrap();
    assert_eq!(table.columns(), ["name", "units", "geometry"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.cell(1, "name"), Some("250 Broadway"));
    assert_eq!(table.cell(0, "units"), Some("40"));
    assert_eq!(table.cell(0, "geometry"), Some("Point"));
    assert!(cache.path().join("parcels").join("parcels.dbf").is_file());
}
