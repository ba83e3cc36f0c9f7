//! `puidata load` – run the cached pipeline for one resource and summarize it.

use crate::cli::LoadArgs;
use anyhow::{Context, Result};
use puidata_core::config::PuidataConfig;
use puidata_core::table::{SheetSelector, Table};
use puidata_core::{
    CsvFormat, CurlTransport, Descriptor, ExcelFormat, FetchOptions, FormatKind, Loaded,
    Pipeline, ShapefileFormat, TableFormat,
};
use std::path::Path;

/// Columns shown in the summary before eliding the rest.
const MAX_COLUMNS_SHOWN: usize = 8;

pub fn run_load(cfg: &PuidataConfig, cache_root: &Path, args: &LoadArgs) -> Result<()> {
    let pipeline = Pipeline::with_transport(
        build_format(args),
        CurlTransport::from_settings(&cfg.http),
    );
    let descriptor = build_descriptor(cache_root, args);
    let options = FetchOptions {
        query: args.query.clone(),
        refresh: args.refresh,
        skip_save: args.no_save,
    };

    let source = args
        .url
        .clone()
        .or_else(|| args.filename.clone())
        .unwrap_or_default();
    let mut loaded = pipeline
        .fetch(descriptor, &options)
        .with_context(|| format!("load {}", source))?;
    if let Some(sheet) = &args.select_sheet {
        loaded = loaded.select_sheet(&SheetSelector::Name(sheet.clone()), sheet.parse().ok())?;
    }

    print_summary(&loaded, args.head);
    Ok(())
}

fn build_format(args: &LoadArgs) -> Box<dyn TableFormat> {
    match args.format {
        FormatKind::Csv => Box::new(
            CsvFormat::default()
                .with_delimiter(args.delimiter)
                .with_skip_rows(args.skip_rows)
                .with_headers(!args.no_header),
        ),
        FormatKind::Excel if args.sheets.is_empty() => Box::new(ExcelFormat::default()),
        FormatKind::Excel => Box::new(ExcelFormat::default().with_sheets(args.sheets.clone())),
        FormatKind::Shapefile => Box::new(ShapefileFormat),
    }
}

fn build_descriptor(cache_root: &Path, args: &LoadArgs) -> Descriptor {
    let mut descriptor = Descriptor::in_cache(cache_root).archived(args.archived);
    if let Some(url) = &args.url {
        descriptor = descriptor.with_url(url.as_str());
    }
    if let Some(filename) = &args.filename {
        descriptor = descriptor.with_filename(filename.as_str());
    }
    if let Some(subdir) = &args.subdir {
        descriptor = descriptor.with_subdir(subdir.as_str());
    }
    if let Some(index) = args.member_index {
        descriptor = descriptor.with_member_index(index);
    }
    descriptor
}

fn print_summary(loaded: &Loaded, head: usize) {
    let Some(result) = &loaded.result else {
        println!("No data.");
        return;
    };
    for (name, table) in result.tables() {
        match name {
            Some(name) => println!("[{}] {} rows", name, table.row_count()),
            None => println!("{} rows", table.row_count()),
        }
        print_table(table, head);
    }
    if let Some(filename) = loaded.descriptor.filename() {
        println!("cache: {}", loaded.descriptor.cache_dir().join(filename).display());
    }
}

fn print_table(table: &Table, head: usize) {
    let shown = table.columns().len().min(MAX_COLUMNS_SHOWN);
    let mut header = table.columns()[..shown].join("\t");
    if shown < table.columns().len() {
        header.push_str(&format!("\t... (+{} columns)", table.columns().len() - shown));
    }
    println!("{}", header);
    for row in table.rows().iter().take(head) {
        println!("{}", row[..shown].join("\t"));
    }
}
