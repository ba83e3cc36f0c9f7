//! CLI for the puidata cached loader and bus tracking tools.

mod bus_args;
mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use puidata_core::config::PuidataConfig;
use puidata_core::FormatKind;
use std::path::PathBuf;

use commands::{run_bus_info, run_bus_locations, run_list, run_load};

/// Top-level CLI for puidata.
#[derive(Debug, Parser)]
#[command(name = "puidata")]
#[command(about = "Cached loader for CSV, Excel and shapefile data, plus MTA bus tracking", long_about = None)]
pub struct Cli {
    /// Cache directory; overrides the environment variable and config file.
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Load a table through the cache, downloading it on a miss.
    Load(LoadArgs),

    /// List cached files of one format.
    List {
        /// csv, xlsx or shp.
        #[arg(long, default_value = "csv", value_name = "FORMAT")]
        format: FormatKind,
        /// Print absolute paths instead of paths relative to the cache.
        #[arg(long)]
        full_path: bool,
    },

    /// Print the number of active buses on a line and where each one is.
    BusLocations {
        /// `[KEY] LINE`. The key defaults to the configured environment variable.
        #[arg(value_name = "ARGS", num_args = 1..=2, required = true)]
        args: Vec<String>,
    },

    /// Save position and next stop of every active bus on a line as CSV.
    BusInfo {
        /// `[KEY] LINE [OUTPUT]`. Output defaults to `<LINE>.csv`.
        #[arg(value_name = "ARGS", num_args = 1..=3, required = true)]
        args: Vec<String>,
    },
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// csv, xlsx or shp.
    #[arg(long, default_value = "csv", value_name = "FORMAT")]
    pub format: FormatKind,

    /// Remote URL or local path. Without it, only the cache is read.
    #[arg(long)]
    pub url: Option<String>,

    /// Cache filename; also picks the member out of an archive.
    #[arg(long)]
    pub filename: Option<String>,

    /// Folder under the cache directory.
    #[arg(long)]
    pub subdir: Option<String>,

    /// Source is a zip archive.
    #[arg(long)]
    pub archived: bool,

    /// Archive member to use when --filename does not name one (0-based).
    #[arg(long, value_name = "N")]
    pub member_index: Option<usize>,

    /// CSV field delimiter (a single character, or `tab`).
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// CSV lines to drop before the header.
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub skip_rows: usize,

    /// CSV has no header line; columns are numbered.
    #[arg(long)]
    pub no_header: bool,

    /// Workbook sheet to read (repeatable). Default: all sheets.
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheets: Vec<String>,

    /// Keep only this sheet, by name or else by 0-based index.
    #[arg(long, value_name = "SHEET")]
    pub select_sheet: Option<String>,

    /// Ignore the cache and download again, overwriting the cache entry.
    #[arg(long)]
    pub refresh: bool,

    /// Do not write the cache entry.
    #[arg(long)]
    pub no_save: bool,

    /// Query parameter added to the URL (repeatable).
    #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,

    /// Data rows to print per table.
    #[arg(long, default_value_t = 5, value_name = "N")]
    pub head: usize,
}

fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got {:?}", s)),
        },
    }
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    if key.is_empty() {
        return Err(format!("empty key in {:?}", s));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    /// Dispatches the parsed command. Logging is already installed from `cfg`.
    pub fn run(self, cfg: &PuidataConfig) -> Result<()> {
        tracing::debug!("loaded config: {:?}", cfg);
        let cache_root = self
            .cache_dir
            .clone()
            .unwrap_or_else(|| cfg.cache.resolve_root());

        match self.command {
            CliCommand::Load(args) => run_load(cfg, &cache_root, &args)?,
            CliCommand::List { format, full_path } => run_list(&cache_root, format, full_path)?,
            CliCommand::BusLocations { args } => run_bus_locations(cfg, &args)?,
            CliCommand::BusInfo { args } => run_bus_info(cfg, &args)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
