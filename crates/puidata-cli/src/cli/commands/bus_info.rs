//! `puidata bus-info` – save position and next stop of each bus on a line as CSV.

use crate::cli::bus_args;
use anyhow::{Context, Result};
use puidata_core::bus;
use puidata_core::config::PuidataConfig;
use puidata_core::{CsvFormat, CurlTransport, TableFormat, TabularResult};

pub fn run_bus_info(cfg: &PuidataConfig, args: &[String]) -> Result<()> {
    let args = bus_args::info(args)?;
    let api_key = bus::resolve_api_key(args.api_key.as_deref(), &cfg.bus.api_key_env_var)?;
    let transport = CurlTransport::from_settings(&cfg.http);
    let vehicles = bus::fetch_vehicles(&cfg.bus, &api_key, &args.line, &transport)?;

    let table = TabularResult::Table(bus::to_table(&vehicles));
    let bytes = CsvFormat::default()
        .serialize(&table)?
        .context("csv format produced no output")?;
    std::fs::write(&args.output, bytes)
        .with_context(|| format!("write {}", args.output.display()))?;

    println!("Bus information saved to {}.", args.output.display());
    Ok(())
}
