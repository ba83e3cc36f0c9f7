//! `puidata bus-locations` – print active buses on a line.

use crate::cli::bus_args;
use anyhow::Result;
use puidata_core::bus::{self, LocationReport};
use puidata_core::config::PuidataConfig;
use puidata_core::CurlTransport;

pub fn run_bus_locations(cfg: &PuidataConfig, args: &[String]) -> Result<()> {
    let (api_key, line) = bus_args::locations(args)?;
    let api_key = bus::resolve_api_key(api_key.as_deref(), &cfg.bus.api_key_env_var)?;
    let transport = CurlTransport::from_settings(&cfg.http);
    let vehicles = bus::fetch_vehicles(&cfg.bus, &api_key, &line, &transport)?;

    println!();
    print!(
        "{}",
        LocationReport {
            line: &line,
            vehicles: &vehicles,
        }
    );
    Ok(())
}
