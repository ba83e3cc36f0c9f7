//! MTA Bus Time vehicle monitoring.
//!
//! One GET per call against the SIRI endpoint; the response is flattened to
//! a four-column table of vehicle positions and their next stop.

mod siri;

pub use siri::{parse_vehicle_activity, VehicleRecord, NOT_AVAILABLE};

use crate::config::BusSettings;
use crate::error::{PipelineError, Result};
use crate::source::{read_location, Location};
use crate::table::Table;
use crate::transport::Transport;
use std::fmt;
use url::Url;

/// Columns of the flattened vehicle table.
pub const COLUMNS: [&str; 4] = ["Latitude", "Longitude", "Stop Name", "Stop Status"];

/// API key from the command line, else from `env_var`. Empty values count
/// as missing.
pub fn resolve_api_key(explicit: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var(env_var) {
        Ok(key) if !key.is_empty() => {
            tracing::debug!(env_var, "using API key from environment");
            Ok(key)
        }
        _ => Err(PipelineError::MissingCredential {
            env_var: env_var.to_string(),
        }),
    }
}

/// Line identifiers are case-insensitive on the command line (`b52` → `B52`).
pub fn normalize_line(line: &str) -> String {
    line.trim().to_uppercase()
}

/// Query parameters for one vehicle-monitoring request.
pub fn request_query(api_key: &str, line: &str) -> Vec<(String, String)> {
    vec![
        ("key".to_string(), api_key.to_string()),
        ("version".to_string(), "2".to_string()),
        ("LineRef".to_string(), normalize_line(line)),
    ]
}

/// Fetches the active vehicles on `line`.
pub fn fetch_vehicles<T: Transport + ?Sized>(
    settings: &BusSettings,
    api_key: &str,
    line: &str,
    transport: &T,
) -> Result<Vec<VehicleRecord>> {
    let url = Url::parse(&settings.api_url)
        .map_err(|e| PipelineError::parse("url", format!("{}: {}", settings.api_url, e)))?;
    let body = read_location(
        &Location::Remote(url),
        &request_query(api_key, line),
        transport,
    )?;
    let vehicles = parse_vehicle_activity(&body)?;
    tracing::info!(line = %normalize_line(line), count = vehicles.len(), "fetched vehicle activity");
    Ok(vehicles)
}

/// Flattens records into a table with [`COLUMNS`].
pub fn to_table(vehicles: &[VehicleRecord]) -> Table {
    let mut table = Table::new(COLUMNS.iter().map(|c| c.to_string()).collect());
    for v in vehicles {
        // Four cells for four columns.
        let _ = table.push_row(vec![
            v.latitude.clone(),
            v.longitude.clone(),
            v.stop_name.clone(),
            v.stop_status.clone(),
        ]);
    }
    table
}

/// Console summary of active buses on a line.
pub struct LocationReport<'a> {
    pub line: &'a str,
    pub vehicles: &'a [VehicleRecord],
}

impl fmt::Display for LocationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bus Line: {}", self.line)?;
        writeln!(f, "Number of Active Buses: {}", self.vehicles.len())?;
        for (i, v) in self.vehicles.iter().enumerate() {
            writeln!(
                f,
                "Bus {} is at {} latitude and {} longitude",
                i, v.latitude, v.longitude
            )?;
        }
        Ok(())
    }
}
