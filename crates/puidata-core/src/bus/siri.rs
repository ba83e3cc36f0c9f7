//! SIRI vehicle-monitoring JSON: one flat record per active vehicle.

use crate::error::{PipelineError, Result};
use serde_json::Value;

const NAME: &str = "json";

/// Placeholder for any field missing from the response.
pub const NOT_AVAILABLE: &str = "N/A";

/// Position and next stop of one vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRecord {
    pub latitude: String,
    pub longitude: String,
    pub stop_name: String,
    pub stop_status: String,
}

impl VehicleRecord {
    /// Flattens one `VehicleActivity` entry. Never fails: anything missing
    /// becomes [`NOT_AVAILABLE`].
    pub fn from_activity(activity: &Value) -> Self {
        let journey = activity.get("MonitoredVehicleJourney");
        let field = |pointer: &str| text(journey.and_then(|j| j.pointer(pointer)));
        // StopPointName is a list in SIRI v2 and a bare string in v1.
        let stop_name = match journey.and_then(|j| j.pointer("/MonitoredCall/StopPointName")) {
            Some(Value::Array(names)) => text(names.first()),
            other => text(other),
        };
        Self {
            latitude: field("/VehicleLocation/Latitude"),
            longitude: field("/VehicleLocation/Longitude"),
            stop_name,
            stop_status: field("/MonitoredCall/ArrivalProximityText"),
        }
    }
}

/// Parses a vehicle-monitoring response body.
///
/// A response without `VehicleActivity` is a parse error; the API's own
/// `ErrorCondition` text (bad key, unknown line) is included when present.
pub fn parse_vehicle_activity(body: &[u8]) -> Result<Vec<VehicleRecord>> {
    let doc: Value = serde_json::from_slice(body).map_err(|e| PipelineError::parse(NAME, e))?;
    let delivery = doc.pointer("/Siri/ServiceDelivery/VehicleMonitoringDelivery/0");
    let activity = delivery
        .and_then(|d| d.get("VehicleActivity"))
        .and_then(Value::as_array);
    match activity {
        Some(list) => Ok(list.iter().map(VehicleRecord::from_activity).collect()),
        None => {
            let condition = delivery
                .and_then(|d| d.get("ErrorCondition"))
                .or_else(|| doc.pointer("/Siri/ServiceDelivery/ErrorCondition"));
            let reason = condition.and_then(|c| {
                c.get("Description")
                    .or_else(|| c.pointer("/OtherError/ErrorText"))
                    .and_then(Value::as_str)
            });
            Err(match reason {
                Some(reason) => PipelineError::parse(NAME, format!("no vehicle activity: {}", reason)),
                None => PipelineError::parse(NAME, "no vehicle activity in response"),
            })
        }
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}
