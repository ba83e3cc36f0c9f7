//! CLI command handlers, one per file.

mod bus_info;
mod bus_locations;
mod list;
mod load;

pub use bus_info::run_bus_info;
pub use bus_locations::run_bus_locations;
pub use list::run_list;
pub use load::run_load;
