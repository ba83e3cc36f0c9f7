pub mod config;
pub mod logging;

pub mod archive;
pub mod bus;
pub mod cache;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod source;
pub mod table;
pub mod transport;
pub mod url_model;

pub use descriptor::Descriptor;
pub use error::{FetchError, PipelineError, Result};
pub use format::{CsvFormat, ExcelFormat, FormatKind, ShapefileFormat, TableFormat};
pub use pipeline::{FetchOptions, Loaded, Pipeline};
pub use table::{Table, TabularResult};
pub use transport::{CurlTransport, Transport};
