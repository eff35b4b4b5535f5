pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod polars_utils;

pub use csv_table::{CsvTable, read_csv_table};
pub use discovery::{discover_domain_files, list_csv_files};
pub use error::{IngestError, Result};
pub use polars_utils::{any_to_f64, any_to_string, format_numeric, parse_f64};
