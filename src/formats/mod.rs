// Output formats for decoded fields
pub mod csv;
pub mod dict;
pub mod text;

pub use csv::{export_csv, write_csv, CsvError};
pub use dict::{to_dict, to_json, to_ordered};
pub use text::{format_raw, parse_address, render_registry};
