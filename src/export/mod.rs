pub mod json;

pub use json::{ExportError, ItemExport, export_json_to_path, import_json};
