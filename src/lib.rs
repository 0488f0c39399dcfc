//! Product catalog + EAN-13 barcodes.
//! - Deterministic 13-digit codes with a valid check digit (`20` internal prefix)
//! - Duplicate-free product list persisted as a JSON array
//! - 1-bit symbol rendering, zoom and PNG download
//! - EPL2 label jobs for Zebra desktop printers (raw Win32 spooler)

pub mod app;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod ean13;
pub mod epl;
pub mod error;
pub mod graphics;
pub mod label;
pub mod printer;
pub mod render;
pub mod store;

pub use app::{App, Command, Outcome};
pub use catalog::{ProductCatalog, ProductName};
pub use config::AppConfig;
pub use ean13::{check_digit, generate_code, normalize_ean13, Ean13};
pub use error::{Error, Result};
pub use label::{build_product_label, LabelOptions};
pub use printer::send_raw_to_printer;
pub use render::{encode_modules, render_barcode, zoom, RenderOptions};
pub use store::{CatalogStore, JsonFileStore, MemoryStore};
