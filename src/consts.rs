// Code generation, rendering and label tuning constants

/// GS1 restricted-circulation prefix; keeps generated codes out of real GTIN ranges.
pub const CODE_PREFIX: &str = "20";
pub const EAN13_LEN: usize = 13;
pub const EAN13_MODULES: u32 = 95;

pub const DEFAULT_PRODUCTS: &[&str] = &[
    "Apple 1kg",
    "Apple 500g",
    "Banana 1kg",
    "Banana 500g",
    "Orange 1kg",
    "Orange 500g",
    "Mango 1kg",
    "Mango 500g",
    "Grapes 1kg",
    "Grapes 500g",
];

pub const DEFAULT_CATALOG_PATH: &str = "products.json";
pub const DEFAULT_CONFIG_PATH: &str = "barcodes.toml";

// Screen/PNG symbol
pub const MODULE_WIDTH: u32 = 2;
pub const BAR_HEIGHT: u32 = 60;
pub const MARGIN: u32 = 10;
pub const TEXT_PX: f32 = 18.0;
pub const ZOOM_WIDTH: u32 = 400;

// Upper bounds for symbol geometry; keeps image sizes well inside u32
pub const MAX_MODULE_WIDTH: u32 = 64;
pub const MAX_BAR_HEIGHT: u32 = 4096;
pub const MAX_MARGIN: u32 = 4096;
pub const MAX_TEXT_PX: f32 = 512.0;
pub const MAX_ZOOM_WIDTH: u32 = 16384;

// EPL2 label (203 dpi)
pub const LABEL_W: u32 = 440;    // dots (≈55 mm)
pub const LABEL_H: u32 = 320;    // dots (≈40 mm)
pub const PAD_RIGHT: u32 = 10;
pub const FONT_PX: f32 = 42.0;
pub const DARKNESS: u8 = 5;      // reduce banding
pub const SPEED: u8 = 3;
pub const NARROW: u32 = 2;       // EAN-13 module width (2–3)
pub const HEIGHT: u32 = 50;      // bar height

pub const INVERT_BITS: bool = true;     // flip GW bits → black text on white
