//! `barcodes.toml` loading.
//!
//! Precedence, highest first:
//! 1. CLI arguments
//! 2. environment (`BARCODES_{SECTION}_{FIELD}`, e.g. `BARCODES_LABEL_PRINTER`)
//! 3. the config file
//! 4. built-in defaults
//!
//! ```toml
//! [catalog]
//! path = "products.json"
//!
//! [render]
//! module_width = 2
//! bar_height = 60
//! margin = 10
//! font_size = 18.0
//! show_text = true
//!
//! [download]
//! dir = "."
//! zoom_width = 400
//!
//! [label]
//! printer = "Zebra LP2824"
//! font_path = "fonts/Amiri-Regular.ttf"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{
    DEFAULT_CATALOG_PATH, MAX_BAR_HEIGHT, MAX_MARGIN, MAX_MODULE_WIDTH, MAX_TEXT_PX, MAX_ZOOM_WIDTH,
    ZOOM_WIDTH,
};
use crate::error::{ConfigError, Error};
use crate::label::LabelOptions;
use crate::render::RenderOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub label: LabelOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON file holding the product list
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig { path: PathBuf::from(DEFAULT_CATALOG_PATH) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    #[serde(flatten)]
    pub options: RenderOptions,
    /// Font for the digits under the bars
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub dir: PathBuf,
    pub zoom_width: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        DownloadConfig { dir: PathBuf::from("."), zoom_width: ZOOM_WIDTH }
    }
}

impl AppConfig {
    /// Load `path`, apply env overrides and validate. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path) {
            Ok(config) => config,
            Err(Error::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = %path.display(), "no config file, using defaults");
                AppConfig::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(ConfigError::FileNotFound { path: path.display().to_string() })
            } else {
                Error::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    pub fn parse(toml_str: &str) -> Result<Self, Error> {
        toml::from_str(toml_str)
            .map_err(|e| Error::Config(ConfigError::ParseFailed { reason: e.to_string() }))
    }

    pub fn apply_env_overrides(&mut self) {
        override_path(&mut self.catalog.path, "BARCODES_CATALOG_PATH");

        override_u32(&mut self.render.options.module_width, "BARCODES_RENDER_MODULE_WIDTH");
        override_u32(&mut self.render.options.bar_height, "BARCODES_RENDER_BAR_HEIGHT");
        override_u32(&mut self.render.options.margin, "BARCODES_RENDER_MARGIN");
        override_bool(&mut self.render.options.show_text, "BARCODES_RENDER_SHOW_TEXT");
        override_opt_path(&mut self.render.font_path, "BARCODES_RENDER_FONT_PATH");

        override_path(&mut self.download.dir, "BARCODES_DOWNLOAD_DIR");
        override_u32(&mut self.download.zoom_width, "BARCODES_DOWNLOAD_ZOOM_WIDTH");

        override_opt_string(&mut self.label.printer, "BARCODES_LABEL_PRINTER");
        override_opt_path(&mut self.label.font_path, "BARCODES_LABEL_FONT_PATH");
        override_u8(&mut self.label.darkness, "BARCODES_LABEL_DARKNESS");
        override_u8(&mut self.label.speed, "BARCODES_LABEL_SPEED");
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.catalog.path.as_os_str().is_empty() {
            return Err(invalid("catalog.path", "must not be empty"));
        }

        let r = &self.render.options;
        if !(1..=MAX_MODULE_WIDTH).contains(&r.module_width) {
            return Err(invalid("render.module_width", &format!("must be in 1..={MAX_MODULE_WIDTH}")));
        }
        if !(1..=MAX_BAR_HEIGHT).contains(&r.bar_height) {
            return Err(invalid("render.bar_height", &format!("must be in 1..={MAX_BAR_HEIGHT}")));
        }
        if r.margin > MAX_MARGIN {
            return Err(invalid("render.margin", &format!("must be at most {MAX_MARGIN}")));
        }
        if !(r.font_size > 0.0 && r.font_size <= MAX_TEXT_PX) {
            return Err(invalid("render.font_size", &format!("must be in (0, {MAX_TEXT_PX}]")));
        }

        if !(1..=MAX_ZOOM_WIDTH).contains(&self.download.zoom_width) {
            return Err(invalid("download.zoom_width", &format!("must be in 1..={MAX_ZOOM_WIDTH}")));
        }

        let l = &self.label;
        if l.darkness > 15 {
            return Err(invalid("label.darkness", "must be in 0..=15"));
        }
        if !(1..=6).contains(&l.speed) {
            return Err(invalid("label.speed", "must be in 1..=6"));
        }
        if l.narrow == 0 {
            return Err(invalid("label.narrow", "must be at least 1"));
        }
        if !(l.font_px > 0.0) {
            return Err(invalid("label.font_px", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    ConfigError::InvalidValue { field: field.to_owned(), reason: reason.to_owned() }.into()
}

fn override_path(target: &mut PathBuf, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = PathBuf::from(val);
    }
}

fn override_opt_path(target: &mut Option<PathBuf>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = (!val.is_empty()).then(|| PathBuf::from(val));
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = (!val.is_empty()).then_some(val);
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(env_key, value = val.as_str(), "failed to parse bool from env var, ignoring"),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(env_key, value = val.as_str(), "failed to parse u32 from env var, ignoring"),
        }
    }
}

fn override_u8(target: &mut u8, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u8>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(env_key, value = val.as_str(), "failed to parse u8 from env var, ignoring"),
        }
    }
}
