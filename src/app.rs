//! Command handler.
//!
//! Each user action is a [`Command`]. [`App::handle`] validates it, applies it
//! to the catalog, persists mutations through the [`CatalogStore`] and returns
//! an [`Outcome`] for the front end to present. Failed mutations are neither
//! applied nor saved.

use std::path::PathBuf;

use rusttype::Font;
use tracing::{debug, info};

use crate::catalog::{ProductCatalog, ProductName};
use crate::config::AppConfig;
use crate::ean13::{generate_code, normalize_ean13, Ean13};
use crate::error::{CatalogError, Error, InvalidInput, PrintError, Result};
use crate::graphics::load_font;
use crate::label::build_product_label;
use crate::printer::send_raw_to_printer;
use crate::render::{download_file_name, render_barcode, save_png, zoom};
use crate::store::CatalogStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { filter: Option<String> },
    Add { name: String },
    Rename { from: String, to: String },
    Remove { name: String },
    Generate { name: String },
    /// Validate a scanned or typed code; 12 digits get their check digit
    Check { code: String },
    /// PNG of the symbol; `dir` defaults to the configured download dir
    Download { name: String, dir: Option<PathBuf>, zoom: bool },
    /// EPL2 job to `output` if set, otherwise to the configured printer
    Print { name: String, output: Option<PathBuf> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Products(Vec<ProductName>),
    Added(ProductName),
    Renamed { from: String, to: ProductName },
    Removed(ProductName),
    Code { product: ProductName, code: Ean13 },
    Checked { code: Ean13, product: Option<ProductName> },
    Downloaded { code: Ean13, path: PathBuf },
    LabelWritten { code: Ean13, path: PathBuf },
    Printed { code: Ean13, printer: String, bytes: usize },
}

pub struct App<S: CatalogStore> {
    store: S,
    catalog: ProductCatalog,
    config: AppConfig,
}

impl<S: CatalogStore> App<S> {
    /// Load the catalog once from `store` (defaults if nothing is stored).
    pub fn open(store: S, config: AppConfig) -> Result<Self> {
        let catalog = ProductCatalog::open(&store)?;
        info!(products = catalog.len(), "catalog ready");
        Ok(App { store, catalog, config })
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn handle(&mut self, command: Command) -> Result<Outcome> {
        debug!(?command, "handling command");
        match command {
            Command::List { filter } => {
                let names = self
                    .catalog
                    .search(filter.as_deref().unwrap_or(""))
                    .into_iter()
                    .cloned()
                    .collect();
                Ok(Outcome::Products(names))
            }
            Command::Add { name } => {
                let added = self.mutate(|c| c.add(&name).cloned())?;
                info!(product = %added, "product added");
                Ok(Outcome::Added(added))
            }
            Command::Rename { from, to } => {
                let renamed = self.mutate(|c| c.rename(&from, &to).cloned())?;
                info!(from = %from, to = %renamed, "product renamed");
                Ok(Outcome::Renamed { from, to: renamed })
            }
            Command::Remove { name } => {
                let removed = self.mutate(|c| c.remove(&name))?;
                info!(product = %removed, "product removed");
                Ok(Outcome::Removed(removed))
            }
            Command::Generate { name } => {
                let product = self.select(&name)?;
                let code = generate_code(&product);
                Ok(Outcome::Code { product, code })
            }
            Command::Check { code } => {
                let code = normalize_ean13(&code)?;
                // reverse lookup over the catalog
                let product = self
                    .catalog
                    .names()
                    .iter()
                    .find(|n| generate_code(n) == code)
                    .cloned();
                debug!(code = %code, known = product.is_some(), "code checked");
                Ok(Outcome::Checked { code, product })
            }
            Command::Download { name, dir, zoom: zoomed } => {
                let product = self.select(&name)?;
                let code = generate_code(&product);
                let font = load_optional_font(self.config.render.font_path.as_ref())?;

                let mut img = render_barcode(&code, &self.config.render.options, font.as_ref());
                if zoomed {
                    img = zoom(&img, self.config.download.zoom_width);
                }

                let dir = dir.unwrap_or_else(|| self.config.download.dir.clone());
                std::fs::create_dir_all(&dir)?;
                let path = dir.join(download_file_name(product.as_str()));
                save_png(&img, &path)?;
                info!(product = %product, code = %code, path = %path.display(), "barcode downloaded");
                Ok(Outcome::Downloaded { code, path })
            }
            Command::Print { name, output } => {
                let product = self.select(&name)?;
                let code = generate_code(&product);
                let font = load_optional_font(self.config.label.font_path.as_ref())?;
                let job = build_product_label(&product, &code, &self.config.label, font.as_ref());

                if let Some(path) = output {
                    std::fs::write(&path, &job)?;
                    info!(product = %product, path = %path.display(), "label job written");
                    return Ok(Outcome::LabelWritten { code, path });
                }

                let printer = self.config.label.printer.clone().ok_or(PrintError::NoPrinter)?;
                send_raw_to_printer(&printer, &job)?;
                info!(product = %product, printer = %printer, "label printed");
                Ok(Outcome::Printed { code, printer, bytes: job.len() })
            }
        }
    }

    /// Apply `op` to a copy, save it, then swap it in.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut ProductCatalog) -> std::result::Result<T, CatalogError>,
    ) -> Result<T> {
        let mut next = self.catalog.clone();
        let value = op(&mut next)?;
        self.store.save(next.names())?;
        self.catalog = next;
        Ok(value)
    }

    /// The generator is only called with a product that is in the catalog.
    fn select(&self, name: &str) -> Result<ProductName> {
        if name.trim().is_empty() {
            return Err(InvalidInput::NO_SELECTION.into());
        }
        self.catalog
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Catalog(CatalogError::NotFound(name.to_string())))
    }
}

fn load_optional_font(path: Option<&PathBuf>) -> Result<Option<Font<'static>>> {
    path.map(|p| load_font(p)).transpose().map_err(Error::from)
}
