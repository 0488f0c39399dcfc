use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use product_barcodes::consts::DEFAULT_CONFIG_PATH;
use product_barcodes::{App, AppConfig, Command, JsonFileStore, Outcome};

/// Product list and EAN-13 barcode tool
#[derive(Parser)]
#[command(name = "barcodes", version, about)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Catalog file (overrides catalog.path)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Log filter, e.g. `info` or `product_barcodes=debug`
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally filtered (case-insensitive)
    List {
        filter: Option<String>,
    },
    /// Add a product
    Add {
        name: String,
    },
    /// Rename a product in place
    Rename {
        from: String,
        to: String,
    },
    /// Delete a product
    Remove {
        name: String,
    },
    /// Print the product's EAN-13 code
    Generate {
        name: String,
    },
    /// Validate a 12- or 13-digit code and show which product it belongs to
    Check {
        code: String,
    },
    /// Save the barcode as `<name>_barcode.png`
    Download {
        name: String,
        /// Output directory (default: download.dir)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Scale to download.zoom_width
        #[arg(long)]
        zoom: bool,
    },
    /// Send an EPL2 label to the configured printer
    Print {
        name: String,
        /// Write the raw job to a file instead
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl From<Commands> for Command {
    fn from(c: Commands) -> Self {
        match c {
            Commands::List { filter } => Command::List { filter },
            Commands::Add { name } => Command::Add { name },
            Commands::Rename { from, to } => Command::Rename { from, to },
            Commands::Remove { name } => Command::Remove { name },
            Commands::Generate { name } => Command::Generate { name },
            Commands::Check { code } => Command::Check { code },
            Commands::Download { name, dir, zoom } => Command::Download { name, dir, zoom },
            Commands::Print { name, output } => Command::Print { name, output },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_level.as_str())
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(path) = cli.catalog {
        config.catalog.path = path;
    }
    tracing::debug!(config = %cli.config.display(), catalog = %config.catalog.path.display(), "starting");

    let store = JsonFileStore::new(config.catalog.path.clone());
    let mut app = App::open(store, config)?;

    match app.handle(cli.command.into())? {
        Outcome::Products(names) => {
            for name in names {
                println!("{name}");
            }
        }
        Outcome::Added(name) => println!("Product added: {name}"),
        Outcome::Renamed { from, to } => println!("Product renamed: {from} -> {to}"),
        Outcome::Removed(name) => println!("Product deleted: {name}"),
        Outcome::Code { code, .. } => println!("{code}"),
        Outcome::Checked { code, product: Some(name) } => println!("{code} valid: {name}"),
        Outcome::Checked { code, product: None } => println!("{code} valid"),
        Outcome::Downloaded { code, path } => println!("{code} -> {}", path.display()),
        Outcome::LabelWritten { code, path } => println!("{code} -> {}", path.display()),
        Outcome::Printed { code, printer, bytes } => {
            println!("{code} -> {printer} ({bytes} bytes)")
        }
    }
    Ok(())
}
