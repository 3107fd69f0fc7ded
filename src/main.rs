//! Sheetcalc - load, edit and evaluate a workbook from the command line

mod config;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::debug;
use sheetcalc_core::storage::write_markdown;
use sheetcalc_core::{CellRef, GridDimensions, Workbook};
use sheetcalc_engine::engine::{evaluate_formula, format_value};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sheetcalc", version, about = "Spreadsheet formula calculator")]
struct Cli {
    /// Workbook file to open (.grd or .json)
    file: Option<PathBuf>,

    /// Set a cell, e.g. `--set A1=10` or `--set "B1==A1*2"` (repeatable)
    #[arg(long = "set", value_name = "LOC=TEXT", allow_hyphen_values = true)]
    set: Vec<String>,

    /// Clear a cell before edits are applied (repeatable)
    #[arg(long = "clear", value_name = "LOC")]
    clear: Vec<String>,

    /// Evaluate a formula against the workbook and print the result
    #[arg(short = 'c', long = "command", value_name = "FORMULA", allow_hyphen_values = true)]
    command: Option<String>,

    /// Export displayed values to a markdown file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Save the workbook (.grd or .json)
    #[arg(long = "save", value_name = "FILE")]
    save: Option<PathBuf>,

    /// Read settings from this file instead of the user config
    #[arg(long = "config", value_name = "PATH", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore config files and use built-in defaults
    #[arg(long = "no-config")]
    no_config: bool,

    /// Number of columns (overrides config)
    #[arg(long = "columns", value_name = "N")]
    columns: Option<usize>,

    /// Number of rows (overrides config)
    #[arg(long = "rows", value_name = "N")]
    rows: Option<usize>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let (config, warnings) = if cli.no_config {
        (config::Config::default(), Vec::new())
    } else {
        config::load_config(cli.config.as_deref())
    };
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let dimensions = GridDimensions::new(
        cli.columns.unwrap_or(config.dimensions.columns),
        cli.rows.unwrap_or(config.dimensions.rows),
    )?;
    debug!("grid is {} x {}", dimensions.columns, dimensions.rows);

    let mut workbook = Workbook::with_file(cli.file.clone(), dimensions)
        .with_context(|| match &cli.file {
            Some(path) => format!("Failed to open {}", path.display()),
            None => "Failed to create workbook".to_string(),
        })?;
    if cli.file.is_none() {
        workbook.rename(&config.name);
        workbook.modified = false;
    }

    for name in &cli.clear {
        let cell_ref = parse_location(name)?;
        workbook
            .reset_cell(&cell_ref)
            .with_context(|| format!("Failed to clear {}", name))?;
    }
    for edit in &cli.set {
        let Some((name, text)) = edit.split_once('=') else {
            bail!("Expected LOC=TEXT, got '{}'", edit);
        };
        let cell_ref = parse_location(name.trim())?;
        workbook
            .set_formula(&cell_ref, text)
            .with_context(|| format!("Failed to set {}", name.trim()))?;
    }

    if let Some(path) = &cli.save {
        workbook
            .save_as(path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }

    if let Some(formula) = &cli.command {
        let formula = if formula.starts_with('=') {
            formula.clone()
        } else {
            format!("={}", formula)
        };
        let value = evaluate_formula(&formula, workbook.grid())
            .with_context(|| format!("Failed to evaluate {}", formula))?;
        println!("{}", format_value(&value));
    }

    if let Some(path) = &cli.output {
        write_markdown(path, &workbook)
            .with_context(|| format!("Failed to export {}", path.display()))?;
        println!("Exported to {}", path.display());
    }

    if cli.command.is_none() && cli.output.is_none() {
        print_cells(&workbook)?;
    }

    Ok(())
}

fn parse_location(name: &str) -> Result<CellRef> {
    CellRef::from_str(name).with_context(|| format!("Invalid cell reference: {}", name))
}

fn print_cells(workbook: &Workbook) -> Result<()> {
    for cell in workbook.cells().filter(|cell| !cell.is_blank()) {
        let display = workbook.display_value(&cell.location)?;
        if cell.valid {
            println!("{}\t{}", cell.location, display);
        } else {
            println!("{}\t{} (cycle)", cell.location, display);
        }
    }
    Ok(())
}
