//! Tesserae CLI
//!
//! Filter option lists and replay interaction scripts against the
//! headless selector components.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tesserae_cn::prelude::*;
use tesserae_core::{Document, PointerEvent, ReactiveContext};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod output;
mod script;

use script::Step;

const DEFAULT_CONFIG: &str = "tesserae.toml";

#[derive(Parser)]
#[command(name = "tesserae")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tesserae selector components CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./tesserae.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the options matching a query
    Filter {
        /// JSON file holding an array of {key, label} objects
        #[arg(short, long)]
        options: PathBuf,

        /// Text to filter by (empty matches everything)
        #[arg(default_value = "")]
        query: String,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drive a combobox with an event script and print each render
    Replay {
        /// JSON file holding an array of {key, label} objects
        #[arg(short, long)]
        options: PathBuf,

        /// Script file, one step per line
        #[arg(short, long)]
        script: PathBuf,

        /// Key selected before the script starts
        #[arg(long)]
        selected: Option<String>,
    },

    /// Flip the search-mode toggle and print it
    Mode {
        /// Number of times to toggle
        #[arg(default_value = "1")]
        flips: u32,
    },

    /// Show version and component information
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Filter {
            options,
            query,
            json,
        } => cmd_filter(&config, &options, &query, json),

        Commands::Replay {
            options,
            script,
            selected,
        } => cmd_replay(&config, &options, &script, selected),

        Commands::Mode { flips } => cmd_mode(&config, flips),

        Commands::Info => cmd_info(),
    }
}

fn load_config(path: Option<&Path>) -> Result<CnConfig> {
    let config = match path {
        Some(path) => CnConfig::load(path)?,
        None => CnConfig::load_or_default(Path::new(DEFAULT_CONFIG))?,
    };
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn load_options(path: &Path) -> Result<ComboboxOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let options = ComboboxOptions::from_json_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!("Loaded {} options from {}", options.len(), path.display());
    Ok(options)
}

fn cmd_filter(config: &CnConfig, options_path: &Path, query: &str, json: bool) -> Result<()> {
    let options = load_options(options_path)?;
    let matches = options.filter(query, config.combobox.match_keys);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("({})", config.combobox.no_matches_text);
    }
    for option in &matches {
        let suffix = if option.disabled { " (disabled)" } else { "" };
        println!("{}\t{}{}", option.key, option.label, suffix);
    }
    Ok(())
}

fn cmd_replay(
    config: &CnConfig,
    options_path: &Path,
    script_path: &Path,
    selected: Option<String>,
) -> Result<()> {
    let options = load_options(options_path)?;
    let source = fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read {}", script_path.display()))?;
    let steps = script::parse_script(&source)
        .with_context(|| format!("Failed to parse {}", script_path.display()))?;

    let ctx = ReactiveContext::new();
    let document = Document::new();
    let selection = ctx.use_state(selected);

    let selection_for_select = selection.clone();
    let mut picker = cn::combobox(&ctx)
        .settings(config.combobox.clone())
        .options(options)
        .on_select(move |key| {
            info!("Selected {}", key);
            selection_for_select.set(Some(key.to_string()));
        })
        .build();
    picker.mount(&document);

    print!("{}", output::render_combobox(&picker.view(selection.get().as_deref())));

    for step in &steps {
        apply_step(&mut picker, &document, step);
        println!("> {}", step);
        print!("{}", output::render_combobox(&picker.view(selection.get().as_deref())));
    }

    match selection.get() {
        Some(key) => println!("selected: {}", key),
        None => println!("selected: (none)"),
    }
    debug!(listeners = document.listener_count(), "replay finished");
    Ok(())
}

fn apply_step(picker: &mut Combobox, document: &Document, step: &Step) {
    match step {
        Step::Focus => picker.focus(),
        Step::Blur => picker.blur(),
        Step::Type(text) => picker.input(text.as_str()),
        Step::Pick(row) => {
            if !picker.pointer_down_row(*row) {
                debug!(row, "press on row committed nothing");
            }
        }
        Step::Click(point) => {
            document.pointer_down(PointerEvent::down(point.x, point.y));
        }
        Step::Key(key) => {
            picker.key_down(*key);
        }
        Step::Bounds(rect) => picker.set_bounds(*rect),
        Step::Mount => picker.mount(document),
        Step::Unmount => picker.unmount(),
    }
}

fn cmd_mode(config: &CnConfig, flips: u32) -> Result<()> {
    let ctx = ReactiveContext::new();
    let toggle: SearchModeToggle = cn::search_mode_toggle(&ctx)
        .initial(config.search_mode.default)
        .on_change(|mode| info!("Search mode is now {}", mode))
        .build();

    for _ in 0..flips {
        toggle.toggle();
    }

    let segments: Vec<String> = toggle
        .view()
        .segments
        .iter()
        .map(|s| {
            if s.active {
                format!("[{}]", s.label)
            } else {
                s.label.to_string()
            }
        })
        .collect();
    println!("{}", segments.join(" | "));
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("Tesserae selector components");
    println!("============================");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Components:");
    println!("  - combobox (filterable single select)");
    println!("  - search mode toggle (exact / semantic)");
    println!();
    println!("Configuration: {} (optional)", DEFAULT_CONFIG);

    Ok(())
}
