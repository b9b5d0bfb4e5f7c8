//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tabby_core::TabbyLoader;
use tabby_shared::{LoadConfig, SheetMode, init_config, load_config, render_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// tabby: assemble records from tabby sheet directories.
#[derive(Parser)]
#[command(
    name = "tabby",
    version,
    about = "Assemble JSON(-LD) records from tabby TSV sheets and their companion files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load a sheet and print the assembled record.
    Load {
        /// Path to the primary TSV sheet.
        src: PathBuf,

        /// Treat the sheet as one record per row.
        #[arg(long)]
        many: bool,

        /// Class root to search for `<name>@<class>` files (repeatable,
        /// searched before configured class paths).
        #[arg(long = "class-path", env = "TABBY_CLASS_PATH", value_delimiter = ',')]
        class_paths: Vec<PathBuf>,

        /// Do not attach JSON-LD contexts.
        #[arg(long)]
        no_jsonld: bool,

        /// Do not follow sheet imports.
        #[arg(long)]
        no_recursive: bool,

        /// Print single-line JSON.
        #[arg(long)]
        compact: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default config file to `~/.tabby/tabby.toml`.
    Init,
    /// Print the effective configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tabby=info",
        1 => "tabby=debug",
        _ => "tabby=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Load {
            src,
            many,
            class_paths,
            no_jsonld,
            no_recursive,
            compact,
        } => {
            let mut config = LoadConfig::from(&load_config()?).with_leading_class_paths(class_paths);
            config.jsonld &= !no_jsonld;
            config.recursive &= !no_recursive;
            let mode = if many { SheetMode::Many } else { SheetMode::Single };
            cmd_load(&src, mode, &config, compact)
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn cmd_load(src: &Path, mode: SheetMode, config: &LoadConfig, compact: bool) -> Result<()> {
    info!(
        src = %src.display(),
        ?mode,
        class_paths = config.class_paths.len(),
        "loading tabby record"
    );

    let value = TabbyLoader::new(config)
        .load(src, mode)
        .wrap_err_with(|| format!("failed to load {}", src.display()))?;

    let out = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{out}");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("{}", render_config(&config)?);
    Ok(())
}
