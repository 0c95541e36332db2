//! CareerTrack development server.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                  DEV SERVER                   │
//!                      │                                               │
//!   Browser request    │  ┌──────────┐   ┌──────────┐   ┌──────────┐   │
//!   ───────────────────┼─▶│ security │──▶│ routing  │──▶│  pages   │   │
//!                      │  │  hosts   │   │  table   │   │  lazy    │   │
//!                      │  └──────────┘   └────┬─────┘   └────┬─────┘   │
//!                      │                      │ redirect     │ view    │
//!   HTML / 302         │               ┌──────▼──────────────▼─────┐   │
//!   ◀──────────────────┼───────────────│      http response        │   │
//!                      │               └───────────────────────────┘   │
//!                      │                                               │
//!   source files ──────┼─▶ watch (poll/native) ─▶ invalidate ─▶ SSE    │
//!   config file  ──────┼─▶ config watcher ─▶ allowed hosts swap        │
//!                      └───────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use careertrack_devserver::config::{load_config, BundlerConfig, DevConfig};
use careertrack_devserver::lifecycle;
use careertrack_devserver::observability::logging;
use careertrack_devserver::pages::{PageRegistry, PageSource};
use careertrack_devserver::routing::RouteTable;

#[derive(Parser)]
#[command(name = "careertrack-devserver")]
#[command(about = "Development server for the CareerTrack frontend", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Built-in defaults are used when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root that `entry` and `source_dir` are relative to.
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dev server (default)
    Serve,
    /// List routes in evaluation order
    Routes,
    /// Show how a path resolves
    Resolve { path: String },
    /// Print the bundler configuration as JSON
    PrintConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DevConfig::default(),
    };
    logging::init(&config.observability.log_level);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!("careertrack-devserver v{} starting", env!("CARGO_PKG_VERSION"));
            lifecycle::start(config, &cli.root, cli.config.as_deref()).await?;
            tracing::info!("Shutdown complete");
        }
        Commands::Routes => {
            let table = compile_routes(&config, &cli.root)?;
            for route in table.routes() {
                println!("{}", route);
            }
        }
        Commands::Resolve { path } => {
            let table = compile_routes(&config, &cli.root)?;
            let resolution = table.resolve(&path)?;
            for target in &resolution.redirects {
                println!("redirect => {}", target);
            }
            println!("{}", resolution.entry);
            if !resolution.params.is_empty() {
                println!("params: {:?}", resolution.params);
            }
        }
        Commands::PrintConfig => {
            let bundler = BundlerConfig::from(&config);
            println!("{}", serde_json::to_string_pretty(&bundler)?);
        }
    }

    Ok(())
}

fn compile_routes(config: &DevConfig, root: &Path) -> Result<RouteTable, Box<dyn std::error::Error>> {
    let mut pages = PageRegistry::new(PageSource::filesystem(root.join(&config.source_dir)));
    Ok(RouteTable::from_defs(&config.routes, &mut pages)?)
}
