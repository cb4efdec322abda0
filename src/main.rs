//! gateway-finder main entry point
//!
//! A thin demonstration binary: it calls the two discovery operations and
//! prints the results, exiting non-zero on any error.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gateway_finder::platform::detection;
use gateway_finder::{APP_NAME, VERSION};

/// Cross-platform default-gateway discovery
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version = VERSION, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    info!(
        "{} v{} on {}",
        APP_NAME,
        VERSION,
        detection::current().description()
    );

    if let Err(e) = run() {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize structured logging with tracing
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Call both discovery operations and print the results
fn run() -> anyhow::Result<()> {
    let gateway = gateway_finder::discover_gateway()?;
    println!("gateway: {}", gateway);

    let interface = gateway_finder::discover_interface()?;
    println!("interface: {}", interface);

    Ok(())
}
