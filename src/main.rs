use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use gestured::config::{self as cfg, ConfigPaths, Loader};
use gestured::store::SharedGestureStore;

/// gestured CLI
#[derive(Debug, Parser)]
#[command(
    name = gestured::PKG_NAME,
    version = gestured::PKG_VERSION,
    about = "Loads and hot-reloads the gesture-to-action configuration"
)]
struct Args {
    /// Directory holding the system default configuration
    #[arg(long = "system-config-dir", default_value = cfg::SYSTEM_CONFIG_DIR)]
    system_config_dir: PathBuf,

    /// Use this home directory instead of resolving it from HOME / the account database
    #[arg(long = "home")]
    home: Option<PathBuf>,

    /// Set log level (e.g., trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Load the configuration once, print the records as JSON and exit
    #[arg(long = "print-records")]
    print_records: bool,

    /// Print the JSON Schema of a gesture record and exit
    #[arg(long = "print-schema")]
    print_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    gestured::init_tracing(args.log_level.as_deref());

    if args.print_schema {
        let schema = cfg::generate_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let paths = match args.home {
        Some(home) => ConfigPaths::for_home(home),
        None => ConfigPaths::resolve()?,
    }
    .with_system_config_dir(args.system_config_dir);

    info!(
        version = gestured::PKG_VERSION,
        config = %paths.user_config_file().display(),
        "Starting gestured"
    );

    let store = SharedGestureStore::new();
    let mut loader = Loader::new(paths, store.clone())?;

    if args.print_records {
        let path = loader.config_path().to_path_buf();
        let (records, _) = cfg::load_records(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let count = loader.load()?;
    debug!(records = count, hot_reload = loader.hot_reload_enabled(), "Configuration active");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Received Ctrl+C, shutting down");

    loader.shutdown().await;
    info!("gestured exited");
    Ok(())
}
