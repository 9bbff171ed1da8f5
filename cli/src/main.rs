//! CapyFlows CLI - owns one persisted client store and applies a single action to it.
//!
//! ```text
//! main() -> resolve data dir -> FileStorage::open -> Store::new (rehydrate)
//!                                                        |
//!                                                        v
//!                                         action -> write-through -> print snapshot
//! ```
//!
//! Logs go to stderr (filtered by `RUST_LOG`), the resulting snapshot to stdout.

use std::io::{Write, stderr, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use capyflows_config::{CapyConfig, resolve_data_dir};
use capyflows_store::{Address, AppState, FileStorage, Hydration, ProfileInput, Store};
use capyflows_types::{LAUNCH_ROUTE, SITE};

#[derive(Debug, Parser)]
#[command(name = "capyflows")]
#[command(about = "Inspect and update the persisted CapyFlows profile and token")]
struct Args {
    /// Directory holding the persisted state (overrides CAPYFLOWS_DATA_DIR and config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current state
    Show,
    /// Connect a profile (name and account address are set together)
    SetProfile { name: String, id: String },
    /// Disconnect the current profile
    ClearProfile,
    /// Select the active token
    SetToken { address: String },
    /// Delete the persisted slot; the next run starts from defaults
    ClearStorage,
    /// Print the site metadata
    Metadata,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(stderr),
        )
        .with(env_filter)
        .init();
}

#[derive(Serialize)]
struct SiteReport {
    title: &'static str,
    description: &'static str,
    base_url: &'static str,
    icon: String,
    open_graph_image: String,
    launch: String,
}

fn site_report() -> Result<SiteReport> {
    Ok(SiteReport {
        title: SITE.title,
        description: SITE.description,
        base_url: SITE.base_url,
        icon: SITE.icon_url()?.to_string(),
        open_graph_image: SITE.open_graph_image_url()?.to_string(),
        launch: SITE
            .launch_url()
            .with_context(|| format!("resolving {LAUNCH_ROUTE}"))?
            .to_string(),
    })
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let mut out = stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn warn_if_malformed(what: &str, address: &Address) {
    if let Err(e) = address.validate() {
        tracing::warn!(%address, "{what} does not look like an address: {e}");
    }
}

fn open_store(data_dir: Option<PathBuf>) -> Result<Store<FileStorage>> {
    let config = CapyConfig::load()?;
    let dir = resolve_data_dir(data_dir, config.as_ref())
        .context("no data directory: pass --data-dir or set CAPYFLOWS_DATA_DIR")?;
    let storage = FileStorage::open(&dir)?;
    let store = Store::new(storage);

    match store.hydration() {
        Hydration::Restored | Hydration::Fresh => {}
        other => tracing::info!(path = %dir.display(), ?other, "Started from default state"),
    }
    Ok(store)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if let Command::Metadata = args.command {
        return print_json(&site_report()?);
    }

    let mut store = open_store(args.data_dir)?;
    match args.command {
        Command::Show | Command::Metadata => {}
        Command::SetProfile { name, id } => {
            let id = Address::from(id);
            warn_if_malformed("profile id", &id);
            store.set_current_profile(ProfileInput { name, id });
        }
        Command::ClearProfile => store.clear_current_profile(),
        Command::SetToken { address } => {
            let token = Address::from(address);
            warn_if_malformed("token", &token);
            store.set_token(token);
        }
        Command::ClearStorage => {
            store.clear_storage();
            return print_json(&AppState::default());
        }
    }

    print_json(&*store.state())
}
