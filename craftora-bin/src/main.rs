// The command-line shell around craftora-db. Each subcommand is one of the
// original screens: it reads the session slot, routes on the role and calls
// into the workflow crate; all authorization decisions live there.

use craftora_db::{migrate::run_legacy_migrations, store::Store};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod captcha;
mod commands;
mod config;
mod translate;

use config::Config;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "craftora",
    about = "The Craftora artisan marketplace, from the command line"
)]
struct Opt {
    /// Path to the TOML configuration file.
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opt = Opt::from_args();
    let config = Config::load(opt.config.as_deref())?;

    let store = Store::open(&config.profile)?;
    info!(profile = %config.profile.display(), "store opened");

    // Old profiles may still carry records with scattered ownership fields
    // or numeric ids; normalize them before any screen reads the slots.
    run_legacy_migrations(&store)?;

    commands::run(opt.command, &store, &config).await
}
