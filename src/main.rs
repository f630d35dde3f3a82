mod cli;
mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vtterm_core::config::ConfigManager;

use cli::Cli;
use repl::Repl;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let workspace = match args.workspace.clone() {
        Some(path) => path,
        None => std::env::current_dir().context("cannot determine current dir")?,
    };
    let manager = match args.config.as_deref() {
        Some(path) => ConfigManager::load_from_file(path)?,
        None => ConfigManager::load_from_workspace(&workspace)?,
    };
    if let Some(path) = manager.config_path() {
        tracing::debug!(path = %path.display(), "using configuration file");
    }
    let mut config = manager.into_config();
    args.apply_overrides(&mut config);

    let repl = Repl::new(&config, workspace);
    repl.controller().set_plan_mode(args.plan);
    if let Some(session_id) = &args.session_id {
        repl.controller().set_session_id(session_id.clone());
    }

    repl.run().await
}

/// Logs go to stderr so they never interleave with the prompt on stdout
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
