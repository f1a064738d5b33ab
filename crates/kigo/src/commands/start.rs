//! Start command - launches the Kigo server.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{debug, info};

use kigo_server::{AppState, Server};
use kigo_session::{Manager, ProviderRegistry};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Address to bind to (overrides config)
    #[arg(short, long, env = "KIGO_BIND")]
    pub bind: Option<String>,

    /// Session cookie name (overrides config)
    #[arg(long)]
    pub cookie_name: Option<String>,

    /// Session max lifetime in seconds (overrides config)
    #[arg(long)]
    pub max_lifetime: Option<u64>,
}

/// Run the start command.
///
/// Bootstrap order: config, provider registry, session manager, GC task,
/// then the HTTP server.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let mut config = kigo_config::load_config(ctx.config_path.as_deref())
        .context("failed to load configuration")?;

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(name) = args.cookie_name {
        config.session.cookie_name = name;
    }
    if let Some(secs) = args.max_lifetime {
        config.session.max_lifetime_secs = secs;
    }
    let bind_address = config.server.bind_address()?;

    let registry = ProviderRegistry::with_defaults();
    debug!(providers = ?registry.names(), "Session providers registered");

    let manager = Manager::new(&registry, config.session.manager_config())
        .context("failed to create session manager")?;
    let manager = Arc::new(manager);
    let _gc = manager.spawn_gc();

    info!(
        provider = %config.session.provider,
        cookie = %config.session.cookie_name,
        max_lifetime_secs = config.session.max_lifetime_secs,
        "Session manager ready"
    );
    debug!(?config, "Resolved configuration");

    Server::new(AppState::new(manager), bind_address).run().await?;

    Ok(())
}
