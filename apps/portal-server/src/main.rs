//! Configuration portal backend.
//!
//! Resolves the authentication strategy from the active profiles, keeps the
//! tiered server configuration fresh in the background and serves the portal
//! API behind the gateway until interrupted.

mod app;
mod bootstrap;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use authn_resolver::AuthnResolver;
use clap::Parser;
use server_config::spawn_refresh_task;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "portal-server", version, about = "Configuration portal backend")]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Active profiles, comma separated; overrides `authn.profiles`.
    #[arg(long)]
    profiles: Option<String>,

    /// Explicit cluster override for server configuration.
    #[arg(long)]
    cluster: Option<String>,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut AppConfig) {
        if let Some(profiles) = &self.profiles {
            cfg.authn.profiles.clone_from(profiles);
        }
        if let Some(cluster) = &self.cluster {
            cfg.server_config.cluster = Some(cluster.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut cfg);

    if cli.print_config {
        println!("{cfg:#?}");
        return Ok(());
    }

    bootstrap::init_tracing(&cfg.logging)?;
    run(cfg).await
}

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    info!(
        profiles = %cfg.authn.profiles,
        data_center = %cfg.server_config.data_center,
        "Starting portal server"
    );
    let cancel = CancellationToken::new();

    let source = bootstrap::server_config_source(&cfg.server_config, &cfg.seed);
    source
        .refresh()
        .await
        .context("initial server config load failed")?;
    let refresh = spawn_refresh_task(
        Arc::clone(&source),
        cfg.server_config.refresh_interval(),
        cancel.clone(),
    );

    let stores = bootstrap::seed_stores(&cfg);
    let resolver = AuthnResolver::new();
    let bundle = match resolver.init(cfg.authn, &stores.collaborators).await {
        Ok(bundle) => bundle,
        Err(err) => {
            cancel.cancel();
            return Err(err).context("authentication strategy could not be resolved");
        }
    };

    let state = api_gateway::gateway_state(&cfg.gateway, bundle, stores.sessions)?;
    let router = api_gateway::build_router(state, app::app_routes(source));

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
        shutdown.cancel();
    });

    let served = api_gateway::serve(&cfg.gateway, router, cancel.clone()).await;
    cancel.cancel();
    if let Err(e) = refresh.await {
        warn!(error = %e, "Server config refresh task ended abnormally");
    }
    served
}
