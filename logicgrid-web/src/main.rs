//! LogicGrid Web Server
//!
//! Identity, session and shared-protocol service.

use anyhow::Context;
use clap::Parser;
use logicgrid_core::{init_logging, AppConfig};
use logicgrid_web::LogicGridServerBuilder;
use std::path::PathBuf;
use tracing::info;

/// LogicGrid Web Server - accounts, sessions and shared protocols
#[derive(Parser)]
#[command(name = "logicgrid-web")]
#[command(about = "Identity, session and protocol service for LogicGrid")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Database URL, e.g. sqlite://logicgrid.db
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables before the config layers read them
    dotenvy::dotenv().ok();

    let mut config =
        AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;

    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    let mut builder = LogicGridServerBuilder::with_config(config);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    if let Some(url) = args.database_url {
        builder = builder.database_url(url);
    }

    if args.print_config {
        print!(
            "{}",
            builder
                .config()
                .to_toml()
                .context("failed to render configuration")?
        );
        return Ok(());
    }

    init_logging(&builder.config().logging)
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    let server = builder.build().await.context("failed to build server")?;
    info!("Server initialised");

    server.start().await.context("server terminated")?;
    Ok(())
}
