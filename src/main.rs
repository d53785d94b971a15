//! Product API relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                PRODUCT RELAY                 │
//!                      │                                              │
//!   Client Request     │  ┌─────────┐    ┌──────────┐    ┌─────────┐  │
//!   ───────────────────┼─▶│  http   │───▶│ handlers │───▶│ product │──┼───▶ Product
//!                      │  │ server  │    │          │    │ client  │  │     Service
//!                      │  └─────────┘    └────┬─────┘    └────┬────┘  │
//!                      │                      │               │       │
//!   Client Response    │  ┌──────────────┐    │               │       │
//!   ◀──────────────────┼──│ error map /  │◀───┘◀──────────────┘◀──────┼──── Response
//!                      │  │ response     │                            │
//!                      │  └──────────────┘                            │
//!                      │                                              │
//!                      │  config · observability · lifecycle          │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use product_relay::config::{self, RelayConfig};
use product_relay::lifecycle::{signals, Shutdown};
use product_relay::observability::{logging, metrics};
use product_relay::{HttpServer, ProductClient};

#[derive(Parser)]
#[command(name = "product-relay")]
#[command(about = "Relays the product API to the downstream product service", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    /// Override `downstream.base_url`.
    #[arg(long)]
    downstream_url: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut RelayConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(url) = self.downstream_url {
            config.downstream.base_url = url;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    let mut config = match cli.config.take() {
        Some(path) => config::read_config(&path)?,
        None => RelayConfig::default(),
    };
    cli.apply(&mut config);
    config::check_config(&config)?;

    logging::init_logging(&config.observability);
    tracing::info!("product-relay v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let client = ProductClient::new(reqwest::Client::new(), config.downstream.url()?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, client);

    tracing::info!(
        address = %listener.local_addr()?,
        max_json_body = server.config().limits.max_json_body,
        max_upload_size = ?server.config().limits.max_upload_size,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
