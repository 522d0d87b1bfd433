use clap::Parser;
use log::info;
use tokio::sync::watch;

use seabattle::{init_logging, Server, ServerConfig, DEFAULT_PORT};

/// Two-player Sea Battle server.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TCP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let server = Server::new(ServerConfig::with_port(cli.port));
    let listener = server.bind().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down server...");
            let _ = shutdown_tx.send(true);
        }
    });

    server.run(listener, shutdown_rx).await
}
