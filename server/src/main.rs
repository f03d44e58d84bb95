use anyhow::{Context, Result};
use clap::Parser;
use server::build_app;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Serve boolean queries over HTTP", long_about = None)]
struct Args {
    /// Index directory holding docs.tsv, dict.tsv and postings.bin
    #[arg(long, default_value = "out_bool/index")]
    index_dir: PathBuf,
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,
    /// Port to bind (0 picks a free one)
    #[arg(long, default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let index_dir = args.index_dir.to_string_lossy().into_owned();
    let app = build_app(index_dir).with_context(|| format!("loading index from {}", args.index_dir.display()))?;

    let listener = TcpListener::bind(SocketAddr::new(args.host, args.port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, index_dir = %args.index_dir.display(), "serving boolean search");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
