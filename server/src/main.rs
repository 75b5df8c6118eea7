use clap::Parser;
use color_eyre::eyre::{Context, Result};
use log::info;
use tokio::net::TcpListener;

/// In-memory shopping list served as a JSON API.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();
    let addr = format!("{}:{}", opts.host, opts.port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind to {addr}"))?;
    info!("listening on http://{addr}");

    shopping_list_server::run(listener)
        .await
        .wrap_err("server error")
}
