use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use scrollfeed::Config;

#[derive(Parser, Debug)]
struct Args {
    /// Address to bind. Defaults to 0.0.0.0 on `PORT` (3001).
    #[arg(long)]
    address: Option<SocketAddr>,

    /// Database name. Overrides `MONGO_DATABASE`.
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    scrollfeed::init_logging();

    let mut config = Config::load_env_config()?;
    if let Some(database) = args.database {
        config.database = database;
    }
    let address = args
        .address
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], config.port)));

    scrollfeed::serve(config, address).await?;
    Ok(())
}
