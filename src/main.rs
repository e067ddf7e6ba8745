mod api;
mod listing;
mod modes;
mod query;
mod refresh;
mod snapshot;
mod telegram;

use anyhow::Result;
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    modes::run_from_env().await
}
