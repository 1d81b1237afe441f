use anyhow::Result;
use clipvault_api::setup::{initialize_app, start_server};
use clipvault_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let (state, app) = initialize_app(config.clone()).await?;

    start_server(&config, app, state).await
}
