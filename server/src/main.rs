// server/src/main.rs

// Entry point for the clinic portal server binary.

use anyhow::Result;
use clinic_server::cli::start_cli;
use clinic_server::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so RUST_LOG and the config overrides can come from it.
    dotenv::dotenv().ok();
    init_tracing();

    start_cli().await
}
