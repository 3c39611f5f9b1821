//! Entry point for the Offer Engine binary.
//!
//! Running this binary starts the HTTP server behind the offer
//! calculator.  Configuration is read from `OFFER_*` environment
//! variables (optionally via a `.env` file); see `config.rs` for the
//! full list and defaults.

use offer_engine::config::AppConfig;
use offer_engine::{api, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    api::serve(config).await
}
