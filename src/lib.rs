//! Offer Engine library crate.
//!
//! This crate exposes the tier classifier and price calculator behind
//! the offer calculator, plus the lead-capture and HTTP components
//! built around them.  External applications may depend on the
//! `offer_engine` crate and call [`calculate_full_price`] directly or
//! embed the API via `api::build_router`.

pub mod analytics;
pub mod api;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod lead;
pub mod models;
pub mod telemetry;
pub mod tiers;

pub use classifier::classify;
pub use engine::{calculate_full_price, price, quote, Quote};
pub use models::{CalculationResult, LegalForm, TierName, UserInput, VatStatus};
pub use tiers::{tier_config, tier_table, TierConfig, TierPreview};
