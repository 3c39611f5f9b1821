//! HTTP API for the Offer Engine.
//!
//! This module exposes the calculator over a small REST API using the
//! [`axum`](https://crates.io/crates/axum) framework.  The form posts
//! its inputs to `/api/calculate` to get a quote, reads the tier table
//! and the placeholder card before the first calculation, and posts
//! the completed form to `/api/leads` to request an offer.

use crate::analytics::{AnalyticsSink, TracingSink};
use crate::config::{AppConfig, LeadSettings};
use crate::engine::quote;
use crate::error::AppError;
use crate::format::format_chf;
use crate::lead::{LeadError, LeadForm, LeadPipeline, LeadReceipt};
use crate::models::{CalculationResult, LegalForm, UserInput, VatStatus};
use crate::tiers::{tier_table, TierConfig, TierPreview};
use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Application state shared across requests.
pub struct AppState {
    /// `None` when no form site id is configured.
    pub leads: Option<LeadPipeline>,
}

impl AppState {
    pub fn new(settings: &LeadSettings, analytics: Arc<dyn AnalyticsSink>) -> Result<Self, LeadError> {
        Ok(Self {
            leads: LeadPipeline::from_settings(settings, analytics)?,
        })
    }
}

/// Calculator inputs as posted by the form.  Counts are signed so that
/// negative values are clamped rather than rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub bookings_per_month: i64,
    pub employees: i64,
    pub vat_status: VatStatus,
    pub legal_form: LegalForm,
}

impl From<CalculateRequest> for UserInput {
    fn from(req: CalculateRequest) -> Self {
        UserInput::from_signed(req.bookings_per_month, req.employees, req.vat_status, req.legal_form)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceDisplay {
    pub monthly: String,
    pub annual: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub result: CalculationResult,
    pub preview: TierPreview,
    pub display: PriceDisplay,
    /// What selected the tier; `None` for the STARTER default.
    pub trigger: Option<&'static str>,
}

/// Build the API router around the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/tiers", get(tiers_handler))
        .route("/api/preview", get(preview_handler))
        .route("/api/calculate", post(calculate_handler))
        .route("/api/leads", post(lead_handler))
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn tiers_handler() -> Json<&'static [TierConfig; 4]> {
    Json(tier_table())
}

async fn preview_handler() -> Json<TierPreview> {
    Json(TierPreview::unknown())
}

/// Handler for POST /api/calculate
async fn calculate_handler(Json(req): Json<CalculateRequest>) -> Json<QuoteResponse> {
    let input = UserInput::from(req);
    let quoted = quote(&input);
    let trigger = quoted.trigger.map(|rule| rule.description);
    let result = quoted.result;
    Json(QuoteResponse {
        preview: TierPreview::from(&result),
        display: PriceDisplay {
            monthly: format_chf(result.monthly_price),
            annual: format_chf(result.annual_price),
        },
        trigger,
        result,
    })
}

/// Handler for POST /api/leads
async fn lead_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LeadForm>,
) -> Result<(StatusCode, Json<LeadReceipt>), AppError> {
    let pipeline = state.leads.as_ref().ok_or(AppError::LeadsDisabled)?;
    let receipt = pipeline.submit(form).await?;
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

/// Launch the API server.  Binds to the configured address and blocks
/// until the server terminates.
pub async fn serve(config: AppConfig) -> Result<()> {
    let state = AppState::new(&config.leads, Arc::new(TracingSink))?;
    if state.leads.is_none() {
        info!("OFFER_SITE_ID not set, lead submission disabled");
    }
    let router = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
