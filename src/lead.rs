//! Lead capture.
//!
//! After seeing a quote a visitor can leave contact details to request
//! a formal offer.  The form is forwarded to an external form endpoint
//! as a flat field map tagged with a `lead_id`: the SHA-256 of the
//! canonical JSON of the form plus the submission timestamp, which the
//! receiving side uses to deduplicate repeated submissions.  On success
//! an analytics event is recorded.

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::config::LeadSettings;
use crate::engine::calculate_full_price;
use crate::models::{CalculationResult, LegalForm, UserInput, VatStatus};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{info, warn};

const ACCEPT_FORM_RESPONSE: &str = "application/json, text/javascript, */*; q=0.01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    #[error("failed to encode lead payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("form endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("form endpoint responded with status {status}")]
    Upstream { status: u16 },
}

/// The complete calculator form: the pricing inputs plus contact
/// details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadForm {
    pub bookings_per_month: u64,
    pub employees: u64,
    pub vat_status: VatStatus,
    pub legal_form: LegalForm,
    pub company_name: String,
    pub phone: String,
    pub email: String,
}

impl LeadForm {
    pub fn user_input(&self) -> UserInput {
        UserInput::new(
            self.bookings_per_month,
            self.employees,
            self.vat_status,
            self.legal_form,
        )
    }

    pub fn validate(&self) -> Result<(), LeadError> {
        if self.company_name.trim().is_empty() {
            return Err(LeadError::Validation {
                field: "companyName",
                reason: "must not be empty",
            });
        }
        if self.phone.trim().is_empty() {
            return Err(LeadError::Validation {
                field: "phone",
                reason: "must not be empty",
            });
        }
        if !looks_like_email(self.email.trim()) {
            return Err(LeadError::Validation {
                field: "email",
                reason: "must be an e-mail address",
            });
        }
        Ok(())
    }

    fn to_fields(&self) -> Result<Map<String, Value>, LeadError> {
        object_fields(self)
    }
}

/// Encodes `value` as a flat JSON object.  Anything that does not
/// encode to an object is an error.
fn object_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, LeadError> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(LeadError::Encode(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        )))),
    }
}

fn unix_millis(now: SystemTime) -> u64 {
    now.duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// Returns `value` with all object keys in lexicographic order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Content hash identifying a submission: lowercase hex SHA-256 of the
/// key-sorted compact JSON of the form with `timestamp` added.
pub fn submission_hash(form: &LeadForm, timestamp_ms: u64) -> Result<String, LeadError> {
    let mut fields = form.to_fields()?;
    fields.insert("timestamp".to_string(), Value::from(timestamp_ms));
    let canonical = serde_json::to_string(&sort_keys(Value::Object(fields)))?;
    Ok(hex_encode(&Sha256::digest(canonical.as_bytes())))
}

/// Body posted to the form endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub name: String,
    pub page_id: String,
    pub element_id: String,
    pub source: String,
    pub test: bool,
    pub fields: Map<String, Value>,
    pub dolphin: bool,
}

impl FormSubmission {
    pub fn new(settings: &LeadSettings, form: &LeadForm, lead_id: &str) -> Result<Self, LeadError> {
        let mut fields = form.to_fields()?;
        fields.insert("lead_id".to_string(), Value::from(lead_id));
        Ok(Self {
            name: settings.form_name.clone(),
            page_id: settings.page_id.clone(),
            element_id: settings.element_id.clone(),
            source: settings.source_url.clone(),
            test: settings.test_mode,
            fields,
            dolphin: false,
        })
    }
}

/// HTTP client for the external form endpoint.
#[derive(Debug, Clone)]
pub struct FormClient {
    http: reqwest::Client,
    url: String,
}

impl FormClient {
    pub fn new(form_endpoint: &str, site_id: &str) -> Result<Self, LeadError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: format!("{}/{}", form_endpoint.trim_end_matches('/'), site_id),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn submit(&self, submission: &FormSubmission) -> Result<(), LeadError> {
        let response = self
            .http
            .post(&self.url)
            .header(ACCEPT, ACCEPT_FORM_RESPONSE)
            .json(submission)
            .send()
            .await
            .map_err(|err| {
                warn!(url = %self.url, error = %err, "form submission failed");
                LeadError::Transport(err)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "form endpoint rejected submission");
            return Err(LeadError::Upstream {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Outcome of an accepted lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadReceipt {
    pub lead_id: String,
    pub result: CalculationResult,
}

/// Validates, quotes, forwards and records a lead.
pub struct LeadPipeline {
    client: FormClient,
    settings: LeadSettings,
    analytics: Arc<dyn AnalyticsSink>,
}

impl LeadPipeline {
    /// Returns `Ok(None)` when no site id is configured.
    pub fn from_settings(
        settings: &LeadSettings,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Result<Option<Self>, LeadError> {
        let Some(site_id) = settings.site_id.as_deref() else {
            return Ok(None);
        };
        let client = FormClient::new(&settings.form_endpoint, site_id)?;
        Ok(Some(Self {
            client,
            settings: settings.clone(),
            analytics,
        }))
    }

    pub async fn submit(&self, form: LeadForm) -> Result<LeadReceipt, LeadError> {
        self.submit_at(form, unix_millis(SystemTime::now())).await
    }

    pub async fn submit_at(&self, form: LeadForm, timestamp_ms: u64) -> Result<LeadReceipt, LeadError> {
        form.validate()?;
        let result = calculate_full_price(&form.user_input());
        let lead_id = submission_hash(&form, timestamp_ms)?;
        let submission = FormSubmission::new(&self.settings, &form, &lead_id)?;

        self.client.submit(&submission).await?;
        info!(
            lead_id = %lead_id,
            tier = %result.selected_tier.name,
            monthly_price = %result.monthly_price,
            "lead submitted"
        );

        self.analytics
            .record(&AnalyticsEvent::form_submitted(&lead_id, &form, &result));
        Ok(LeadReceipt { lead_id, result })
    }
}
