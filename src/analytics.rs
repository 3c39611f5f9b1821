//! Analytics events emitted after a lead has been accepted.
//!
//! Sinks are trait objects so the HTTP layer can swap the default
//! tracing sink for a recording one in tests.  Sinks must be
//! thread-safe (`Send + Sync`) because request handlers run on the
//! tokio worker pool.

use crate::lead::LeadForm;
use crate::models::CalculationResult;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Mutex;
use tracing::info;

pub const FORM_SUBMITTED: &str = "form_submitted";
pub const OFFER_REQUEST_FORM: &str = "calculator_offer_request";

/// Conversion event for a submitted offer request.  Values are taken
/// from the server-side quote, not from anything the client sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub event: &'static str,
    pub form_name: &'static str,
    pub lead_id: String,
    pub lead_email: String,
    pub lead_bookings_monthly: u64,
    pub lead_bookings_annual: u64,
    pub lead_value_monthly: Decimal,
    pub lead_value_annual: Decimal,
}

impl AnalyticsEvent {
    pub fn form_submitted(lead_id: &str, form: &LeadForm, result: &CalculationResult) -> Self {
        Self {
            event: FORM_SUBMITTED,
            form_name: OFFER_REQUEST_FORM,
            lead_id: lead_id.to_string(),
            lead_email: form.email.clone(),
            lead_bookings_monthly: form.bookings_per_month,
            lead_bookings_annual: result.annual_bookings,
            lead_value_monthly: result.monthly_price,
            lead_value_annual: result.annual_price,
        }
    }
}

pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: &AnalyticsEvent);
}

/// Writes each event as a structured log line.
#[derive(Debug, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn record(&self, event: &AnalyticsEvent) {
        info!(
            event = event.event,
            form_name = event.form_name,
            lead_id = %event.lead_id,
            lead_bookings_monthly = event.lead_bookings_monthly,
            lead_bookings_annual = event.lead_bookings_annual,
            lead_value_monthly = %event.lead_value_monthly,
            lead_value_annual = %event.lead_value_annual,
            "analytics event"
        );
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AnalyticsSink for RecordingSink {
    fn record(&self, event: &AnalyticsEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::calculate_full_price;
    use crate::models::{LegalForm, VatStatus};
    use std::str::FromStr;

    fn form() -> LeadForm {
        LeadForm {
            bookings_per_month: 40,
            employees: 4,
            vat_status: VatStatus::Effective,
            legal_form: LegalForm::Gmbh,
            company_name: "Muster GmbH".into(),
            phone: "079 123 45 67".into(),
            email: "info@muster.ch".into(),
        }
    }

    #[test]
    fn event_carries_quote_values() {
        let form = form();
        let result = calculate_full_price(&form.user_input());
        let event = AnalyticsEvent::form_submitted("abc", &form, &result);
        assert_eq!(event.event, "form_submitted");
        assert_eq!(event.form_name, "calculator_offer_request");
        assert_eq!(event.lead_bookings_monthly, 40);
        assert_eq!(event.lead_bookings_annual, 480);
        assert_eq!(event.lead_value_monthly, Decimal::from_str("664.20").unwrap());
        assert_eq!(event.lead_value_annual, Decimal::from_str("7970.40").unwrap());
    }

    #[test]
    fn recording_sink_keeps_events_in_order() {
        let form = form();
        let result = calculate_full_price(&form.user_input());
        let sink = RecordingSink::default();
        sink.record(&AnalyticsEvent::form_submitted("first", &form, &result));
        sink.record(&AnalyticsEvent::form_submitted("second", &form, &result));
        let ids: Vec<_> = sink.events().into_iter().map(|e| e.lead_id).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
