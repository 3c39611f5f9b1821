//! Tier configuration table.
//!
//! Each service tier has a monthly base price, included booking and
//! employee quotas, and a marginal price per unit beyond each quota.
//! The four configurations are fixed business constants: the table is
//! built once per process and handed out as `&'static` references, so
//! neither the classifier nor the calculator ever copies or rebuilds
//! it.

use crate::models::{CalculationResult, TierName};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::OnceLock;

/// Pricing and service definition of a single tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierConfig {
    pub name: TierName,
    /// Monthly base fee in CHF.
    pub base_price: Decimal,
    /// Bookings per month covered by the base fee.
    pub included_bookings_per_month: u64,
    pub price_per_extra_booking: Decimal,
    /// Employees covered by the base fee.
    pub included_employees: u64,
    pub price_per_extra_employee: Decimal,
    /// Services listed on the package card.
    pub services: Vec<ServiceItem>,
}

/// A line on the package card, with an optional qualifier such as a
/// volume limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceItem {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'static str>,
}

const fn service(title: &'static str, detail: Option<&'static str>) -> ServiceItem {
    ServiceItem { title, detail }
}

static TIER_TABLE: OnceLock<[TierConfig; 4]> = OnceLock::new();

/// All tiers in rank order, STARTER first.
pub fn tier_table() -> &'static [TierConfig; 4] {
    TIER_TABLE.get_or_init(build_table)
}

/// Looks up the configuration for `name`.
pub fn tier_config(name: TierName) -> &'static TierConfig {
    &tier_table()[name.rank()]
}

fn chf(units: i64, cents: i64) -> Decimal {
    Decimal::new(units * 100 + cents, 2)
}

fn build_table() -> [TierConfig; 4] {
    [
        TierConfig {
            name: TierName::Starter,
            base_price: chf(250, 0),
            // Every booking and every employee is charged.
            included_bookings_per_month: 0,
            price_per_extra_booking: chf(6, 0),
            included_employees: 0,
            price_per_extra_employee: chf(49, 50),
            services: vec![
                service("Financial accounting", Some("up to 300 bookings per year")),
                service("VAT return", Some("semi-annual or not liable")),
                service("Annual financial statements", None),
                service("Tax return", None),
                service("Payroll accounting", Some("for up to 2 employees")),
            ],
        },
        TierConfig {
            name: TierName::Smart,
            base_price: chf(500, 0),
            included_bookings_per_month: 25,
            price_per_extra_booking: chf(5, 98),
            included_employees: 2,
            price_per_extra_employee: chf(37, 25),
            services: vec![
                service("Financial accounting", Some("up to 600 bookings per year")),
                service("VAT return", Some("quarterly")),
                service("Annual financial statements", None),
                service("Tax return", None),
                service("Payroll accounting", Some("for up to 6 employees")),
                service("E-mail support", None),
                service("Simple queries", None),
            ],
        },
        TierConfig {
            name: TierName::Comfort,
            base_price: chf(800, 0),
            included_bookings_per_month: 50,
            price_per_extra_booking: chf(5, 0),
            included_employees: 6,
            price_per_extra_employee: chf(62, 25),
            services: vec![
                service("Financial accounting", Some("up to 1200 bookings per year")),
                service("VAT return", Some("quarterly")),
                service("Annual financial statements", None),
                service("Tax return", None),
                service("Payroll accounting", Some("for up to 10 employees")),
                service("E-mail support", None),
                service("Simple queries", None),
                service("Digital receipt processing", Some("2 hours per month included")),
            ],
        },
        TierConfig {
            name: TierName::Premium,
            base_price: chf(1300, 0),
            included_bookings_per_month: 100,
            price_per_extra_booking: chf(5, 0),
            included_employees: 10,
            price_per_extra_employee: chf(75, 0),
            services: vec![
                service("Financial accounting", Some("unlimited")),
                service("VAT return", Some("quarterly")),
                service("Annual financial statements", None),
                service("Tax return", None),
                service("Payroll accounting", Some("for more than 10 employees")),
                service("E-mail support", None),
                service("Simple queries", None),
                service("Digital receipt processing", Some("4 hours per month included")),
            ],
        },
    ]
}

/// What the package card shows.
///
/// Before the first calculation the card renders
/// [`TierPreview::unknown`], a sentinel with neither a tier nor a
/// price.  Afterwards it is built from the latest
/// [`CalculationResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPreview {
    pub tier: Option<TierName>,
    pub services: Vec<ServiceItem>,
    pub monthly_price: Option<Decimal>,
    pub annual_price: Option<Decimal>,
}

impl TierPreview {
    pub fn unknown() -> Self {
        Self {
            tier: None,
            services: Vec::new(),
            monthly_price: None,
            annual_price: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.tier.is_none()
    }
}

impl From<&CalculationResult> for TierPreview {
    fn from(result: &CalculationResult) -> Self {
        Self {
            tier: Some(result.selected_tier.name),
            services: result.selected_tier.services.clone(),
            monthly_price: Some(result.monthly_price),
            annual_price: Some(result.annual_price),
        }
    }
}
