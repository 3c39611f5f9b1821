//! Data models for the Offer Engine.
//!
//! The `models` module defines the serialisable records exchanged
//! between the calculator form and the engine: the business metrics a
//! visitor enters ([`UserInput`]), the categorical answers it contains
//! ([`VatStatus`], [`LegalForm`]), the service tier names and the
//! itemised quote the engine produces ([`CalculationResult`]).  Field
//! names are camelCase on the wire so the form can post its state
//! unchanged.

use crate::tiers::TierConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The VAT accounting regime of the business.
///
/// `None` and `Balance` are simple regimes.  `Effective` and `Unknown`
/// are complex and lift a small business into the SMART tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VatStatus {
    /// Not registered for VAT.
    None,
    /// Net tax rate (balance) method.
    Balance,
    /// Effective method with full input tax accounting.
    Effective,
    /// The visitor does not know which method applies.
    Unknown,
}

impl VatStatus {
    pub const ALL: [VatStatus; 4] = [
        VatStatus::None,
        VatStatus::Balance,
        VatStatus::Effective,
        VatStatus::Unknown,
    ];

    /// Whether this regime requires the service level of SMART or above.
    pub fn is_complex(self) -> bool {
        matches!(self, VatStatus::Effective | VatStatus::Unknown)
    }

    pub fn label(self) -> &'static str {
        match self {
            VatStatus::None => "No VAT",
            VatStatus::Balance => "Net tax rate method",
            VatStatus::Effective => "Effective method",
            VatStatus::Unknown => "I don't know",
        }
    }
}

/// Legal form of the business.  Carried through for display and lead
/// capture; it has no influence on tier or price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalForm {
    SoleProprietorship,
    Gmbh,
    Ag,
}

impl LegalForm {
    pub const ALL: [LegalForm; 3] = [LegalForm::SoleProprietorship, LegalForm::Gmbh, LegalForm::Ag];

    pub fn label(self) -> &'static str {
        match self {
            LegalForm::SoleProprietorship => "Sole proprietorship",
            LegalForm::Gmbh => "GmbH (limited liability company)",
            LegalForm::Ag => "AG (stock corporation)",
        }
    }
}

/// One of the four fixed service packages.
///
/// Declaration order is rank order, so the derived `Ord` gives
/// STARTER < SMART < COMFORT < PREMIUM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TierName {
    Starter,
    Smart,
    Comfort,
    Premium,
}

impl TierName {
    pub const ALL: [TierName; 4] = [
        TierName::Starter,
        TierName::Smart,
        TierName::Comfort,
        TierName::Premium,
    ];

    /// Zero-based rank, also the tier's index in the tier table.
    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TierName::Starter => "STARTER",
            TierName::Smart => "SMART",
            TierName::Comfort => "COMFORT",
            TierName::Premium => "PREMIUM",
        }
    }
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business metrics entered into the calculator form.
///
/// Numeric fields have already been parsed by the form layer.  A
/// `UserInput` is constructed at the moment of calculation and is
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    /// Monthly transaction volume.
    pub bookings_per_month: u64,
    /// Number of people receiving a salary.
    pub employees: u64,
    pub vat_status: VatStatus,
    pub legal_form: LegalForm,
}

impl UserInput {
    pub fn new(
        bookings_per_month: u64,
        employees: u64,
        vat_status: VatStatus,
        legal_form: LegalForm,
    ) -> Self {
        Self {
            bookings_per_month,
            employees,
            vat_status,
            legal_form,
        }
    }

    /// Builds an input from signed counts, clamping negatives to zero
    /// so that a quote can always be produced.
    pub fn from_signed(
        bookings_per_month: i64,
        employees: i64,
        vat_status: VatStatus,
        legal_form: LegalForm,
    ) -> Self {
        Self::new(
            clamp_count(bookings_per_month),
            clamp_count(employees),
            vat_status,
            legal_form,
        )
    }

    /// Bookings per year.  All volume thresholds are expressed in
    /// annual bookings, never in the monthly figure.
    pub fn annual_bookings(&self) -> u64 {
        self.bookings_per_month.saturating_mul(12)
    }
}

fn clamp_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// The itemised quote for one calculation.
///
/// Produced fresh on every call; two results with equal values are
/// interchangeable.  `monthly_price` always equals the sum of the
/// three components and `annual_price` is twelve times the monthly
/// price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// The tier the classifier selected.
    pub selected_tier: &'static TierConfig,
    /// Monthly price in CHF, rounded to two places.
    pub monthly_price: Decimal,
    /// Annual price in CHF, rounded to two places.
    pub annual_price: Decimal,
    /// Bookings per year, informational.
    pub annual_bookings: u64,
    /// Monthly bookings beyond the tier's included quota.
    pub extra_bookings: u64,
    /// Employees beyond the tier's included quota.
    pub extra_employees: u64,
    pub base_price_component: Decimal,
    pub booking_surcharge: Decimal,
    pub employee_surcharge: Decimal,
}
