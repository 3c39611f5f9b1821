//! Tier classification.
//!
//! Tiers are nested capacity bands over annual bookings and headcount,
//! with complex VAT regimes acting as a floor that lifts otherwise
//! small businesses into SMART.  Bands overlap at their edges, so the
//! rules are evaluated from the highest tier down and the first match
//! wins.  Every band is half-open below and closed above: 600 annual
//! bookings is still SMART, 601 is COMFORT.
//!
//! The cascade is a fixed slice of [`TierRule`]s.  When none matches,
//! the input is STARTER.

use crate::models::{TierName, UserInput, VatStatus};

pub const STARTER_MAX_ANNUAL_BOOKINGS: u64 = 300;
pub const SMART_MAX_ANNUAL_BOOKINGS: u64 = 600;
pub const COMFORT_MAX_ANNUAL_BOOKINGS: u64 = 1200;

pub const STARTER_MAX_EMPLOYEES: u64 = 2;
pub const SMART_MAX_EMPLOYEES: u64 = 6;
pub const COMFORT_MAX_EMPLOYEES: u64 = 10;

/// The quantities classification depends on.  Legal form is not part
/// of it and therefore cannot change the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub annual_bookings: u64,
    pub employees: u64,
    pub vat_status: VatStatus,
}

impl From<&UserInput> for Signals {
    fn from(input: &UserInput) -> Self {
        Self {
            annual_bookings: input.annual_bookings(),
            employees: input.employees,
            vat_status: input.vat_status,
        }
    }
}

/// One condition of the cascade and the tier it selects.
pub struct TierRule {
    pub tier: TierName,
    /// Short explanation of what triggered the tier.
    pub description: &'static str,
    predicate: fn(&Signals) -> bool,
}

impl TierRule {
    pub fn matches(&self, signals: &Signals) -> bool {
        (self.predicate)(signals)
    }
}

impl std::fmt::Debug for TierRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierRule")
            .field("tier", &self.tier)
            .field("description", &self.description)
            .finish()
    }
}

fn in_band(value: u64, lower: u64, upper: u64) -> bool {
    value > lower && value <= upper
}

fn premium_by_bookings(s: &Signals) -> bool {
    s.annual_bookings > COMFORT_MAX_ANNUAL_BOOKINGS
}

fn premium_by_employees(s: &Signals) -> bool {
    s.employees > COMFORT_MAX_EMPLOYEES
}

fn comfort_by_bookings(s: &Signals) -> bool {
    in_band(s.annual_bookings, SMART_MAX_ANNUAL_BOOKINGS, COMFORT_MAX_ANNUAL_BOOKINGS)
        && s.employees <= COMFORT_MAX_EMPLOYEES
}

fn comfort_by_employees(s: &Signals) -> bool {
    in_band(s.employees, SMART_MAX_EMPLOYEES, COMFORT_MAX_EMPLOYEES)
        && s.annual_bookings <= COMFORT_MAX_ANNUAL_BOOKINGS
}

fn within_smart_limits(s: &Signals) -> bool {
    s.annual_bookings <= SMART_MAX_ANNUAL_BOOKINGS && s.employees <= SMART_MAX_EMPLOYEES
}

fn smart_by_bookings(s: &Signals) -> bool {
    in_band(s.annual_bookings, STARTER_MAX_ANNUAL_BOOKINGS, SMART_MAX_ANNUAL_BOOKINGS)
        && s.employees <= SMART_MAX_EMPLOYEES
}

fn smart_by_employees(s: &Signals) -> bool {
    in_band(s.employees, STARTER_MAX_EMPLOYEES, SMART_MAX_EMPLOYEES)
        && s.annual_bookings <= SMART_MAX_ANNUAL_BOOKINGS
}

fn smart_by_effective_vat(s: &Signals) -> bool {
    s.vat_status == VatStatus::Effective && within_smart_limits(s)
}

fn smart_by_unknown_vat(s: &Signals) -> bool {
    s.vat_status == VatStatus::Unknown && within_smart_limits(s)
}

/// The cascade, highest tier first.
pub static RULES: [TierRule; 8] = [
    TierRule {
        tier: TierName::Premium,
        description: "more than 1200 bookings per year",
        predicate: premium_by_bookings,
    },
    TierRule {
        tier: TierName::Premium,
        description: "more than 10 employees",
        predicate: premium_by_employees,
    },
    TierRule {
        tier: TierName::Comfort,
        description: "601 to 1200 bookings per year",
        predicate: comfort_by_bookings,
    },
    TierRule {
        tier: TierName::Comfort,
        description: "7 to 10 employees",
        predicate: comfort_by_employees,
    },
    TierRule {
        tier: TierName::Smart,
        description: "301 to 600 bookings per year",
        predicate: smart_by_bookings,
    },
    TierRule {
        tier: TierName::Smart,
        description: "3 to 6 employees",
        predicate: smart_by_employees,
    },
    TierRule {
        tier: TierName::Smart,
        description: "effective VAT method",
        predicate: smart_by_effective_vat,
    },
    TierRule {
        tier: TierName::Smart,
        description: "VAT method not known",
        predicate: smart_by_unknown_vat,
    },
];

/// Returns the rule that decides the tier for `signals`, or `None`
/// when the input falls to the STARTER default.
pub fn explain_signals(signals: &Signals) -> Option<&'static TierRule> {
    RULES.iter().find(|rule| rule.matches(signals))
}

pub fn explain(input: &UserInput) -> Option<&'static TierRule> {
    explain_signals(&Signals::from(input))
}

pub fn classify_signals(signals: &Signals) -> TierName {
    explain_signals(signals).map_or(TierName::Starter, |rule| rule.tier)
}

/// Maps an input to its tier.  Total: every input yields exactly one
/// tier.
pub fn classify(input: &UserInput) -> TierName {
    classify_signals(&Signals::from(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LegalForm;

    fn input(bookings: u64, employees: u64, vat: VatStatus) -> UserInput {
        UserInput::new(bookings, employees, vat, LegalForm::Gmbh)
    }

    fn signals(annual_bookings: u64, employees: u64, vat_status: VatStatus) -> Signals {
        Signals {
            annual_bookings,
            employees,
            vat_status,
        }
    }

    /// Band-wise formulation of the same business rules, used as an
    /// oracle for the cascade.
    fn expected(s: &Signals) -> TierName {
        if s.annual_bookings > 1200 || s.employees > 10 {
            TierName::Premium
        } else if s.annual_bookings > 600 || s.employees > 6 {
            TierName::Comfort
        } else if s.annual_bookings > 300 || s.employees > 2 || s.vat_status.is_complex() {
            TierName::Smart
        } else {
            TierName::Starter
        }
    }

    #[test]
    fn premium_when_annual_bookings_exceed_1200() {
        assert_eq!(classify(&input(101, 1, VatStatus::Balance)), TierName::Premium);
    }

    #[test]
    fn premium_when_employees_exceed_10() {
        assert_eq!(classify(&input(10, 11, VatStatus::Balance)), TierName::Premium);
    }

    #[test]
    fn comfort_by_bookings_band() {
        assert_eq!(classify(&input(80, 8, VatStatus::Balance)), TierName::Comfort);
    }

    #[test]
    fn comfort_by_headcount_band() {
        assert_eq!(classify(&input(20, 7, VatStatus::Balance)), TierName::Comfort);
    }

    #[test]
    fn smart_by_bookings_band() {
        assert_eq!(classify(&input(35, 4, VatStatus::Balance)), TierName::Smart);
    }

    #[test]
    fn smart_by_headcount_band() {
        assert_eq!(classify(&input(10, 4, VatStatus::Balance)), TierName::Smart);
    }

    #[test]
    fn complex_vat_lifts_small_business_to_smart() {
        assert_eq!(classify(&input(10, 1, VatStatus::Effective)), TierName::Smart);
        assert_eq!(classify(&input(10, 1, VatStatus::Unknown)), TierName::Smart);
    }

    #[test]
    fn simple_vat_small_business_is_starter() {
        assert_eq!(classify(&input(20, 1, VatStatus::Balance)), TierName::Starter);
        assert_eq!(classify(&input(20, 1, VatStatus::None)), TierName::Starter);
        assert_eq!(classify(&input(0, 0, VatStatus::None)), TierName::Starter);
    }

    #[test]
    fn upper_bounds_are_inclusive() {
        assert_eq!(classify_signals(&signals(300, 2, VatStatus::None)), TierName::Starter);
        assert_eq!(classify_signals(&signals(301, 2, VatStatus::None)), TierName::Smart);
        assert_eq!(classify_signals(&signals(600, 6, VatStatus::None)), TierName::Smart);
        assert_eq!(classify_signals(&signals(601, 6, VatStatus::None)), TierName::Comfort);
        assert_eq!(classify_signals(&signals(1200, 10, VatStatus::None)), TierName::Comfort);
        assert_eq!(classify_signals(&signals(1201, 10, VatStatus::None)), TierName::Premium);
        assert_eq!(classify_signals(&signals(0, 3, VatStatus::None)), TierName::Smart);
        assert_eq!(classify_signals(&signals(0, 7, VatStatus::None)), TierName::Comfort);
        assert_eq!(classify_signals(&signals(0, 11, VatStatus::None)), TierName::Premium);
    }

    #[test]
    fn complex_vat_never_lowers_a_higher_band() {
        assert_eq!(classify_signals(&signals(700, 1, VatStatus::Effective)), TierName::Comfort);
        assert_eq!(classify_signals(&signals(0, 12, VatStatus::Unknown)), TierName::Premium);
    }

    #[test]
    fn boundary_sweep_covers_every_combination() {
        const BOUNDARIES: [u64; 13] = [0, 2, 3, 6, 7, 10, 11, 300, 301, 600, 601, 1200, 1201];
        for annual_bookings in BOUNDARIES {
            for employees in BOUNDARIES {
                for vat_status in VatStatus::ALL {
                    let s = signals(annual_bookings, employees, vat_status);
                    assert_eq!(classify_signals(&s), expected(&s), "signals {s:?}");
                }
            }
        }
    }

    #[test]
    fn legal_form_is_ignored() {
        for legal_form in LegalForm::ALL {
            for vat_status in VatStatus::ALL {
                let base = UserInput::new(26, 3, vat_status, LegalForm::Ag);
                let other = UserInput { legal_form, ..base };
                assert_eq!(classify(&base), classify(&other));
            }
        }
    }

    #[test]
    fn explain_names_the_trigger() {
        let rule = explain(&input(101, 1, VatStatus::Balance)).expect("premium rule");
        assert_eq!(rule.tier, TierName::Premium);
        assert_eq!(rule.description, "more than 1200 bookings per year");

        let rule = explain(&input(10, 1, VatStatus::Effective)).expect("vat rule");
        assert_eq!(rule.description, "effective VAT method");

        assert!(explain(&input(20, 1, VatStatus::None)).is_none());
    }

    #[test]
    fn rules_are_ordered_highest_tier_first() {
        for pair in RULES.windows(2) {
            assert!(pair[0].tier >= pair[1].tier);
        }
    }
}
