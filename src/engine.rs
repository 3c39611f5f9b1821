//! Price computation engine.
//!
//! The `engine` module turns a [`UserInput`] into a
//! [`CalculationResult`].  [`calculate_full_price`] is the single
//! entry point used by the form: it classifies the input, looks the
//! tier up in the static tier table and prices the input against it.
//! Both steps are pure, so calling the pipeline twice with the same
//! input yields identical results.
//!
//! Amounts are exact decimals.  Each surcharge is rounded to two
//! places on its own; the monthly and annual prices are rounded after
//! summation.

use crate::classifier::{self, TierRule};
use crate::models::{CalculationResult, TierName, UserInput};
use crate::tiers::{tier_config, TierConfig};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

/// Rounds a CHF amount to two places, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Prices `input` against `tier`.
///
/// Units beyond the tier's included quotas are charged at the tier's
/// marginal rates.  The function is total; it does not check that
/// `tier` is the one the classifier would pick.
pub fn price(input: &UserInput, tier: &'static TierConfig) -> CalculationResult {
    let extra_bookings = input
        .bookings_per_month
        .saturating_sub(tier.included_bookings_per_month);
    let booking_surcharge = round_money(Decimal::from(extra_bookings) * tier.price_per_extra_booking);

    let extra_employees = input.employees.saturating_sub(tier.included_employees);
    let employee_surcharge =
        round_money(Decimal::from(extra_employees) * tier.price_per_extra_employee);

    let monthly_price = round_money(tier.base_price + booking_surcharge + employee_surcharge);
    let annual_price = round_money(monthly_price * Decimal::from(12));

    CalculationResult {
        selected_tier: tier,
        monthly_price,
        annual_price,
        annual_bookings: input.annual_bookings(),
        extra_bookings,
        extra_employees,
        base_price_component: tier.base_price,
        booking_surcharge,
        employee_surcharge,
    }
}

/// A priced input together with the rule that selected its tier.
#[derive(Debug, Clone)]
pub struct Quote {
    pub result: CalculationResult,
    /// `None` when the input fell to the STARTER default.
    pub trigger: Option<&'static TierRule>,
}

/// Runs the cascade once, then prices the input against the selected
/// tier.
pub fn quote(input: &UserInput) -> Quote {
    let trigger = classifier::explain(input);
    let tier = tier_config(trigger.map_or(TierName::Starter, |rule| rule.tier));
    debug!(
        tier = %tier.name,
        trigger = trigger.map_or("default", |rule| rule.description),
        bookings_per_month = input.bookings_per_month,
        employees = input.employees,
        "classified calculator input"
    );
    Quote {
        result: price(input, tier),
        trigger,
    }
}

/// Classifies `input` and prices it against the selected tier.
pub fn calculate_full_price(input: &UserInput) -> CalculationResult {
    quote(input).result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LegalForm, VatStatus};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn full_price(bookings: u64, employees: u64, vat: VatStatus, legal: LegalForm) -> CalculationResult {
        calculate_full_price(&UserInput::new(bookings, employees, vat, legal))
    }

    #[test]
    fn starter_example() {
        let r = full_price(20, 1, VatStatus::Balance, LegalForm::SoleProprietorship);
        assert_eq!(r.selected_tier.name, TierName::Starter);
        // 250 + 20 * 6.00 + 1 * 49.50
        assert_eq!(r.monthly_price, dec("419.50"));
        assert_eq!(r.booking_surcharge, dec("120.00"));
        assert_eq!(r.employee_surcharge, dec("49.50"));
        assert_eq!(r.annual_price, dec("5034.00"));
    }

    #[test]
    fn smart_example() {
        let r = full_price(40, 4, VatStatus::Effective, LegalForm::Gmbh);
        assert_eq!(r.selected_tier.name, TierName::Smart);
        // 500 + 15 * 5.98 + 2 * 37.25
        assert_eq!(r.extra_bookings, 15);
        assert_eq!(r.extra_employees, 2);
        assert_eq!(r.booking_surcharge, dec("89.70"));
        assert_eq!(r.employee_surcharge, dec("74.50"));
        assert_eq!(r.monthly_price, dec("664.20"));
        assert_eq!(r.annual_price, dec("7970.40"));
    }

    #[test]
    fn comfort_example() {
        let r = full_price(80, 8, VatStatus::Effective, LegalForm::Ag);
        assert_eq!(r.selected_tier.name, TierName::Comfort);
        // 800 + 30 * 5.00 + 2 * 62.25
        assert_eq!(r.monthly_price, dec("1074.50"));
    }

    #[test]
    fn premium_example() {
        let r = full_price(150, 15, VatStatus::Effective, LegalForm::Ag);
        assert_eq!(r.selected_tier.name, TierName::Premium);
        // 1300 + 50 * 5.00 + 5 * 75.00
        assert_eq!(r.monthly_price, dec("1925.00"));
        assert_eq!(r.annual_price, dec("23100.00"));
    }

    #[test]
    fn premium_triggered_by_bookings_alone() {
        let r = full_price(101, 1, VatStatus::Balance, LegalForm::SoleProprietorship);
        assert_eq!(r.selected_tier.name, TierName::Premium);
        assert_eq!(r.annual_bookings, 1212);
        assert_eq!(r.extra_bookings, 1);
        assert_eq!(r.extra_employees, 0);
        assert_eq!(r.monthly_price, dec("1305.00"));
    }

    #[test]
    fn smart_triggered_by_vat_alone() {
        let r = full_price(10, 1, VatStatus::Effective, LegalForm::SoleProprietorship);
        assert_eq!(r.selected_tier.name, TierName::Smart);
        assert_eq!(r.extra_bookings, 0);
        assert_eq!(r.monthly_price, dec("500.00"));
    }

    #[test]
    fn zero_input_costs_the_starter_base_price() {
        let r = full_price(0, 0, VatStatus::None, LegalForm::Gmbh);
        assert_eq!(r.selected_tier.name, TierName::Starter);
        assert_eq!(r.monthly_price, dec("250"));
        assert_eq!(r.booking_surcharge, Decimal::ZERO);
    }

    #[test]
    fn price_against_an_explicit_tier() {
        let input = UserInput::new(30, 3, VatStatus::None, LegalForm::Gmbh);
        let r = price(&input, tier_config(TierName::Premium));
        assert_eq!(r.selected_tier.name, TierName::Premium);
        assert_eq!(r.extra_bookings, 0);
        assert_eq!(r.extra_employees, 0);
        assert_eq!(r.monthly_price, dec("1300"));
    }

    #[test]
    fn breakdown_sums_to_monthly_price() {
        for bookings in [0, 1, 24, 25, 26, 49, 50, 51, 99, 100, 101, 500] {
            for employees in [0, 1, 2, 3, 6, 7, 10, 11, 40] {
                for vat in VatStatus::ALL {
                    let r = full_price(bookings, employees, vat, LegalForm::Gmbh);
                    assert_eq!(
                        r.monthly_price,
                        r.base_price_component + r.booking_surcharge + r.employee_surcharge
                    );
                    assert_eq!(r.annual_price, r.monthly_price * Decimal::from(12));
                }
            }
        }
    }

    #[test]
    fn round_money_is_half_up() {
        assert_eq!(round_money(dec("1.005")), dec("1.01"));
        assert_eq!(round_money(dec("1.004")), dec("1.00"));
        assert_eq!(round_money(dec("89.7")), dec("89.70"));
    }

    #[test]
    fn quote_reports_the_deciding_rule() {
        let q = quote(&UserInput::new(10, 1, VatStatus::Unknown, LegalForm::Gmbh));
        assert_eq!(q.result.selected_tier.name, TierName::Smart);
        let rule = q.trigger.expect("vat rule");
        assert_eq!(rule.tier, q.result.selected_tier.name);
        assert_eq!(rule.description, "VAT method not known");

        let q = quote(&UserInput::new(20, 1, VatStatus::None, LegalForm::Gmbh));
        assert!(q.trigger.is_none());
        assert_eq!(q.result.selected_tier.name, TierName::Starter);
    }

    #[test]
    fn quote_agrees_with_classifier() {
        for bookings in [0, 25, 26, 50, 51, 100, 101] {
            for employees in [0, 2, 3, 6, 7, 10, 11] {
                for vat in VatStatus::ALL {
                    let input = UserInput::new(bookings, employees, vat, LegalForm::Ag);
                    let q = quote(&input);
                    assert_eq!(q.result.selected_tier.name, classifier::classify(&input));
                    assert_eq!(q.result, calculate_full_price(&input));
                }
            }
        }
    }

    #[test]
    fn pipeline_is_deterministic() {
        let input = UserInput::new(40, 4, VatStatus::Effective, LegalForm::Gmbh);
        assert_eq!(calculate_full_price(&input), calculate_full_price(&input));
    }
}
