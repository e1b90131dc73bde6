use super::common::*;
use crate::workflows::leads::pricing::{
    calculate_profit, estimate_commission, CommissionTier, CommissionTiers, DealQuote,
};

#[test]
fn profit_subtracts_asking_price_and_expenses() {
    assert_eq!(calculate_profit(3500, 3000, 250), 250);
    assert_eq!(calculate_profit(2200, 1500, 100), 600);
}

#[test]
fn profit_is_floored_at_zero_for_losses() {
    assert_eq!(calculate_profit(1000, 2000, 0), 0);
    assert_eq!(calculate_profit(1500, 1500, 1), 0);
}

#[test]
fn profit_saturates_instead_of_overflowing() {
    assert_eq!(calculate_profit(i64::MIN, i64::MAX, i64::MAX), 0);
    assert_eq!(calculate_profit(i64::MAX, -1, 0), i64::MAX);
}

#[test]
fn small_profits_earn_the_flat_fee_regardless_of_size() {
    let tiers = tiers();
    assert_eq!(estimate_commission(0, &tiers), 40);
    assert_eq!(estimate_commission(10, &tiers), 40);
    assert_eq!(estimate_commission(399, &tiers), 40);
}

#[test]
fn small_max_boundary_belongs_to_the_medium_tier() {
    let tiers = tiers();
    assert_eq!(tiers.tier_for(400), CommissionTier::Medium);
    assert_eq!(estimate_commission(400, &tiers), 40);
}

#[test]
fn medium_max_boundary_stays_in_the_medium_tier() {
    let tiers = tiers();
    assert_eq!(tiers.tier_for(800), CommissionTier::Medium);
    assert_eq!(estimate_commission(800, &tiers), 80);
    assert_eq!(tiers.tier_for(801), CommissionTier::Large);
    assert_eq!(estimate_commission(801, &tiers), 120);
}

#[test]
fn commission_rounds_the_product_once() {
    let eighth_rate = CommissionTiers {
        percent_medium: 0.125,
        ..tiers()
    };
    // 404 * 0.125 = 50.5
    assert_eq!(estimate_commission(404, &eighth_rate), 51);
    // 412 * 0.125 = 51.5
    assert_eq!(estimate_commission(412, &eighth_rate), 52);
    assert_eq!(estimate_commission(1000, &tiers()), 150);
}

#[test]
fn inverted_tiers_are_evaluated_as_configured() {
    let tiers = CommissionTiers {
        small_max: 900,
        medium_max: 500,
        ..tiers()
    };
    assert_eq!(estimate_commission(600, &tiers), 40);
    assert_eq!(estimate_commission(960, &tiers), 144);
}

#[test]
fn deal_quote_combines_both_calculations() {
    let quote = DealQuote::compute(2200, 1500, 100, &CommissionTiers::default());
    assert_eq!(quote.profit, 600);
    assert_eq!(quote.commission, 60);

    let loss = DealQuote::compute(900, 1500, 0, &CommissionTiers::default());
    assert_eq!(loss.profit, 0);
    assert_eq!(loss.commission, 40);
}
