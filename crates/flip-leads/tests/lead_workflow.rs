use chrono::{TimeZone, Utc};
use flip_leads::workflows::leads::{
    calculate_profit, estimate_commission, lifecycle::plan_transition, validate_conditions,
    CommissionTiers, DealQuote, EstimatedDeal, IntakeGuard, Lead, LeadId, LeadKpis, LeadStatus,
    LeadSubmission, Settings, StatusChangeRequest, TransitionError, Va,
};

fn default_tiers() -> CommissionTiers {
    Settings::default().tiers()
}

fn submission() -> LeadSubmission {
    LeadSubmission {
        va_name: Some("_new".to_string()),
        new_va_name: Some("Dev".to_string()),
        make: "Toyota".to_string(),
        model: "Yaris".to_string(),
        year: 2012,
        mileage: 104_000,
        asking_price: 1500,
        estimated_sale_price: 2200,
        estimated_expenses: Some(100),
        seller_name: "K. Lewis".to_string(),
        location: "Worcester, WR1".to_string(),
        listing_url: "https://www.gumtree.com/p/cars/yaris/1".to_string(),
        condition_notes: "Needs a battery".to_string(),
        good_deal_reason: "Quick sale".to_string(),
        conditions: Some(vec!["dead_battery".to_string()]),
        honeypot: None,
    }
}

#[test]
fn documented_pricing_examples_hold() {
    let tiers = default_tiers();

    assert_eq!(calculate_profit(3500, 3000, 250), 250);
    assert_eq!(calculate_profit(1000, 2000, 0), 0);
    assert_eq!(estimate_commission(399, &tiers), 40);
    assert_eq!(estimate_commission(400, &tiers), 40);
    assert_eq!(estimate_commission(800, &tiers), 80);
    assert_eq!(estimate_commission(801, &tiers), 120);
}

#[test]
fn documented_condition_examples_hold() {
    let rejected = validate_conditions(&["dead_battery", "engine_knock"]);
    assert!(!rejected.valid);
    assert_eq!(
        rejected.errors,
        vec!["Major issues detected: engine_knock. These cannot be accepted.".to_string()]
    );

    let empty: [&str; 0] = [];
    let accepted = validate_conditions(&empty);
    assert!(accepted.valid);
    assert!(accepted.errors.is_empty());
}

#[test]
fn lead_moves_from_submission_to_payment() {
    let settings = Settings::default();
    let tiers = settings.tiers();
    let now = Utc
        .with_ymd_and_hms(2025, 6, 2, 9, 30, 0)
        .single()
        .expect("valid timestamp");

    let draft = IntakeGuard::default()
        .draft_from_submission(&submission(), &settings)
        .expect("submission accepted");
    let quote = DealQuote::compute(
        draft.estimated_sale_price,
        draft.asking_price,
        draft.estimated_expenses,
        &tiers,
    );
    assert_eq!(quote, DealQuote { profit: 600, commission: 60 });

    let owner = Va::new("Dev", now);
    let mut lead = Lead {
        id: LeadId::generate(),
        created_at: now,
        va_id: owner.id.clone(),
        vehicle: draft.vehicle,
        deal: EstimatedDeal {
            asking_price: draft.asking_price,
            estimated_sale_price: draft.estimated_sale_price,
            estimated_expenses: draft.estimated_expenses,
            estimated_profit: quote.profit,
            estimated_commission: quote.commission,
        },
        listing: draft.listing,
        status: LeadStatus::Pending,
        settlement: None,
    };

    let premature = plan_transition(&lead, &StatusChangeRequest::sold(2000, Some(150)), &tiers);
    assert_eq!(
        premature,
        Err(TransitionError::NotAllowed {
            from: LeadStatus::Pending,
            to: LeadStatus::Sold
        })
    );

    for status in [
        LeadStatus::Approved,
        LeadStatus::Contacted,
        LeadStatus::Bought,
    ] {
        plan_transition(&lead, &StatusChangeRequest::to(status), &tiers)
            .expect("pipeline step")
            .apply_to(&mut lead);
    }
    plan_transition(&lead, &StatusChangeRequest::sold(2000, Some(150)), &tiers)
        .expect("sale")
        .apply_to(&mut lead);

    let settlement = lead.settlement.expect("settled");
    assert_eq!(settlement.actual_profit, 350);
    assert_eq!(settlement.actual_commission, 40);

    let kpis = LeadKpis::from_leads([&lead], now);
    assert_eq!(kpis.sold, 1);
    assert_eq!(kpis.avg_estimated_profit, 600);
    assert_eq!(kpis.avg_actual_profit, 350);
}
