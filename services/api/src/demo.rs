use crate::infra::InMemoryLeadRepository;
use chrono::Utc;
use clap::Args;
use flip_leads::error::AppError;
use flip_leads::workflows::leads::{
    CommissionTiers, DealQuote, IntakePolicy, LeadService, LeadStatus, LeadSubmission,
    LeadWithVa, Settings, StatusChangeRequest,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Asking price of the demo vehicle
    #[arg(long, default_value_t = 1500)]
    pub(crate) asking_price: i64,
    /// Price the VA expects the vehicle to resell for
    #[arg(long, default_value_t = 2200)]
    pub(crate) estimated_sale_price: i64,
    /// Preparation costs the VA expects
    #[arg(long, default_value_t = 100)]
    pub(crate) estimated_expenses: i64,
    /// Price the vehicle actually sold for
    #[arg(long, default_value_t = 2000)]
    pub(crate) actual_sale_price: i64,
    /// Costs actually incurred before the sale
    #[arg(long, default_value_t = 150)]
    pub(crate) actual_expenses: i64,
    /// Print the final lead as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            asking_price: 1500,
            estimated_sale_price: 2200,
            estimated_expenses: 100,
            actual_sale_price: 2000,
            actual_expenses: 150,
            json: false,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Resale price of the vehicle
    #[arg(long)]
    pub(crate) sale_price: i64,
    /// Price paid for the vehicle
    #[arg(long)]
    pub(crate) asking_price: i64,
    /// Preparation costs
    #[arg(long, default_value_t = 0)]
    pub(crate) expenses: i64,
    /// Override the flat commission paid below the small-tier limit
    #[arg(long)]
    pub(crate) flat_small: Option<i64>,
    /// Override the profit below which the flat commission applies
    #[arg(long)]
    pub(crate) small_max: Option<i64>,
    /// Override the upper profit bound of the medium tier
    #[arg(long)]
    pub(crate) medium_max: Option<i64>,
    /// Override the medium-tier commission rate (0-1)
    #[arg(long)]
    pub(crate) percent_medium: Option<f64>,
    /// Override the large-tier commission rate (0-1)
    #[arg(long)]
    pub(crate) percent_large: Option<f64>,
}

impl QuoteArgs {
    fn tiers(&self) -> CommissionTiers {
        let defaults = CommissionTiers::default();
        CommissionTiers {
            flat_small: self.flat_small.unwrap_or(defaults.flat_small),
            small_max: self.small_max.unwrap_or(defaults.small_max),
            medium_max: self.medium_max.unwrap_or(defaults.medium_max),
            percent_medium: self.percent_medium.unwrap_or(defaults.percent_medium),
            percent_large: self.percent_large.unwrap_or(defaults.percent_large),
        }
    }
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let tiers = args.tiers();
    let quote = DealQuote::compute(args.sale_price, args.asking_price, args.expenses, &tiers);

    println!(
        "Deal: sale {} | asking {} | expenses {}",
        args.sale_price, args.asking_price, args.expenses
    );
    println!(
        "- Profit {} | tier {} | commission {}",
        quote.profit,
        tiers.tier_for(quote.profit).label(),
        quote.commission
    );
    println!(
        "- Tiers: flat {} below {} | {:.0}% up to {} | {:.0}% above",
        tiers.flat_small,
        tiers.small_max,
        tiers.percent_medium * 100.0,
        tiers.medium_max,
        tiers.percent_large * 100.0
    );

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryLeadRepository::default());
    let service = LeadService::new(repository, IntakePolicy::default());
    let settings = service.settings()?;

    println!("Lead pipeline demo");
    println!(
        "Settings: regions '{}' | flat {} below {} | {:.0}% up to {} | {:.0}% above",
        settings.allowed_regions,
        settings.flat_small,
        settings.small_max,
        settings.percent_medium * 100.0,
        settings.medium_max,
        settings.percent_large * 100.0
    );

    let rejected = LeadSubmission {
        conditions: Some(vec!["dead_battery".to_string(), "gearbox_failure".to_string()]),
        ..demo_submission(&args, &settings)
    };
    match service.submit(rejected) {
        Ok(receipt) => println!("- Unexpectedly accepted lead {}", receipt.record.lead.id),
        Err(err) => println!("- Gearbox failure lead turned away: {err}"),
    }

    let receipt = service.submit(demo_submission(&args, &settings))?;
    let lead_id = receipt.record.lead.id.clone();
    println!(
        "- Lead {} from {} -> estimated profit {} | commission {}",
        lead_id, receipt.record.va.name, receipt.estimated_profit, receipt.estimated_commission
    );

    match service.update_status(
        &lead_id,
        StatusChangeRequest::sold(args.actual_sale_price, None),
    ) {
        Ok(_) => println!("  Skipping straight to SOLD was accepted"),
        Err(err) => println!("  Skipping straight to SOLD refused: {err}"),
    }

    for status in [
        LeadStatus::Approved,
        LeadStatus::Contacted,
        LeadStatus::Bought,
    ] {
        let record = service.update_status(&lead_id, StatusChangeRequest::to(status))?;
        println!("  Status -> {}", record.lead.status.label());
    }

    let sold = service.update_status(
        &lead_id,
        StatusChangeRequest::sold(args.actual_sale_price, Some(args.actual_expenses)),
    )?;
    print_settlement(&sold);

    let paid = service.update_status(&lead_id, StatusChangeRequest::to(LeadStatus::Paid))?;
    println!("  Status -> {}", paid.lead.status.label());

    let kpis = service.kpis(Utc::now())?;
    println!(
        "\nKPIs: {} new this week | {} approved | {} bought | {} sold | avg est. profit {} | avg actual profit {}",
        kpis.new_this_week,
        kpis.approved,
        kpis.bought,
        kpis.sold,
        kpis.avg_estimated_profit,
        kpis.avg_actual_profit
    );

    if args.json {
        match serde_json::to_string_pretty(&paid.view()) {
            Ok(json) => println!("\nFinal lead payload:\n{json}"),
            Err(err) => println!("\nFinal lead payload unavailable: {err}"),
        }
    }

    Ok(())
}

fn print_settlement(record: &LeadWithVa) {
    match record.lead.settlement {
        Some(settlement) => println!(
            "  Status -> {} | actual profit {} (estimated {}) | commission {}",
            record.lead.status.label(),
            settlement.actual_profit,
            record.lead.deal.estimated_profit,
            settlement.actual_commission
        ),
        None => println!("  Status -> {} (no settlement recorded)", record.lead.status.label()),
    }
}

fn demo_submission(args: &DemoArgs, settings: &Settings) -> LeadSubmission {
    let region = settings
        .region_names()
        .into_iter()
        .next()
        .unwrap_or_else(|| "hereford".to_string());

    LeadSubmission {
        va_name: Some("_new".to_string()),
        new_va_name: Some("Maria".to_string()),
        make: "Ford".to_string(),
        model: "Fiesta".to_string(),
        year: 2014,
        mileage: 92_000,
        asking_price: args.asking_price,
        estimated_sale_price: args.estimated_sale_price,
        estimated_expenses: Some(args.estimated_expenses),
        seller_name: "J. Price".to_string(),
        location: format!("Outskirts of {region}"),
        listing_url: "https://www.facebook.com/marketplace/item/123456".to_string(),
        condition_notes: "Two owners, full service history".to_string(),
        good_deal_reason: "Priced under comparable listings".to_string(),
        conditions: Some(vec!["dead_battery".to_string()]),
        honeypot: None,
    }
}
