//! Cachet batch job runner.
//!
//! One binary, one job per invocation, meant to be driven by a scheduler:
//!
//!   pricer price [CUTOFF]        - Price workable finance events
//!                                  (cutoff defaults to today)
//!   pricer cashflows YEAR MONTH  - Generate the cashflow batch for a month
//!   pricer invoices YEAR MONTH   - Bill the cashflows of a month's batch

use chrono::{NaiveDate, Utc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachet_db::jobs::{generate_cashflows, generate_invoices, price_events};
use cachet_shared::types::BatchPeriod;
use cachet_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = cachet_db::connect(&config.database.url).await?;
    info!("Connected to database");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("price") => {
            let cutoff = match args.get(1) {
                Some(raw) => raw.parse::<NaiveDate>()?,
                None => Utc::now().date_naive(),
            };
            let report = price_events::run(
                &db,
                cutoff,
                config.pricing.page_size,
                config.pricing.max_pages,
            )
            .await?;
            info!(?report, "price job finished");
        }
        Some("cashflows") => {
            let (Some(year), Some(month)) = (args.get(1), args.get(2)) else {
                anyhow::bail!("usage: pricer cashflows YEAR MONTH");
            };
            let period = BatchPeriod::monthly(year.parse()?, month.parse()?)
                .ok_or_else(|| anyhow::anyhow!("invalid month"))?;
            let report = generate_cashflows::run(&db, &period).await?;
            info!(?report, "cashflow job finished");
        }
        Some("invoices") => {
            let (Some(year), Some(month)) = (args.get(1), args.get(2)) else {
                anyhow::bail!("usage: pricer invoices YEAR MONTH");
            };
            let period = BatchPeriod::monthly(year.parse()?, month.parse()?)
                .ok_or_else(|| anyhow::anyhow!("invalid month"))?;
            let report = generate_invoices::run(
                &db,
                &config.invoicing.prefix,
                &period,
                Utc::now().date_naive(),
            )
            .await?;
            info!(?report, "invoice job finished");
        }
        _ => anyhow::bail!(
            "usage: pricer <price [CUTOFF] | cashflows YEAR MONTH | invoices YEAR MONTH>"
        ),
    }

    Ok(())
}
