mod common;
use augur::{Augur, DateRange, InstrumentId, horizon_days_from_years};
use chrono::NaiveDate;
use common::get_provider;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize a human-friendly tracing subscriber with env-based filtering.
    // Suggested: RUST_LOG=info,augur=debug,augur_core=debug with `--features augur/tracing`
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();

    // 1. Build the pipeline around a provider.
    let augur = Augur::builder().with_provider(get_provider()?).build()?;

    // 2. Four years of daily history, end date exclusive.
    let aapl = InstrumentId::new("AAPL")?;
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2019, 1, 1).ok_or("bad date")?,
        NaiveDate::from_ymd_opt(2023, 1, 1).ok_or("bad date")?,
    )?;

    // 3. Fit and forecast one year past the last session.
    let report = augur
        .forecast(&aapl, range, horizon_days_from_years(1))
        .await?;

    println!(
        "fitted {} observations, sigma {:.3}, {} changepoints, converged: {}",
        report.model.history().len(),
        report.model.sigma(),
        report.model.trend().changepoints().len(),
        report.model.converged(),
    );
    for dropped in report.model.dropped() {
        println!("dropped seasonality {}: {}", dropped.name, dropped.reason);
    }

    // 4. Print the tail of the forecast table.
    println!("{:<12} {:>10} {:>10} {:>10}", "date", "yhat", "lower", "upper");
    for row in report.forecast.tail(5) {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2}",
            row.date, row.yhat, row.yhat_lower, row.yhat_upper
        );
    }
    Ok(())
}
