mod common;
use augur::{Augur, DateRange, ForecasterConfig, InstrumentId, SeasonalityConfig};
use chrono::NaiveDate;
use common::get_provider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fewer changepoints and a coarser yearly cycle than the defaults.
    let cfg = ForecasterConfig::default()
        .with_changepoint_count(10)
        .with_seasonalities(vec![
            SeasonalityConfig::weekly(),
            SeasonalityConfig::new("yearly", augur::DAYS_PER_YEAR, 5),
        ]);
    let augur = Augur::builder()
        .with_provider(get_provider()?)
        .forecaster_config(cfg)
        .build()?;

    let aapl = InstrumentId::new("AAPL")?;
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2020, 1, 1).ok_or("bad date")?,
        NaiveDate::from_ymd_opt(2023, 1, 1).ok_or("bad date")?,
    )?;
    let report = augur.forecast(&aapl, range, 90).await?;

    // Trend parameters in value-per-day units.
    let trend = report.model.trend();
    println!(
        "base growth {:.4}/day, final growth {:.4}/day",
        trend.growth_per_day(),
        trend.final_growth_per_day()
    );
    for cp in trend.changepoints() {
        let delta = trend.delta_per_day(cp);
        if delta.abs() > 1e-3 {
            println!("  changepoint {} slope change {delta:+.4}/day", cp.date);
        }
    }

    // Seasonal harmonics as amplitude/phase pairs.
    for component in report.model.seasonalities() {
        println!("{} (period {} days)", component.name(), component.period_days());
        for h in component.harmonics() {
            println!("  k={} amplitude {:.3} phase {:.3}", h.order, h.amplitude(), h.phase());
        }
    }

    // Component series, ready for a charting layer.
    for series in report.components() {
        let last = series.points.last();
        println!(
            "{:<8} {} points, last {:?}",
            series.name,
            series.points.len(),
            last.map(|p| p.value)
        );
    }
    Ok(())
}
