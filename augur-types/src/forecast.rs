//! Forecast output rows and the per-component decomposition view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name of the trend component in decomposition views.
pub const TREND: &str = "trend";
/// Name of the total forecast in decomposition views.
pub const YHAT: &str = "yhat";

/// Value of one seasonal component at one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalValue {
    /// Component name (e.g. "weekly").
    pub name: String,
    /// Additive contribution at the row's date.
    pub value: f64,
}

/// One forecast row: the decomposition at a date plus the uncertainty band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Forecast date.
    pub date: NaiveDate,
    /// Trend value.
    pub trend: f64,
    /// Lower bound of the trend under simulated changepoint uncertainty.
    pub trend_lower: f64,
    /// Upper bound of the trend under simulated changepoint uncertainty.
    pub trend_upper: f64,
    /// Seasonal contributions in model order.
    pub seasonal: Vec<SeasonalValue>,
    /// Point forecast: trend plus every seasonal contribution.
    pub yhat: f64,
    /// Lower bound of the forecast interval.
    pub yhat_lower: f64,
    /// Upper bound of the forecast interval.
    pub yhat_upper: f64,
}

impl ForecastRow {
    /// Sum of all seasonal contributions.
    #[must_use]
    pub fn additive_terms(&self) -> f64 {
        self.seasonal.iter().map(|s| s.value).sum()
    }

    /// Contribution of a named seasonal component, if the model has it.
    #[must_use]
    pub fn seasonal_value(&self, name: &str) -> Option<f64> {
        self.seasonal.iter().find(|s| s.name == name).map(|s| s.value)
    }

    /// Width of the forecast interval.
    #[must_use]
    pub fn interval_width(&self) -> f64 {
        self.yhat_upper - self.yhat_lower
    }
}

/// One point of a component series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentPoint {
    /// Date of the point.
    pub date: NaiveDate,
    /// Component value.
    pub value: f64,
    /// Lower bound, for components that carry one (trend, yhat).
    pub lower: Option<f64>,
    /// Upper bound, for components that carry one (trend, yhat).
    pub upper: Option<f64>,
}

/// All points of one component, ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSeries {
    /// Component name: `trend`, a seasonal name, or `yhat`.
    pub name: String,
    /// Points in row order.
    pub points: Vec<ComponentPoint>,
}

/// Ordered forecast table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Rows in the order of the requested dates.
    pub rows: Vec<ForecastRow>,
}

impl Forecast {
    /// Wrap predicted rows.
    #[must_use]
    pub const fn new(rows: Vec<ForecastRow>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were predicted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The last `n` rows (all rows when fewer exist).
    #[must_use]
    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }

    /// Row for an exact date.
    #[must_use]
    pub fn row(&self, date: NaiveDate) -> Option<&ForecastRow> {
        self.rows.iter().find(|r| r.date == date)
    }

    /// Group the table by component: trend first, then each seasonal component
    /// in model order, then the total forecast.
    #[must_use]
    pub fn components(&self) -> Vec<ComponentSeries> {
        let mut out = Vec::new();
        out.push(ComponentSeries {
            name: TREND.to_string(),
            points: self
                .rows
                .iter()
                .map(|r| ComponentPoint {
                    date: r.date,
                    value: r.trend,
                    lower: Some(r.trend_lower),
                    upper: Some(r.trend_upper),
                })
                .collect(),
        });
        let names: Vec<&str> = self
            .rows
            .first()
            .map(|r| r.seasonal.iter().map(|s| s.name.as_str()).collect())
            .unwrap_or_default();
        for name in names {
            out.push(ComponentSeries {
                name: name.to_string(),
                points: self
                    .rows
                    .iter()
                    .map(|r| ComponentPoint {
                        date: r.date,
                        value: r.seasonal_value(name).unwrap_or(0.0),
                        lower: None,
                        upper: None,
                    })
                    .collect(),
            });
        }
        out.push(ComponentSeries {
            name: YHAT.to_string(),
            points: self
                .rows
                .iter()
                .map(|r| ComponentPoint {
                    date: r.date,
                    value: r.yhat,
                    lower: Some(r.yhat_lower),
                    upper: Some(r.yhat_upper),
                })
                .collect(),
        });
        out
    }
}
