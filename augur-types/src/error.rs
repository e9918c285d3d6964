use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the augur workspace.
///
/// Covers upstream provider failures, series that are too short to model,
/// lifecycle misuse of the forecaster, unidentifiable seasonal components and
/// numerical failures of the joint fit.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AugurError {
    /// An upstream historical-series provider returned an error.
    #[error("{provider} failed: {msg}")]
    Provider {
        /// Provider name that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The instrument or the requested range is unknown to the provider, or it
    /// returned no rows.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "series for AAPL".
        what: String,
    },

    /// A provider call exceeded the configured fetch timeout.
    #[error("provider timed out: {provider}")]
    ProviderTimeout {
        /// Provider name that timed out.
        provider: String,
    },

    /// Fewer than two observations remained after normalization.
    #[error("empty series: {remaining} observation(s) remain, at least 2 are required")]
    EmptySeries {
        /// Number of observations that survived normalization.
        remaining: usize,
    },

    /// `predict` was called on a forecaster that has not been fitted.
    #[error("forecaster has not been fitted")]
    NotFitted,

    /// A seasonal component cannot be estimated from the training range.
    #[error(
        "seasonality '{component}' (period {period_days} days) is not identifiable from a {span_days}-day span"
    )]
    Identifiability {
        /// Name of the seasonal component.
        component: String,
        /// Declared period in days, formatted for display.
        period_days: String,
        /// Training span in days.
        span_days: i64,
    },

    /// The joint least-squares fit degenerated (singular system, non-finite values).
    #[error("fit failed: {0}")]
    Fit(String),

    /// The fit was cancelled cooperatively; no model was installed.
    #[error("fit cancelled")]
    Cancelled,

    /// Invalid input argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with the returned or expected data (malformed payloads, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl AugurError {
    /// Helper: build a `Provider` error with the provider name and message.
    pub fn provider(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(provider: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
        }
    }

    /// Helper: build an `EmptySeries` error.
    #[must_use]
    pub const fn empty_series(remaining: usize) -> Self {
        Self::EmptySeries { remaining }
    }

    /// Helper: build a `Fit` error.
    pub fn fit(msg: impl Into<String>) -> Self {
        Self::Fit(msg.into())
    }

    /// Helper: build an `Identifiability` error.
    pub fn identifiability(component: impl Into<String>, period_days: f64, span_days: i64) -> Self {
        Self::Identifiability {
            component: component.into(),
            period_days: format!("{period_days}"),
            span_days,
        }
    }

    /// Returns true for failures of the upstream series fetch.
    ///
    /// These abort a pipeline request and are never cached.
    #[must_use]
    pub const fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::NotFound { .. } | Self::ProviderTimeout { .. }
        )
    }

    /// Returns true if retrying the fit with fewer changepoints may help.
    #[must_use]
    pub const fn is_retryable_fit(&self) -> bool {
        matches!(self, Self::Fit(_))
    }
}
