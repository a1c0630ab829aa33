use serde::Deserialize;
use std::time::Duration;

use crate::error::{TridiumError, TridiumResult};

/// Root application configuration. Loaded from environment variables
/// with the prefix `TRIDIUM__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub mock: MockConfig,
}

/// Parameters of the budget simulator and its saturating response curve.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// Largest absolute total-budget change the simulator accepts, in percent.
    #[serde(default = "default_max_delta_percent")]
    pub max_delta_percent: f64,
    /// `leads = round(sqrt(spend) * leads_per_sqrt_spend)`
    #[serde(default = "default_leads_per_sqrt_spend")]
    pub leads_per_sqrt_spend: f64,
    /// Lower bound of the revenue-per-spend multiplier.
    #[serde(default = "default_revenue_floor_multiplier")]
    pub revenue_floor_multiplier: f64,
    /// Spend below this value is clamped before taking `log10`.
    #[serde(default = "default_min_curve_spend")]
    pub min_curve_spend: f64,
}

/// Simulated network latency of the mock data source, per endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_attribution_latency_ms")]
    pub attribution_latency_ms: u64,
    #[serde(default = "default_budget_latency_ms")]
    pub budget_latency_ms: u64,
    #[serde(default = "default_simulate_latency_ms")]
    pub simulate_latency_ms: u64,
    #[serde(default = "default_dashboard_latency_ms")]
    pub dashboard_latency_ms: u64,
    #[serde(default = "default_leads_latency_ms")]
    pub leads_latency_ms: u64,
    #[serde(default = "default_timeline_latency_ms")]
    pub timeline_latency_ms: u64,
    #[serde(default = "default_payment_latency_ms")]
    pub payment_latency_ms: u64,
    /// Multiplier applied to every latency. `0` disables waiting.
    #[serde(default = "default_latency_scale")]
    pub latency_scale: f64,
}

// Default functions
fn default_max_delta_percent() -> f64 {
    30.0
}
fn default_leads_per_sqrt_spend() -> f64 {
    11.0
}
fn default_revenue_floor_multiplier() -> f64 {
    1.2
}
fn default_min_curve_spend() -> f64 {
    10.0
}
fn default_attribution_latency_ms() -> u64 {
    250
}
fn default_budget_latency_ms() -> u64 {
    240
}
fn default_simulate_latency_ms() -> u64 {
    200
}
fn default_dashboard_latency_ms() -> u64 {
    200
}
fn default_leads_latency_ms() -> u64 {
    180
}
fn default_timeline_latency_ms() -> u64 {
    200
}
fn default_payment_latency_ms() -> u64 {
    250
}
fn default_latency_scale() -> f64 {
    1.0
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            max_delta_percent: default_max_delta_percent(),
            leads_per_sqrt_spend: default_leads_per_sqrt_spend(),
            revenue_floor_multiplier: default_revenue_floor_multiplier(),
            min_curve_spend: default_min_curve_spend(),
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            attribution_latency_ms: default_attribution_latency_ms(),
            budget_latency_ms: default_budget_latency_ms(),
            simulate_latency_ms: default_simulate_latency_ms(),
            dashboard_latency_ms: default_dashboard_latency_ms(),
            leads_latency_ms: default_leads_latency_ms(),
            timeline_latency_ms: default_timeline_latency_ms(),
            payment_latency_ms: default_payment_latency_ms(),
            latency_scale: default_latency_scale(),
        }
    }
}

impl MockConfig {
    /// A configuration that never sleeps; used by tests and `--no-latency`.
    pub fn instant() -> Self {
        Self {
            latency_scale: 0.0,
            ..Self::default()
        }
    }

    /// Scale a nominal endpoint latency by `latency_scale`.
    pub fn scaled(&self, millis: u64) -> Duration {
        if !self.latency_scale.is_finite() || self.latency_scale <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_millis((millis as f64 * self.latency_scale).round() as u64)
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("TRIDIUM")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Reject settings the simulator cannot work with. Call after CLI
    /// overrides are applied.
    pub fn validate(&self) -> TridiumResult<()> {
        let max_delta = self.reporting.max_delta_percent;
        if !max_delta.is_finite() || max_delta <= 0.0 {
            return Err(TridiumError::Config(format!(
                "reporting.max_delta_percent must be a positive number, got {max_delta}"
            )));
        }
        Ok(())
    }
}
