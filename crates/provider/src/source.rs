use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tridium_core::{AttributionModelKind, ChannelMetric, ReportRange, TridiumError, TridiumResult};
use tridium_crm::{Lead, TimelineEvent, TimelineKpis};
use tridium_reporting::{
    AttributionSnapshot, BudgetOverview, BudgetSimulationResult, DashboardRange,
    DashboardSnapshot,
};

/// A lead with its full timeline and the KPIs derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadTimeline {
    pub lead: Lead,
    pub events: Vec<TimelineEvent>,
    pub kpis: TimelineKpis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    Boleto,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::Boleto => "boleto",
            Self::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = TridiumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pix" => Ok(Self::Pix),
            "boleto" => Ok(Self::Boleto),
            "card" => Ok(Self::Card),
            other => Err(TridiumError::invalid(format!(
                "unknown payment method '{other}', expected pix, boleto or card"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    /// Lead the charge belongs to; its timeline records the intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    pub amount: f64,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub intent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_url: Option<String>,
}

/// Everything the analytics views read. Implemented by the mock source and,
/// eventually, by a client for the real gateway.
pub trait DataSource: Send + Sync {
    fn attribution(
        &self,
        range: ReportRange,
        model: AttributionModelKind,
    ) -> impl Future<Output = TridiumResult<AttributionSnapshot>> + Send;

    fn budget_baseline(
        &self,
        range: ReportRange,
    ) -> impl Future<Output = TridiumResult<Vec<ChannelMetric>>> + Send;

    /// Baseline with totals and the response curve chart.
    fn budget_overview(
        &self,
        range: ReportRange,
    ) -> impl Future<Output = TridiumResult<BudgetOverview>> + Send;

    fn simulate_budget(
        &self,
        baseline: &[ChannelMetric],
        delta_percent: f64,
    ) -> impl Future<Output = TridiumResult<BudgetSimulationResult>> + Send;

    fn dashboard(
        &self,
        range: DashboardRange,
    ) -> impl Future<Output = TridiumResult<DashboardSnapshot>> + Send;

    fn list_leads(&self, query: &str) -> impl Future<Output = TridiumResult<Vec<Lead>>> + Send;

    fn lead_timeline(
        &self,
        lead_id: &str,
    ) -> impl Future<Output = TridiumResult<LeadTimeline>> + Send;

    fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> impl Future<Output = TridiumResult<PaymentIntent>> + Send;
}
