//! In-memory data source backed by the synthetic generators.
//!
//! Every call waits the configured endpoint latency, then answers from the
//! pure analytics functions or from the seeded lead catalog.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::BTreeMap;
use tracing::{debug, info};
use tridium_core::config::MockConfig;
use tridium_core::{
    AppConfig, AttributionModelKind, ChannelMetric, ReportRange, TridiumError, TridiumResult,
};
use tridium_crm::{compute_kpis, leads, EventKind, Lead, LeadSource, TimelineEvent};
use tridium_reporting::{
    budget_overview, compute_snapshot, load_baseline, overview, AttributionSnapshot,
    BudgetOverview, BudgetSimulationResult, BudgetSimulator, DashboardRange, DashboardSnapshot,
};

use crate::source::{DataSource, LeadTimeline, PaymentIntent, PaymentIntentRequest};

const PAYMENT_PROVIDER: &str = "asaas";
const INVOICE_BASE_URL: &str = "https://sandbox.asaas.com/invoice";

pub struct MockDataSource {
    latency: MockConfig,
    simulator: BudgetSimulator,
    leads: Vec<Lead>,
    timelines: DashMap<String, Vec<TimelineEvent>>,
}

impl MockDataSource {
    /// Seed the catalog with timelines ending shortly before now.
    pub fn new(config: &AppConfig) -> Self {
        Self::seeded_at(config, Utc::now())
    }

    /// Seed the catalog with timelines relative to `now`.
    pub fn seeded_at(config: &AppConfig, now: DateTime<Utc>) -> Self {
        let leads = seed_leads();
        let timelines = DashMap::new();
        for lead in &leads {
            timelines.insert(lead.id.clone(), seed_timeline(lead, now));
        }

        info!(
            leads = leads.len(),
            latency_scale = config.mock.latency_scale,
            "Mock data source initialized"
        );

        Self {
            latency: config.mock.clone(),
            simulator: BudgetSimulator::new(&config.reporting),
            leads,
            timelines,
        }
    }

    async fn wait(&self, endpoint: &'static str, millis: u64) {
        metrics::counter!("tridium.provider.requests", "endpoint" => endpoint).increment(1);
        let delay = self.latency.scaled(millis);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        debug!(endpoint, delay_ms = delay.as_millis() as u64, "Mock request served");
    }

    fn find_lead(&self, lead_id: &str) -> TridiumResult<&Lead> {
        self.leads
            .iter()
            .find(|l| l.id == lead_id)
            .ok_or_else(|| TridiumError::NotFound(format!("lead {lead_id}")))
    }
}

impl DataSource for MockDataSource {
    async fn attribution(
        &self,
        range: ReportRange,
        model: AttributionModelKind,
    ) -> TridiumResult<AttributionSnapshot> {
        self.wait("attribution", self.latency.attribution_latency_ms)
            .await;
        info!(range = %range, model = %model, "Serving attribution snapshot");
        Ok(compute_snapshot(range, model))
    }

    async fn budget_baseline(&self, range: ReportRange) -> TridiumResult<Vec<ChannelMetric>> {
        self.wait("budget", self.latency.budget_latency_ms).await;
        info!(range = %range, "Serving budget baseline");
        Ok(load_baseline(range))
    }

    async fn budget_overview(&self, range: ReportRange) -> TridiumResult<BudgetOverview> {
        self.wait("budget", self.latency.budget_latency_ms).await;
        info!(range = %range, "Serving budget overview");
        Ok(budget_overview(range, &mut rand::thread_rng()))
    }

    async fn simulate_budget(
        &self,
        baseline: &[ChannelMetric],
        delta_percent: f64,
    ) -> TridiumResult<BudgetSimulationResult> {
        self.wait("simulate", self.latency.simulate_latency_ms).await;
        self.simulator.simulate(baseline, delta_percent)
    }

    async fn dashboard(&self, range: DashboardRange) -> TridiumResult<DashboardSnapshot> {
        self.wait("dashboard", self.latency.dashboard_latency_ms)
            .await;
        info!(range = %range, "Serving overview dashboard");
        Ok(overview(range, &mut rand::thread_rng()))
    }

    async fn list_leads(&self, query: &str) -> TridiumResult<Vec<Lead>> {
        self.wait("leads", self.latency.leads_latency_ms).await;
        let found: Vec<Lead> = leads::search(&self.leads, query)
            .into_iter()
            .cloned()
            .collect();
        info!(query, results = found.len(), "Serving lead search");
        Ok(found)
    }

    async fn lead_timeline(&self, lead_id: &str) -> TridiumResult<LeadTimeline> {
        self.wait("timeline", self.latency.timeline_latency_ms)
            .await;
        let lead = self.find_lead(lead_id)?.clone();
        let mut events = self
            .timelines
            .get(lead_id)
            .map(|events| events.value().clone())
            .unwrap_or_default();
        events.sort_by_key(|e| e.timestamp);
        let kpis = compute_kpis(&events);

        info!(
            lead_id,
            events = events.len(),
            payment = kpis.payment_status.label(),
            "Serving lead timeline"
        );
        Ok(LeadTimeline { lead, events, kpis })
    }

    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> TridiumResult<PaymentIntent> {
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(TridiumError::invalid(format!(
                "payment amount must be a positive number, got {}",
                request.amount
            )));
        }
        if let Some(lead_id) = request.lead_id.as_deref() {
            self.find_lead(lead_id)?;
        }

        self.wait("payment", self.latency.payment_latency_ms).await;

        let intent_id = format!("mock_{}", (request.amount * 100.0).floor() as u64);
        let invoice_url = format!("{INVOICE_BASE_URL}/{intent_id}");

        if let Some(lead_id) = request.lead_id.as_deref() {
            if let Some(mut events) = self.timelines.get_mut(lead_id) {
                let event = TimelineEvent::new(
                    format!("e{}", events.len() + 1),
                    Utc::now(),
                    EventKind::PaymentIntent,
                )
                .with_meta("provider", PAYMENT_PROVIDER)
                .with_meta("method", request.method.as_str())
                .with_meta("amount", request.amount)
                .with_meta("intentId", intent_id.as_str());
                events.push(event);
            }
        }

        info!(
            intent_id = %intent_id,
            amount = request.amount,
            method = %request.method,
            lead_id = request.lead_id.as_deref().unwrap_or("-"),
            "Payment intent created"
        );
        Ok(PaymentIntent {
            intent_id,
            invoice_url: Some(invoice_url),
        })
    }
}

fn seed_leads() -> Vec<Lead> {
    let lead = |id: &str,
                name: &str,
                value: f64,
                stage: &str,
                tags: [&str; 2],
                source: [&str; 4],
                utm_source: &str| {
        let [channel, campaign, adset, creative] = source;
        let mut utm = BTreeMap::new();
        utm.insert("source".to_string(), utm_source.to_string());
        utm.insert("medium".to_string(), "paid".to_string());
        utm.insert("campaign".to_string(), campaign.to_lowercase().replace(' ', "-"));
        Lead {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            phone: None,
            value: Some(value),
            stage: Some(stage.to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            source: Some(LeadSource {
                channel: Some(channel.to_string()),
                campaign: Some(campaign.to_string()),
                adset: Some(adset.to_string()),
                creative: Some(creative.to_string()),
                utm: Some(utm),
            }),
        }
    };

    vec![
        lead(
            "LD-3021",
            "Clínica Vitta",
            1990.0,
            "Qualificação",
            ["clínica", "meta"],
            ["Meta", "Lançamento Clínicas", "SP-CPA", "IMG-101"],
            "facebook",
        ),
        lead(
            "LD-3027",
            "HopeCann",
            4970.0,
            "Proposta",
            ["cannabis", "google"],
            ["Google", "Pesquisa Clínicas", "BR-Exact", "KW-CLINICA"],
            "google",
        ),
        lead(
            "LD-3042",
            "DX Infinite 8",
            9900.0,
            "Fechamento",
            ["cursos", "tiktok"],
            ["TikTok", "Top Funil Cursos", "BR-TOF", "VID-77"],
            "tiktok",
        ),
    ]
}

/// Ad click, chat, proposal, meeting and a confirmed pix charge, spread over
/// the two hours before `now`.
fn seed_timeline(lead: &Lead, now: DateTime<Utc>) -> Vec<TimelineEvent> {
    let ago = |minutes: i64| now - Duration::minutes(minutes);
    let source = lead.source.clone().unwrap_or_default();
    let channel = source.channel.unwrap_or_else(|| "Meta".to_string());
    let amount = lead.value.unwrap_or_default();
    let intent_id = format!("mock_{}", (amount * 100.0).floor() as u64);

    vec![
        TimelineEvent::new("e1", ago(120), EventKind::AdImpression)
            .with_channel(channel.as_str())
            .with_meta("campaign", source.campaign.unwrap_or_default())
            .with_meta("adset", source.adset.unwrap_or_default())
            .with_meta("creative", source.creative.unwrap_or_default()),
        TimelineEvent::new("e2", ago(118), EventKind::AdClick)
            .with_channel(channel.as_str())
            .with_meta("url", "https://lp.tridium.com/clinicas"),
        TimelineEvent::new("e3", ago(116), EventKind::LandingPageView)
            .with_meta("lp", "/clinicas/consulta"),
        TimelineEvent::new("e4", ago(90), EventKind::ThreadMessage)
            .with_channel("whatsapp")
            .with_author("lead")
            .with_body("Oi, quero entender mais sobre agendamento."),
        TimelineEvent::new("e5", ago(88), EventKind::ThreadMessage)
            .with_channel("whatsapp")
            .with_author("agent:Yohann")
            .with_body("Claro! Posso te mandar uma proposta e um link de agenda?"),
        TimelineEvent::new("e6", ago(70), EventKind::ProposalSent)
            .with_author("agent:Yohann")
            .with_meta("proposalId", "P-8831")
            .with_meta("value", amount),
        TimelineEvent::new("e7", ago(62), EventKind::MeetingScheduled)
            .with_meta("when", (now + Duration::minutes(120)).to_rfc3339())
            .with_meta("link", "https://meet.google.com/xyz-123"),
        TimelineEvent::new("e8", ago(30), EventKind::PaymentIntent)
            .with_meta("provider", PAYMENT_PROVIDER)
            .with_meta("method", "pix")
            .with_meta("amount", amount),
        TimelineEvent::new("e9", ago(10), EventKind::PaymentConfirmed)
            .with_meta("provider", PAYMENT_PROVIDER)
            .with_meta("invoiceUrl", format!("{INVOICE_BASE_URL}/{intent_id}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PaymentMethod;
    use tridium_crm::PaymentStatus;

    fn source() -> MockDataSource {
        let config = AppConfig {
            mock: MockConfig::instant(),
            ..AppConfig::default()
        };
        MockDataSource::new(&config)
    }

    // 1. Analytics endpoints ---

    #[tokio::test]
    async fn test_attribution_and_baseline_pass_through() {
        let ds = source();
        let snap = ds
            .attribution(ReportRange::Last30Days, AttributionModelKind::MultiTouch)
            .await
            .unwrap();
        assert_eq!(snap.range, ReportRange::Last30Days);
        assert_eq!(snap.channels.len(), 3);

        let baseline = ds.budget_baseline(ReportRange::Last7Days).await.unwrap();
        assert_eq!(baseline.len(), 3);
        assert!((baseline[0].spend - 4200.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_simulate_budget_uses_configured_bounds() {
        let ds = source();
        let baseline = ds.budget_baseline(ReportRange::Last7Days).await.unwrap();

        let result = ds.simulate_budget(&baseline, 10.0).await.unwrap();
        let total: f64 = result.allocation.iter().map(|c| c.spend).sum();
        assert!((total - 9200.0 * 1.1).abs() < 1e-6);

        let err = ds.simulate_budget(&baseline, 45.0).await.unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_budget_overview_includes_curve() {
        let ds = source();
        let view = ds.budget_overview(ReportRange::Last90Days).await.unwrap();
        assert_eq!(view.range, ReportRange::Last90Days);
        assert_eq!(view.channels, load_baseline(ReportRange::Last90Days));
        assert_eq!(view.curve.len(), 32);
        assert!(view.curve.iter().all(|v| v.is_finite() && *v > 1.0));
    }

    #[tokio::test]
    async fn test_dashboard_range_is_echoed() {
        let ds = source();
        let snap = ds.dashboard(DashboardRange::Today).await.unwrap();
        assert_eq!(snap.range, DashboardRange::Today);
        assert_eq!(snap.conversations.len(), 32);
    }

    // 2. Leads and timelines ---

    #[tokio::test]
    async fn test_list_leads_filters_catalog() {
        let ds = source();
        assert_eq!(ds.list_leads("").await.unwrap().len(), 3);

        let found = ds.list_leads("tiktok").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "LD-3042");
    }

    #[tokio::test]
    async fn test_seeded_timeline_kpis() {
        let ds = source();
        let timeline = ds.lead_timeline("LD-3021").await.unwrap();
        assert_eq!(timeline.lead.name, "Clínica Vitta");
        assert_eq!(timeline.events.len(), 9);
        assert_eq!(timeline.events[0].id, "e1");
        assert_eq!(timeline.kpis.first_contact_label(), "2.0 min");
        assert_eq!(timeline.kpis.payment_status, PaymentStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_unknown_lead_is_not_found() {
        let ds = source();
        let err = ds.lead_timeline("LD-0000").await.unwrap_err();
        assert!(matches!(err, TridiumError::NotFound(_)));
    }

    // 3. Payments ---

    #[tokio::test]
    async fn test_payment_intent_ids_and_timeline_append() {
        let ds = source();
        let intent = ds
            .create_payment_intent(PaymentIntentRequest {
                lead_id: Some("LD-3027".to_string()),
                amount: 4970.0,
                method: PaymentMethod::Pix,
            })
            .await
            .unwrap();
        assert_eq!(intent.intent_id, "mock_497000");
        assert_eq!(
            intent.invoice_url.as_deref(),
            Some("https://sandbox.asaas.com/invoice/mock_497000")
        );

        let timeline = ds.lead_timeline("LD-3027").await.unwrap();
        assert_eq!(timeline.events.len(), 10);
        let last = timeline.events.last().unwrap();
        assert_eq!(last.kind, EventKind::PaymentIntent);
        assert_eq!(last.id, "e10");
        assert_eq!(timeline.kpis.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_payment_intent_floors_cents() {
        let ds = source();
        let intent = ds
            .create_payment_intent(PaymentIntentRequest {
                lead_id: None,
                amount: 19.999,
                method: PaymentMethod::Card,
            })
            .await
            .unwrap();
        assert_eq!(intent.intent_id, "mock_1999");
    }

    #[tokio::test]
    async fn test_payment_intent_rejects_bad_input() {
        let ds = source();
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = ds
                .create_payment_intent(PaymentIntentRequest {
                    lead_id: None,
                    amount,
                    method: PaymentMethod::Boleto,
                })
                .await
                .unwrap_err();
            assert!(err.is_invalid_input());
        }

        let err = ds
            .create_payment_intent(PaymentIntentRequest {
                lead_id: Some("LD-9999".to_string()),
                amount: 10.0,
                method: PaymentMethod::Pix,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TridiumError::NotFound(_)));
    }
}
