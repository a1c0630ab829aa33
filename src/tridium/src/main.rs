//! Tridium: marketing analytics and CRM 360 over the mock data source.
//!
//! Each subcommand issues one request against the data source and prints
//! the response as pretty JSON on stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use tridium_core::{AppConfig, AttributionModelKind, ReportRange};
use tridium_crm::{format_metadata, format_utc, TimelineFilter};
use tridium_provider::{
    simulate_latest, DataSource, MockDataSource, PaymentIntentRequest, PaymentMethod,
};
use tridium_reporting::DashboardRange;

#[derive(Parser, Debug)]
#[command(name = "tridium")]
#[command(about = "Marketing attribution, budget simulation and lead timelines")]
#[command(version)]
struct Cli {
    /// Answer immediately instead of simulating network latency
    #[arg(long, global = true, default_value_t = false)]
    no_latency: bool,

    /// Latency multiplier for the mock source (overrides config)
    #[arg(long, global = true, env = "TRIDIUM__MOCK__LATENCY_SCALE")]
    latency_scale: Option<f64>,

    /// Largest accepted budget change in percent (overrides config)
    #[arg(long, global = true, env = "TRIDIUM__REPORTING__MAX_DELTA_PERCENT")]
    max_delta: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Channel and path attribution for a reporting range
    Attribution {
        #[arg(long, default_value = "30d")]
        range: ReportRange,
        #[arg(long, default_value = "multi-touch")]
        model: AttributionModelKind,
    },
    /// Budget baseline, optionally with one or more simulated total changes
    Budget {
        #[arg(long, default_value = "30d")]
        range: ReportRange,
        /// Total budget change in percent; repeat to simulate a slider drag,
        /// the last value wins
        #[arg(long, allow_negative_numbers = true)]
        delta: Vec<f64>,
    },
    /// Overview dashboard
    Dashboard {
        #[arg(long, default_value = "7d")]
        range: DashboardRange,
    },
    /// Search the lead catalog
    Leads {
        #[arg(default_value = "")]
        query: String,
    },
    /// Lifecycle timeline of one lead
    Timeline {
        lead_id: String,
        #[arg(long)]
        hide_ads: bool,
        #[arg(long)]
        hide_chat: bool,
        #[arg(long)]
        hide_system: bool,
        #[arg(long)]
        hide_payments: bool,
    },
    /// Create a payment intent
    Pay {
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "pix")]
        method: PaymentMethod,
        #[arg(long)]
        lead: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tridium=info".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(scale) = cli.latency_scale {
        config.mock.latency_scale = scale;
    }
    if cli.no_latency {
        config.mock.latency_scale = 0.0;
    }
    if let Some(max_delta) = cli.max_delta {
        config.reporting.max_delta_percent = max_delta;
    }
    config.validate()?;

    info!(
        latency_scale = config.mock.latency_scale,
        max_delta_percent = config.reporting.max_delta_percent,
        "Configuration loaded"
    );

    let source = Arc::new(MockDataSource::new(&config));

    match cli.command {
        Command::Attribution { range, model } => {
            print_json(&source.attribution(range, model).await?)?;
        }
        Command::Budget { range, delta } => {
            let view = source.budget_overview(range).await?;
            if delta.is_empty() {
                print_json(&view)?;
            } else {
                let result = simulate_latest(source, view.channels, &delta).await?;
                print_json(&result)?;
            }
        }
        Command::Dashboard { range } => {
            print_json(&source.dashboard(range).await?)?;
        }
        Command::Leads { query } => {
            print_json(&source.list_leads(&query).await?)?;
        }
        Command::Timeline {
            lead_id,
            hide_ads,
            hide_chat,
            hide_system,
            hide_payments,
        } => {
            let filter = TimelineFilter {
                ads: !hide_ads,
                chat: !hide_chat,
                system: !hide_system,
                payments: !hide_payments,
            };
            let timeline = source.lead_timeline(&lead_id).await?;
            let events: Vec<_> = filter
                .apply(&timeline.events)
                .into_iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "at": format_utc(e.timestamp),
                        "kind": e.kind.as_str(),
                        "channel": e.channel,
                        "author": e.author,
                        "body": e.body,
                        "meta": format_metadata(e.metadata.as_ref()),
                    })
                })
                .collect();
            let origin: serde_json::Map<String, serde_json::Value> = timeline
                .lead
                .origin_rows()
                .into_iter()
                .map(|(label, value)| (label.to_string(), value.into()))
                .collect();

            print_json(&json!({
                "lead": timeline.lead,
                "origin": origin,
                "first_contact": timeline.kpis.first_contact_label(),
                "payment_status": timeline.kpis.payment_status.label(),
                "events": events,
            }))?;
        }
        Command::Pay {
            amount,
            method,
            lead,
        } => {
            let intent = source
                .create_payment_intent(PaymentIntentRequest {
                    lead_id: lead,
                    amount,
                    method,
                })
                .await?;
            print_json(&intent)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
