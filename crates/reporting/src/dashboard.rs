//! Marketing overview dashboard: response and inbox KPIs plus per-channel
//! ad performance, seeded by reporting range.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tridium_core::{ReportRange, TridiumError};

use crate::curves::{conversations_sparkline, DEFAULT_SPARKLINE_POINTS};

/// Dashboard ranges; unlike reports, the overview also offers `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DashboardRange {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
}

impl DashboardRange {
    fn seed(&self) -> f64 {
        match self {
            Self::Today => 0.7,
            Self::Last7Days => 1.0,
            Self::Last30Days => 2.0,
            Self::Last90Days => 3.0,
        }
    }
}

impl From<ReportRange> for DashboardRange {
    fn from(range: ReportRange) -> Self {
        match range {
            ReportRange::Last7Days => Self::Last7Days,
            ReportRange::Last30Days => Self::Last30Days,
            ReportRange::Last90Days => Self::Last90Days,
        }
    }
}

impl fmt::Display for DashboardRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::Last7Days => f.write_str("7d"),
            Self::Last30Days => f.write_str("30d"),
            Self::Last90Days => f.write_str("90d"),
        }
    }
}

impl FromStr for DashboardRange {
    type Err = TridiumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "today" => Ok(Self::Today),
            other => other.parse::<ReportRange>().map(Self::from).map_err(|_| {
                TridiumError::invalid(format!(
                    "unknown dashboard range '{other}', expected today, 7d, 30d or 90d"
                ))
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewKpis {
    /// Share of first contacts answered within five minutes.
    pub first_contact_response_rate: f64,
    pub reactivated_rate: f64,
    pub stage_advance_rate: f64,
    pub nps: f64,
    pub avg_first_response_minutes: f64,
    pub sla_breaches: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelOverview {
    pub name: String,
    pub spend: f64,
    pub leads: u64,
    pub cost_per_lead: f64,
    pub click_through_rate: f64,
    pub cost_per_mille: f64,
    pub conversion_rate: f64,
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxQueue {
    pub channel: String,
    pub open: u32,
    pub avg_wait_minutes: u32,
    /// Fraction of conversations answered within SLA.
    pub sla: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub range: DashboardRange,
    pub kpis: OverviewKpis,
    pub channels: Vec<ChannelOverview>,
    pub inbox: Vec<InboxQueue>,
    pub conversations: Vec<u32>,
}

/// Build the overview dashboard. Only the conversations sparkline draws
/// from `rng`; every other figure is a function of `range`.
pub fn overview<R: Rng + ?Sized>(range: DashboardRange, rng: &mut R) -> DashboardSnapshot {
    let s = range.seed();

    let kpis = OverviewKpis {
        first_contact_response_rate: 0.81 - 0.02 * s,
        reactivated_rate: 0.23 + 0.01 * s,
        stage_advance_rate: 0.39 + 0.005 * s,
        nps: 62.0 + 2.0 * s,
        avg_first_response_minutes: 4.2 - 0.2 * s,
        sla_breaches: (5.0 - s).max(0.0),
    };

    let channels = vec![
        ChannelOverview {
            name: "Meta".to_string(),
            spend: 4200.0 * s,
            leads: (230.0 * s).round() as u64,
            cost_per_lead: 18.0 / s,
            click_through_rate: 0.031 + 0.001 * s,
            cost_per_mille: 12.9,
            conversion_rate: 0.11 + 0.01 * s,
            roi: 2.4 + 0.1 * s,
        },
        ChannelOverview {
            name: "Google".to_string(),
            spend: 3800.0 * s,
            leads: (210.0 * s).round() as u64,
            cost_per_lead: 20.0 / s,
            click_through_rate: 0.026 + 0.001 * s,
            cost_per_mille: 14.1,
            conversion_rate: 0.09 + 0.008 * s,
            roi: 1.8 + 0.06 * s,
        },
    ];

    let inbox = [
        ("WhatsApp", 14, 2, 0.96),
        ("Instagram DM", 8, 4, 0.92),
        ("Email", 5, 12, 0.88),
        ("Site chat", 2, 1, 0.98),
    ]
    .into_iter()
    .map(|(channel, open, avg_wait_minutes, sla)| InboxQueue {
        channel: channel.to_string(),
        open,
        avg_wait_minutes,
        sla,
    })
    .collect();

    DashboardSnapshot {
        range,
        kpis,
        channels,
        inbox,
        conversations: conversations_sparkline(rng, DEFAULT_SPARKLINE_POINTS),
    }
}
