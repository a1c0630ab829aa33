//! Attribution explorer. Canned channel and conversion-path datasets scaled
//! by reporting range.

use serde::{Deserialize, Serialize};
use tridium_core::types::roi;
use tridium_core::{AttributionModelKind, ChannelMetric, ReportRange};

const BASE_CONVERSIONS: f64 = 420.0;
const BASE_REVENUE: f64 = 210_000.0;
const BASE_ROI: f64 = 2.2;

const MULTI_TOUCH_CONVERSION_UPLIFT: f64 = 1.06;
const MULTI_TOUCH_REVENUE_UPLIFT: f64 = 1.08;
const MULTI_TOUCH_ROI_BONUS: f64 = 0.2;
const MULTI_TOUCH_LIFT: f64 = 0.09;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionKpis {
    pub conversions: u64,
    pub revenue: f64,
    pub roi: f64,
    pub lift_vs_last_click: f64,
}

/// A channel row of the attribution view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedChannel {
    #[serde(flatten)]
    pub metric: ChannelMetric,
    pub cost_per_lead: f64,
    pub conversion_rate: f64,
    /// Fraction of attributed conversions.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionPath {
    pub sequence: Vec<String>,
    pub conversions: u64,
    pub revenue: f64,
    pub share: f64,
    /// Signed change in share when the model switches to last-click.
    pub delta_vs_last_click: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionSnapshot {
    pub range: ReportRange,
    pub model: AttributionModelKind,
    pub kpis: AttributionKpis,
    pub channels: Vec<AttributedChannel>,
    /// Ordered by descending share.
    pub paths: Vec<ConversionPath>,
    pub explanations: Vec<String>,
}

struct ChannelSeed {
    name: &'static str,
    /// Relative share of paid spend; absolute spend follows from the KPI ROI.
    spend_weight: f64,
    cost_per_lead: f64,
    conversion_rate: f64,
    revenue: f64,
    share: f64,
    marginal_return: f64,
}

const CHANNELS: [ChannelSeed; 3] = [
    ChannelSeed {
        name: "Meta",
        spend_weight: 4200.0,
        cost_per_lead: 16.9,
        conversion_rate: 0.12,
        revenue: 110_000.0,
        share: 0.52,
        marginal_return: 0.18,
    },
    ChannelSeed {
        name: "Google",
        spend_weight: 3800.0,
        cost_per_lead: 21.4,
        conversion_rate: 0.09,
        revenue: 72_000.0,
        share: 0.34,
        marginal_return: 0.12,
    },
    ChannelSeed {
        name: "TikTok",
        spend_weight: 1200.0,
        cost_per_lead: 12.2,
        conversion_rate: 0.08,
        revenue: 24_000.0,
        share: 0.14,
        marginal_return: 0.20,
    },
];

struct PathSeed {
    sequence: &'static [&'static str],
    conversions: f64,
    revenue: f64,
    share: f64,
    delta_vs_last_click: f64,
}

const PATHS: [PathSeed; 5] = [
    PathSeed {
        sequence: &["Meta", "WhatsApp", "Luddy"],
        conversions: 130.0,
        revenue: 68_000.0,
        share: 0.31,
        delta_vs_last_click: 0.12,
    },
    PathSeed {
        sequence: &["Google", "LP", "Luddy"],
        conversions: 90.0,
        revenue: 52_000.0,
        share: 0.24,
        delta_vs_last_click: 0.05,
    },
    PathSeed {
        sequence: &["TikTok", "DM", "Lucy", "Luddy"],
        conversions: 48.0,
        revenue: 21_000.0,
        share: 0.11,
        delta_vs_last_click: 0.03,
    },
    PathSeed {
        sequence: &["Meta", "LP", "Email", "Luddy"],
        conversions: 42.0,
        revenue: 20_000.0,
        share: 0.10,
        delta_vs_last_click: 0.02,
    },
    PathSeed {
        sequence: &["Google", "WhatsApp", "Luddy"],
        conversions: 36.0,
        revenue: 18_000.0,
        share: 0.08,
        delta_vs_last_click: -0.04,
    },
];

const EXPLANATIONS: [&str; 4] = [
    "Meta contributed to 52% of conversions with high marginal gain on early touches.",
    "Paths through DM → Lucy raise conversion probability by +18% versus a direct LP visit.",
    "Last-click underweights TikTok in top-of-funnel campaigns; multi-touch corrects share by +0.03.",
    "Sequences with an intermediate email show +12% LTV despite a higher CPL.",
];

/// Scaling factor applied to every canned volume for a reporting range.
pub fn base_factor(range: ReportRange) -> f64 {
    match range {
        ReportRange::Last7Days => 1.0,
        ReportRange::Last30Days => 1.8,
        ReportRange::Last90Days => 2.6,
    }
}

/// Build the attribution snapshot for a `(range, model)` query.
///
/// The dataset is synthetic: volumes come from a fixed catalog scaled by
/// [`base_factor`], and multi-touch adds a fixed uplift over last-click.
pub fn compute_snapshot(range: ReportRange, model: AttributionModelKind) -> AttributionSnapshot {
    let base = base_factor(range);
    let (conversion_uplift, revenue_uplift, roi_bonus, lift) = match model {
        AttributionModelKind::MultiTouch => (
            MULTI_TOUCH_CONVERSION_UPLIFT,
            MULTI_TOUCH_REVENUE_UPLIFT,
            MULTI_TOUCH_ROI_BONUS,
            MULTI_TOUCH_LIFT,
        ),
        AttributionModelKind::LastClick => (1.0, 1.0, 0.0, 0.0),
    };

    let kpis = AttributionKpis {
        conversions: scale_count(BASE_CONVERSIONS * base, conversion_uplift),
        revenue: (BASE_REVENUE * base * revenue_uplift).round(),
        roi: BASE_ROI + roi_bonus,
        lift_vs_last_click: lift,
    };

    // Channel spend is sized so the channels' combined ROI equals the KPI ROI.
    let channel_revenue: f64 = CHANNELS.iter().map(|c| (c.revenue * base).round()).sum();
    let total_spend = channel_revenue / kpis.roi;
    let total_weight: f64 = CHANNELS.iter().map(|c| c.spend_weight).sum();

    let channels = CHANNELS
        .iter()
        .map(|seed| {
            let spend = total_spend * seed.spend_weight / total_weight;
            let revenue = (seed.revenue * base).round();
            AttributedChannel {
                metric: ChannelMetric {
                    name: seed.name.to_string(),
                    spend,
                    leads: scale_count(spend / seed.cost_per_lead, 1.0),
                    revenue,
                    roi: roi(revenue, spend),
                    marginal_return: seed.marginal_return,
                },
                cost_per_lead: seed.cost_per_lead,
                conversion_rate: seed.conversion_rate,
                share: seed.share,
            }
        })
        .collect();

    let mut paths: Vec<ConversionPath> = PATHS
        .iter()
        .map(|seed| ConversionPath {
            sequence: seed.sequence.iter().map(|s| s.to_string()).collect(),
            conversions: scale_count(seed.conversions, base),
            revenue: (seed.revenue * base).round(),
            share: seed.share,
            delta_vs_last_click: seed.delta_vs_last_click,
        })
        .collect();
    paths.sort_by(|a, b| b.share.total_cmp(&a.share));

    AttributionSnapshot {
        range,
        model,
        kpis,
        channels,
        paths,
        explanations: EXPLANATIONS.iter().map(|s| s.to_string()).collect(),
    }
}

fn scale_count(value: f64, factor: f64) -> u64 {
    (value * factor).round().max(0.0) as u64
}
