//! Budget co-pilot: per-channel baselines and one-step reallocation of a
//! total-budget change along a saturating response curve.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tridium_core::config::ReportingConfig;
use tridium_core::types::roi;
use tridium_core::{ChannelMetric, ReportRange, TridiumError, TridiumResult};

use crate::curves::{response_curve, DEFAULT_CURVE_POINTS};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Aggregate KPIs over a set of channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_spend: f64,
    pub total_leads: u64,
    pub total_revenue: f64,
    /// `total_revenue / max(1, total_spend)`
    pub roi: f64,
}

impl BudgetSummary {
    pub fn of(channels: &[ChannelMetric]) -> Self {
        let total_spend: f64 = channels.iter().map(|c| c.spend).sum();
        let total_leads: u64 = channels.iter().map(|c| c.leads).sum();
        let total_revenue: f64 = channels.iter().map(|c| c.revenue).sum();
        Self {
            total_spend,
            total_leads,
            total_revenue,
            roi: roi(total_revenue, total_spend),
        }
    }
}

/// What the co-pilot shows before any change: the baseline channels, their
/// totals and the diminishing-returns chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetOverview {
    pub range: ReportRange,
    pub channels: Vec<ChannelMetric>,
    pub summary: BudgetSummary,
    pub curve: Vec<f64>,
}

/// Output of applying a total-budget change to a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSimulationResult {
    pub delta_percent: f64,
    /// Same channel set and order as the baseline.
    pub allocation: Vec<ChannelMetric>,
    /// Fractional revenue change versus the baseline; may be negative.
    pub uplift: f64,
    pub note: String,
    pub summary: BudgetSummary,
}

/// Diminishing-returns model used to re-derive leads and revenue from spend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseCurve {
    pub leads_per_sqrt_spend: f64,
    pub floor_multiplier: f64,
    pub min_spend: f64,
}

impl ResponseCurve {
    pub fn from_config(config: &ReportingConfig) -> Self {
        Self {
            leads_per_sqrt_spend: config.leads_per_sqrt_spend,
            floor_multiplier: config.revenue_floor_multiplier,
            min_spend: config.min_curve_spend,
        }
    }

    pub fn leads(&self, spend: f64) -> u64 {
        (spend.max(0.0).sqrt() * self.leads_per_sqrt_spend).round() as u64
    }

    pub fn revenue(&self, spend: f64) -> f64 {
        let multiplier = spend.max(self.min_spend).log10().max(self.floor_multiplier);
        spend * multiplier
    }

    /// Copy of `channel` at a new spend level, with leads, revenue and ROI
    /// recomputed through the curve.
    pub fn apply(&self, channel: &ChannelMetric, spend: f64) -> ChannelMetric {
        let revenue = self.revenue(spend);
        ChannelMetric {
            name: channel.name.clone(),
            spend,
            leads: self.leads(spend),
            revenue,
            roi: roi(revenue, spend),
            marginal_return: channel.marginal_return,
        }
    }
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self::from_config(&ReportingConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Baselines
// ---------------------------------------------------------------------------

struct BaselineSeed {
    name: &'static str,
    spend: f64,
    leads: f64,
    roi: f64,
    marginal_return: f64,
}

const BASELINE: [BaselineSeed; 3] = [
    BaselineSeed {
        name: "Meta",
        spend: 4200.0,
        leads: 230.0,
        roi: 2.4,
        marginal_return: 0.18,
    },
    BaselineSeed {
        name: "Google",
        spend: 3800.0,
        leads: 210.0,
        roi: 1.8,
        marginal_return: 0.12,
    },
    BaselineSeed {
        name: "TikTok",
        spend: 1200.0,
        leads: 110.0,
        roi: 1.6,
        marginal_return: 0.20,
    },
];

fn baseline_factor(range: ReportRange) -> f64 {
    match range {
        ReportRange::Last7Days => 1.0,
        ReportRange::Last30Days => 1.8,
        ReportRange::Last90Days => 2.7,
    }
}

/// Canned per-channel spend, leads and revenue for a reporting range.
pub fn load_baseline(range: ReportRange) -> Vec<ChannelMetric> {
    let f = baseline_factor(range);
    BASELINE
        .iter()
        .map(|seed| {
            let spend = seed.spend * f;
            ChannelMetric::new(
                seed.name,
                spend,
                (seed.leads * f).round() as u64,
                spend * seed.roi,
                seed.marginal_return,
            )
        })
        .collect()
}

/// Baseline for `range` plus a freshly jittered response curve.
pub fn budget_overview<R: Rng + ?Sized>(range: ReportRange, rng: &mut R) -> BudgetOverview {
    let channels = load_baseline(range);
    BudgetOverview {
        range,
        summary: BudgetSummary::of(&channels),
        channels,
        curve: response_curve(rng, DEFAULT_CURVE_POINTS),
    }
}

// ---------------------------------------------------------------------------
// BudgetSimulator
// ---------------------------------------------------------------------------

/// Greedy one-step budget reallocation.
///
/// A positive change goes entirely to the channel with the highest marginal
/// return; a negative change is taken from the channel with the lowest. Middle
/// channels are left untouched. This does not iterate towards equal marginal
/// ROI.
#[derive(Debug, Clone)]
pub struct BudgetSimulator {
    curve: ResponseCurve,
    max_delta_percent: f64,
}

impl BudgetSimulator {
    pub fn new(config: &ReportingConfig) -> Self {
        Self {
            curve: ResponseCurve::from_config(config),
            max_delta_percent: config.max_delta_percent,
        }
    }

    /// Apply a `delta_percent` change of the total budget to `baseline`.
    ///
    /// Cuts never take a channel below zero spend: whatever the lowest-ranked
    /// channel cannot give is taken from the next-lowest, so the total always
    /// ends at `baseline_total * (1 + delta_percent / 100)`.
    pub fn simulate(
        &self,
        baseline: &[ChannelMetric],
        delta_percent: f64,
    ) -> TridiumResult<BudgetSimulationResult> {
        self.validate_delta(delta_percent)?;
        validate_baseline(baseline)?;

        let total_spend: f64 = baseline.iter().map(|c| c.spend).sum();
        let shift = total_spend * delta_percent / 100.0;

        // Stable sort keeps catalog order among channels with equal returns.
        let mut ranked: Vec<usize> = (0..baseline.len()).collect();
        ranked.sort_by(|&a, &b| {
            baseline[b]
                .marginal_return
                .total_cmp(&baseline[a].marginal_return)
        });
        let (Some(&best), Some(&worst)) = (ranked.first(), ranked.last()) else {
            return Err(TridiumError::invalid("baseline has no channels"));
        };

        let mut spend: Vec<f64> = baseline.iter().map(|c| c.spend).collect();
        let mut touched = vec![false; baseline.len()];

        if shift > 0.0 {
            spend[best] += shift;
            touched[best] = true;
        } else if shift < 0.0 {
            let mut remaining = -shift;
            for &idx in ranked.iter().rev() {
                if remaining <= 0.0 {
                    break;
                }
                let cut = remaining.min(spend[idx]);
                if cut > 0.0 {
                    spend[idx] -= cut;
                    touched[idx] = true;
                    remaining -= cut;
                }
            }
        }

        let allocation: Vec<ChannelMetric> = baseline
            .iter()
            .zip(spend.iter().zip(&touched))
            .map(|(channel, (&new_spend, &changed))| {
                if changed {
                    self.curve.apply(channel, new_spend)
                } else {
                    channel.clone()
                }
            })
            .collect();

        let revenue_before: f64 = baseline.iter().map(|c| c.revenue).sum();
        let revenue_after: f64 = allocation.iter().map(|c| c.revenue).sum();
        let uplift = (revenue_after - revenue_before) / revenue_before.max(1.0);

        let note = format!(
            "{:+}% total (from {} → {})",
            delta_percent, baseline[worst].name, baseline[best].name
        );

        debug!(
            delta_percent,
            shift,
            best = %baseline[best].name,
            worst = %baseline[worst].name,
            uplift,
            "Simulated budget reallocation"
        );

        let summary = BudgetSummary::of(&allocation);
        Ok(BudgetSimulationResult {
            delta_percent,
            allocation,
            uplift,
            note,
            summary,
        })
    }

    fn validate_delta(&self, delta_percent: f64) -> TridiumResult<()> {
        if !delta_percent.is_finite() {
            return Err(TridiumError::invalid("delta percent must be a finite number"));
        }
        let bound = self.max_delta_percent.min(100.0);
        if !bound.is_finite() || bound <= 0.0 {
            return Err(TridiumError::Config(format!(
                "max delta percent must be positive, got {}",
                self.max_delta_percent
            )));
        }
        if delta_percent.abs() > bound {
            return Err(TridiumError::invalid(format!(
                "delta percent {delta_percent} outside [-{bound}, {bound}]"
            )));
        }
        Ok(())
    }
}

impl Default for BudgetSimulator {
    fn default() -> Self {
        Self::new(&ReportingConfig::default())
    }
}

fn validate_baseline(baseline: &[ChannelMetric]) -> TridiumResult<()> {
    if baseline.is_empty() {
        return Err(TridiumError::invalid(
            "baseline must contain at least one channel",
        ));
    }
    for channel in baseline {
        let valid = channel.spend.is_finite()
            && channel.spend >= 0.0
            && channel.revenue.is_finite()
            && channel.revenue >= 0.0
            && channel.marginal_return.is_finite();
        if !valid {
            return Err(TridiumError::invalid(format!(
                "channel '{}' has negative or non-finite values",
                channel.name
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn spend_of(channels: &[ChannelMetric], name: &str) -> f64 {
        channels.iter().find(|c| c.name == name).unwrap().spend
    }

    fn total_spend(channels: &[ChannelMetric]) -> f64 {
        channels.iter().map(|c| c.spend).sum()
    }

    // 1. Baselines ----------------------------------------------------------

    #[test]
    fn test_baseline_scales_by_range() {
        let week = load_baseline(ReportRange::Last7Days);
        assert_eq!(week.len(), 3);
        assert!((total_spend(&week) - 9_200.0).abs() < 1e-9);
        assert_eq!(week[0].leads, 230);
        assert!((week[0].roi - 2.4).abs() < 1e-9);

        let quarter = load_baseline(ReportRange::Last90Days);
        assert!((total_spend(&quarter) - 24_840.0).abs() < 1e-6);
        assert_eq!(quarter[2].leads, 297);
    }

    #[test]
    fn test_overview_carries_baseline_and_curve() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(7);
        let view = budget_overview(ReportRange::Last30Days, &mut rng);
        assert_eq!(view.range, ReportRange::Last30Days);
        assert_eq!(view.channels, load_baseline(ReportRange::Last30Days));
        assert!((view.summary.total_spend - 9_200.0 * 1.8).abs() < 1e-6);
        assert_eq!(view.curve.len(), DEFAULT_CURVE_POINTS);
        assert!(view.curve.windows(2).all(|w| w[1] > w[0] - 0.8));
    }

    // 2. Zero delta is a no-op ----------------------------------------------

    #[test]
    fn test_zero_delta_keeps_baseline() {
        let baseline = load_baseline(ReportRange::Last30Days);
        let result = BudgetSimulator::default().simulate(&baseline, 0.0).unwrap();

        assert!(result.uplift.abs() < f64::EPSILON);
        assert_eq!(result.allocation, baseline);
        assert!(result.note.starts_with("+0% total"));
    }

    // 3. Positive delta goes to the best channel ----------------------------

    #[test]
    fn test_positive_delta_feeds_best_channel() {
        let baseline = load_baseline(ReportRange::Last30Days);
        let result = BudgetSimulator::default().simulate(&baseline, 10.0).unwrap();

        // TikTok has the highest marginal return, Google the lowest.
        assert!(spend_of(&result.allocation, "TikTok") > spend_of(&baseline, "TikTok"));
        assert!(
            (spend_of(&result.allocation, "Google") - spend_of(&baseline, "Google")).abs()
                < f64::EPSILON
        );
        assert!(
            (spend_of(&result.allocation, "Meta") - spend_of(&baseline, "Meta")).abs()
                < f64::EPSILON
        );

        let expected = total_spend(&baseline) * 1.10;
        assert!((total_spend(&result.allocation) - expected).abs() < 1e-6);
        assert!((result.summary.total_spend - expected).abs() < 1e-6);
        assert_eq!(result.note, "+10% total (from Google → TikTok)");
        assert!(result.uplift > 0.0);
    }

    // 4. Negative delta comes from the worst channel ------------------------

    #[test]
    fn test_negative_delta_cuts_worst_channel() {
        let baseline = load_baseline(ReportRange::Last7Days);
        let result = BudgetSimulator::default().simulate(&baseline, -10.0).unwrap();

        assert!((spend_of(&result.allocation, "Google") - 2_880.0).abs() < 1e-9);
        assert!((spend_of(&result.allocation, "TikTok") - 1_200.0).abs() < f64::EPSILON);
        assert!((spend_of(&result.allocation, "Meta") - 4_200.0).abs() < f64::EPSILON);
        assert!((total_spend(&result.allocation) - 8_280.0).abs() < 1e-9);
        assert_eq!(result.note, "-10% total (from Google → TikTok)");
    }

    // 5. Response curve -----------------------------------------------------

    #[test]
    fn test_reallocated_channel_follows_response_curve() {
        let baseline = load_baseline(ReportRange::Last7Days);
        let result = BudgetSimulator::default().simulate(&baseline, 10.0).unwrap();

        let tiktok = result
            .allocation
            .iter()
            .find(|c| c.name == "TikTok")
            .unwrap();
        // 1200 + 920 = 2120
        assert!((tiktok.spend - 2_120.0).abs() < 1e-9);
        assert_eq!(tiktok.leads, (2_120f64.sqrt() * 11.0).round() as u64);
        assert!((tiktok.revenue - 2_120.0 * 2_120f64.log10()).abs() < 1e-6);
        assert!((tiktok.roi - 2_120f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn test_curve_guards_small_spend() {
        let curve = ResponseCurve::default();
        // log10(10) = 1 < 1.2, so the floor multiplier applies
        assert!((curve.revenue(0.0)).abs() < f64::EPSILON);
        assert!((curve.revenue(5.0) - 6.0).abs() < 1e-9);
        assert!((curve.revenue(100.0) - 200.0).abs() < 1e-9);
        assert_eq!(curve.leads(0.0), 0);
        assert_eq!(curve.leads(100.0), 110);

        let zero = curve.apply(&ChannelMetric::new("X", 10.0, 1, 12.0, 0.1), 0.0);
        assert!(zero.roi.abs() < f64::EPSILON);
    }

    // 6. Cuts never go below zero -------------------------------------------

    #[test]
    fn test_large_cut_carries_to_next_lowest() {
        let baseline = vec![
            ChannelMetric::new("A", 100.0, 10, 250.0, 0.3),
            ChannelMetric::new("B", 50.0, 5, 60.0, 0.1),
            ChannelMetric::new("C", 850.0, 80, 1_500.0, 0.2),
        ];
        let result = BudgetSimulator::default().simulate(&baseline, -30.0).unwrap();

        assert!(spend_of(&result.allocation, "B").abs() < f64::EPSILON);
        assert!((spend_of(&result.allocation, "C") - 600.0).abs() < 1e-9);
        assert!((spend_of(&result.allocation, "A") - 100.0).abs() < f64::EPSILON);
        assert!((total_spend(&result.allocation) - 700.0).abs() < 1e-9);
        assert!(result.allocation.iter().all(|c| c.spend >= 0.0));
    }

    #[test]
    fn test_single_channel_receives_whole_change() {
        let baseline = vec![ChannelMetric::new("Meta", 1_000.0, 100, 2_000.0, 0.2)];
        let up = BudgetSimulator::default().simulate(&baseline, 20.0).unwrap();
        assert!((up.allocation[0].spend - 1_200.0).abs() < 1e-9);

        let down = BudgetSimulator::default().simulate(&baseline, -20.0).unwrap();
        assert!((down.allocation[0].spend - 800.0).abs() < 1e-9);
    }

    // 7. Invalid input ------------------------------------------------------

    #[test]
    fn test_empty_baseline_rejected() {
        let err = BudgetSimulator::default().simulate(&[], 10.0).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_non_finite_or_out_of_range_delta_rejected() {
        let baseline = load_baseline(ReportRange::Last7Days);
        let sim = BudgetSimulator::default();
        assert!(sim.simulate(&baseline, f64::NAN).unwrap_err().is_invalid_input());
        assert!(sim
            .simulate(&baseline, f64::INFINITY)
            .unwrap_err()
            .is_invalid_input());
        assert!(sim.simulate(&baseline, 30.5).unwrap_err().is_invalid_input());
        assert!(sim.simulate(&baseline, -31.0).unwrap_err().is_invalid_input());
        assert!(sim.simulate(&baseline, 30.0).is_ok());
        assert!(sim.simulate(&baseline, -30.0).is_ok());
    }

    #[test]
    fn test_non_positive_bound_is_a_config_error() {
        let baseline = load_baseline(ReportRange::Last7Days);
        let sim = BudgetSimulator::new(&ReportingConfig {
            max_delta_percent: -5.0,
            ..ReportingConfig::default()
        });
        let err = sim.simulate(&baseline, 0.0).unwrap_err();
        assert!(matches!(err, TridiumError::Config(_)));
    }

    #[test]
    fn test_malformed_channel_rejected() {
        let baseline = vec![
            ChannelMetric::new("Meta", 4_200.0, 230, 10_080.0, 0.18),
            ChannelMetric::new("Broken", -5.0, 0, 0.0, 0.1),
        ];
        let err = BudgetSimulator::default().simulate(&baseline, 5.0).unwrap_err();
        assert!(err.is_invalid_input());
    }

    // 8. Summary ------------------------------------------------------------

    #[test]
    fn test_summary_totals() {
        let baseline = load_baseline(ReportRange::Last7Days);
        let summary = BudgetSummary::of(&baseline);
        assert!((summary.total_spend - 9_200.0).abs() < 1e-9);
        assert_eq!(summary.total_leads, 550);
        // (10080 + 6840 + 1920) / 9200
        assert!((summary.roi - 18_840.0 / 9_200.0).abs() < 1e-9);
    }
}
