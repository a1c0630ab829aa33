use crate::error::TridiumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reporting window selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportRange {
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
}

impl ReportRange {
    pub const ALL: [ReportRange; 3] = [Self::Last7Days, Self::Last30Days, Self::Last90Days];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
        }
    }
}

impl fmt::Display for ReportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportRange {
    type Err = TridiumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            other => Err(TridiumError::invalid(format!(
                "unknown range '{other}', expected one of 7d, 30d, 90d"
            ))),
        }
    }
}

/// Rule used to split conversion credit across touchpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributionModelKind {
    #[serde(alias = "multi")]
    MultiTouch,
    #[serde(alias = "last")]
    LastClick,
}

impl AttributionModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultiTouch => "multi-touch",
            Self::LastClick => "last-click",
        }
    }
}

impl fmt::Display for AttributionModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributionModelKind {
    type Err = TridiumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "multi-touch" | "multi" => Ok(Self::MultiTouch),
            "last-click" | "last" => Ok(Self::LastClick),
            other => Err(TridiumError::invalid(format!(
                "unknown attribution model '{other}', expected multi-touch or last-click"
            ))),
        }
    }
}

/// One advertising channel's performance in a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetric {
    pub name: String,
    pub spend: f64,
    pub leads: u64,
    pub revenue: f64,
    /// `revenue / max(spend, 1)`
    pub roi: f64,
    /// Expected revenue from the next unit of budget; only used for ranking.
    pub marginal_return: f64,
}

impl ChannelMetric {
    /// Build a channel, deriving `roi` from `revenue` and `spend`.
    pub fn new(
        name: impl Into<String>,
        spend: f64,
        leads: u64,
        revenue: f64,
        marginal_return: f64,
    ) -> Self {
        Self {
            name: name.into(),
            spend,
            leads,
            revenue,
            roi: roi(revenue, spend),
            marginal_return,
        }
    }
}

/// Revenue over spend, with spend floored at 1 so it never divides by zero.
pub fn roi(revenue: f64, spend: f64) -> f64 {
    revenue / spend.max(1.0)
}
