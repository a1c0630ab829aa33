use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::format::{format_utm, PLACEHOLDER};

/// Where a lead came from: ad channel, campaign hierarchy and UTM tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Deal value in major currency units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<LeadSource>,
}

impl Lead {
    /// Case-insensitive substring match over id, name, stage and tags.
    /// A blank query matches every lead.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let mut haystack = vec![self.id.as_str(), self.name.as_str()];
        haystack.extend(self.stage.as_deref());
        haystack.extend(self.tags.iter().map(String::as_str));
        haystack.join(" ").to_lowercase().contains(&needle)
    }

    /// Label/value rows for the origin panel, with `—` for missing fields.
    pub fn origin_rows(&self) -> Vec<(&'static str, String)> {
        let source = self.source.as_ref();
        let field = |get: fn(&LeadSource) -> Option<&String>| {
            source
                .and_then(get)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        };
        vec![
            ("Channel", field(|s| s.channel.as_ref())),
            ("Campaign", field(|s| s.campaign.as_ref())),
            ("Ad set", field(|s| s.adset.as_ref())),
            ("Creative", field(|s| s.creative.as_ref())),
            ("UTM", format_utm(source.and_then(|s| s.utm.as_ref()))),
        ]
    }
}

/// Leads matching `query`, in catalog order.
pub fn search<'a>(leads: &'a [Lead], query: &str) -> Vec<&'a Lead> {
    leads.iter().filter(|l| l.matches_query(query)).collect()
}
