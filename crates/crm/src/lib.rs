//! CRM 360: per-lead lifecycle timelines (ad → chat → payment) and the
//! helpers that render lead origin metadata.

pub mod format;
pub mod leads;
pub mod timeline;

pub use format::{format_metadata, format_utc, format_utm};
pub use leads::{Lead, LeadSource};
pub use timeline::{
    compute_kpis, EventCategory, EventKind, PaymentStatus, TimelineEvent, TimelineFilter,
    TimelineKpis,
};
