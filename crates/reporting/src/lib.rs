//! Marketing analytics: attribution snapshots and budget simulation over
//! the paid channels, plus the overview dashboard.

pub mod attribution;
pub mod budget;
pub mod curves;
pub mod dashboard;

pub use attribution::{compute_snapshot, AttributionSnapshot};
pub use budget::{
    budget_overview, load_baseline, BudgetOverview, BudgetSimulationResult, BudgetSimulator,
};
pub use dashboard::{overview, DashboardRange, DashboardSnapshot};
