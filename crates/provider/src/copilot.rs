//! Budget co-pilot requests driven by a slider: many overlapping
//! simulations, only the newest one counts.

use std::sync::Arc;
use tracing::debug;
use tridium_core::{ChannelMetric, TridiumError, TridiumResult};
use tridium_reporting::BudgetSimulationResult;

use crate::latest::LatestSlot;
use crate::source::DataSource;

/// Run one simulation per delta concurrently and return the outcome of the
/// last delta. Results and errors of older requests are discarded.
pub async fn simulate_latest<D>(
    source: Arc<D>,
    baseline: Vec<ChannelMetric>,
    deltas: &[f64],
) -> TridiumResult<BudgetSimulationResult>
where
    D: DataSource + 'static,
{
    if deltas.is_empty() {
        return Err(TridiumError::invalid("at least one budget change is required"));
    }

    let slot = Arc::new(LatestSlot::new());
    let baseline = Arc::new(baseline);

    let mut handles = Vec::with_capacity(deltas.len());
    for &delta in deltas {
        let ticket = slot.issue();
        let slot = Arc::clone(&slot);
        let source = Arc::clone(&source);
        let baseline = Arc::clone(&baseline);
        let handle = tokio::spawn(async move {
            let result = source.simulate_budget(&baseline, delta).await?;
            slot.apply(ticket, result);
            Ok::<(), TridiumError>(())
        });
        handles.push((delta, handle));
    }

    let newest = handles.len() - 1;
    let mut outcome = Ok(());
    for (idx, (delta, handle)) in handles.into_iter().enumerate() {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(TridiumError::Internal(e.into())),
        };
        if idx == newest {
            outcome = result;
        } else if let Err(e) = result {
            debug!(delta, error = %e, "Discarding failed stale simulation");
        }
    }
    outcome?;

    slot.take().ok_or_else(|| {
        TridiumError::Internal(anyhow::anyhow!("newest simulation stored no result"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDataSource;
    use tridium_core::config::MockConfig;
    use tridium_core::{AppConfig, ReportRange};
    use tridium_reporting::load_baseline;

    fn source() -> Arc<MockDataSource> {
        let config = AppConfig {
            mock: MockConfig::instant(),
            ..AppConfig::default()
        };
        Arc::new(MockDataSource::new(&config))
    }

    #[tokio::test]
    async fn test_last_delta_wins() {
        let baseline = load_baseline(ReportRange::Last7Days);
        let result = simulate_latest(source(), baseline, &[5.0, -10.0, 10.0])
            .await
            .unwrap();
        assert!((result.delta_percent - 10.0).abs() < f64::EPSILON);
        assert!((result.summary.total_spend - 9_200.0 * 1.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_stale_failure_is_ignored() {
        let baseline = load_baseline(ReportRange::Last7Days);
        let result = simulate_latest(source(), baseline, &[50.0, 10.0])
            .await
            .unwrap();
        assert!((result.delta_percent - 10.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_newest_failure_is_returned() {
        let baseline = load_baseline(ReportRange::Last7Days);
        let err = simulate_latest(source(), baseline, &[10.0, 50.0])
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_no_deltas_rejected() {
        let baseline = load_baseline(ReportRange::Last7Days);
        let err = simulate_latest(source(), baseline, &[]).await.unwrap_err();
        assert!(err.is_invalid_input());
    }
}
