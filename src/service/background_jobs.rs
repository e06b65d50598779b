// service/background_jobs.rs
use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::AppState;

/// Periodic reconciliation of payments stuck in flight. Webhooks are the
/// primary settlement path; this sweep catches deliveries that never
/// arrived.
pub async fn start_payment_reconciliation_job(app_state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(600));

    loop {
        interval.tick().await;

        tracing::debug!("running payment reconciliation sweep at {}", Utc::now());

        match app_state.payment_service.reconcile_stuck_payments().await {
            Ok(0) => {}
            Ok(n) => tracing::info!("payment reconciliation settled {} payments", n),
            Err(e) => tracing::error!("payment reconciliation sweep failed: {}", e),
        }
    }
}
