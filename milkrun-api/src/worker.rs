use milkrun_billing::LedgerService;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

/// Writes today's non-delivery record for every customer whose delivery is
/// stopped. Runs on a fixed interval; repeat runs on the same day change nothing.
pub async fn start_paused_delivery_worker(ledger: Arc<LedgerService>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Paused-delivery worker started, sweeping every {}s", every.as_secs());

    loop {
        ticker.tick().await;
        match ledger.mark_paused_customers_undelivered().await {
            Ok(0) => {}
            Ok(marked) => info!("Marked {} paused customers undelivered for {}", marked, ledger.today()),
            Err(e) if e.is_retryable() => error!("Paused-delivery sweep skipped, store unavailable: {}", e),
            Err(e) => error!("Paused-delivery sweep failed: {}", e),
        }
    }
}
