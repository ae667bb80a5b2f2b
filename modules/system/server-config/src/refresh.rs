use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::source::{RefreshOutcome, RefreshableConfigSource};

/// Refresh `source` every `interval` until `cancel` fires.
///
/// The first run happens one interval after spawn; callers refresh once
/// themselves before serving. Cancellation is observed between runs.
pub fn spawn_refresh_task(
    source: Arc<RefreshableConfigSource>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval_secs = interval.as_secs(), "server config refresh task started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => match source.refresh().await {
                    Ok(RefreshOutcome::Refreshed { changed }) if changed > 0 => {
                        tracing::debug!(changed, "server config refreshed");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "server config refresh failed"),
                },
            }
        }
        tracing::info!("server config refresh task stopped");
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::memory::InMemoryServerConfigRepository;
    use crate::model::{CLUSTER_NAME_DEFAULT, ConfigEntry};

    #[tokio::test(start_paused = true)]
    async fn picks_up_store_changes_and_stops_on_cancel() {
        let repo = Arc::new(InMemoryServerConfigRepository::new(vec![ConfigEntry::new(
            "x",
            "1",
            CLUSTER_NAME_DEFAULT,
        )]));
        let source = Arc::new(RefreshableConfigSource::new(repo.clone(), "", None));
        let cancel = CancellationToken::new();

        let handle = spawn_refresh_task(Arc::clone(&source), Duration::from_secs(60), cancel.clone());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(source.snapshot().get("x"), Some("1"));

        repo.replace(vec![ConfigEntry::new("x", "2", CLUSTER_NAME_DEFAULT)]);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.snapshot().get("x"), Some("2"));

        cancel.cancel();
        handle.await.unwrap();
    }
}
