use std::{sync::Arc, time::Duration};

use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{fetcher::ProxyFetcher, pool::ProxyPool};

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Wakes the scheduler for an out-of-band refresh.
#[derive(Clone, Default)]
pub struct RefreshTrigger(Arc<Notify>);

impl RefreshTrigger {
    pub fn fire(&self) {
        self.0.notify_one();
    }

    /// Completes on the next `fire`, or immediately if one is already pending.
    pub async fn fired(&self) {
        self.0.notified().await;
    }
}

pub struct RefreshHandle {
    trigger: RefreshTrigger,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!("Proxy refresh task ended abnormally: {}", e);
        }
    }
}

/// Periodically replaces the pool with freshly validated relays.
pub struct RefreshScheduler {
    pool: Arc<ProxyPool>,
    fetcher: Arc<dyn ProxyFetcher>,
    interval: Duration,
    refresh_on_start: bool,
}

impl RefreshScheduler {
    pub fn new(pool: Arc<ProxyPool>, fetcher: Arc<dyn ProxyFetcher>, interval: Duration) -> Self {
        Self {
            pool,
            fetcher,
            interval: interval.max(MIN_INTERVAL),
            refresh_on_start: true,
        }
    }

    pub fn refresh_on_start(mut self, enabled: bool) -> Self {
        self.refresh_on_start = enabled;
        self
    }

    /// Runs one fetch. An empty result leaves the pool untouched.
    pub async fn refresh_once(&self) -> usize {
        info!("Refreshing proxies...");
        let fresh = self.fetcher.fetch_candidates().await;
        if fresh.is_empty() {
            warn!(
                "Proxy refresh found no working proxies, keeping {} existing",
                self.pool.len()
            );
            return 0;
        }

        let count = fresh.len();
        self.pool.replace_all(fresh);
        count
    }

    pub fn spawn(self, cancel: CancellationToken) -> RefreshHandle {
        let trigger = RefreshTrigger::default();
        let task = tokio::spawn(self.run(trigger.clone(), cancel));
        RefreshHandle { trigger, task }
    }

    async fn run(self, trigger: RefreshTrigger, cancel: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.refresh_on_start {
            // The first tick completes immediately.
            ticker.tick().await;
        }

        info!("Proxy refresh scheduled every {}s", self.interval.as_secs());

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                _ = trigger.fired() => ticker.reset(),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.refresh_once() => {}
            }
        }

        info!("Proxy refresh stopped");
    }
}
