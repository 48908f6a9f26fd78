use crate::collectors::Orchestrator;
use std::time::Duration;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;
use tracing::{
    error,
    info,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulerPhase {
    #[default]
    Idle,
    Scraping,
    Stopped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    pub phase: SchedulerPhase,
    pub succeeded: u64,
    pub failed: u64,
}

/// Runs a scrape immediately and then once per interval until cancelled.
///
/// Scrapes never overlap: the next tick is only awaited after the previous scrape returned, and
/// ticks missed while scraping are delayed rather than burst. Cancellation is checked before
/// sleeping and before starting a scrape, an in-flight scrape is not interrupted.
pub struct Scheduler {
    orchestrator: Orchestrator,
    interval: Duration,
    state: watch::Sender<SchedulerState>,
}

impl Scheduler {
    pub fn new(orchestrator: Orchestrator, interval: Duration) -> Self {
        let (state, _) = watch::channel(SchedulerState::default());
        Self {
            orchestrator,
            interval,
            state,
        }
    }

    pub fn state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::task::spawn(self.run(shutdown))
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval = ?self.interval, "starting scrape loop");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick completes immediately, which gives the initial scrape at startup.
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if shutdown.is_cancelled() {
                break;
            }

            self.state.send_modify(|state| state.phase = SchedulerPhase::Scraping);
            let result = self.orchestrator.scrape().await;
            if let Err(err) = &result {
                error!("collection failed: {err}");
                self.orchestrator.registry().record_scrape_error();
            }
            self.state.send_modify(|state| {
                state.phase = SchedulerPhase::Idle;
                match result {
                    Ok(_) => state.succeeded += 1,
                    Err(_) => state.failed += 1,
                }
            });
        }

        self.state.send_modify(|state| state.phase = SchedulerPhase::Stopped);
        info!("scrape loop stopped");
    }
}
