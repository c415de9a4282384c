//! Periodic repricing of local-currency car prices.
//!
//! One cycle fetches the exchange rate, loads every repriceable car and
//! writes a new `price_kzt` where the rounded candidate moved by more than
//! the materiality threshold. A rate failure abandons the cycle before any
//! write; a failed write for one car does not stop the others.
//!
//! Writes are not serialised with reservations. A car reserved between the
//! eligibility read and its price write still receives the new price. The
//! price of a reserved car is informational, so this race is accepted.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    CarStoreError, ExchangeRate, RateSourceError, RepricingCandidate,
};

mod policy;
mod runtime;

pub use policy::{PriceDecision, RepricingPolicy};
pub use runtime::{PricingWorkerPorts, PricingWorkerRuntime, Sleeper, TokioSleeper};

/// Worker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingWorkerConfig {
    /// Delay between the end of one cycle and the start of the next.
    pub period: Duration,
    /// Local-currency rounding granularity; `None` keeps the raw product.
    pub rounding_step: Option<f64>,
    /// Minimum absolute change that triggers a write.
    pub materiality_threshold: f64,
    /// Bound applied to each rate fetch and store call.
    pub call_timeout: Duration,
}

impl Default for PricingWorkerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(24 * 60 * 60),
            rounding_step: Some(1_000.0),
            materiality_threshold: 100.0,
            call_timeout: Duration::from_secs(5),
        }
    }
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Rate fetched at the start of the cycle.
    pub rate: ExchangeRate,
    /// Cars returned by the eligibility query.
    pub evaluated: usize,
    /// Cars whose new price was written.
    pub updated: usize,
    /// Cars whose candidate was within the threshold.
    pub unchanged: usize,
    /// Cars whose write failed or timed out.
    pub failed: usize,
    /// When the rate fetch began.
    pub started_at: DateTime<Utc>,
    /// When the last car was processed.
    pub finished_at: DateTime<Utc>,
}

/// Reason a cycle was abandoned before evaluating any car.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleSkipped {
    /// The rate source failed or timed out.
    #[error("exchange rate unavailable: {0}")]
    RateUnavailable(RateSourceError),
    /// The eligible-car query failed or timed out.
    #[error("eligible cars unavailable: {0}")]
    InventoryUnavailable(CarStoreError),
}

/// Observable worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for the next tick. Shutdown is only observed here.
    Idle,
    /// A cycle is in progress; it always runs to completion.
    RunningCycle,
    /// The loop has exited after a shutdown request.
    Stopped,
}

/// Background repricing worker.
pub struct PricingWorker {
    ports: PricingWorkerPorts,
    runtime: PricingWorkerRuntime,
    policy: RepricingPolicy,
    config: PricingWorkerConfig,
}

impl PricingWorker {
    /// Build a worker with the tokio sleeper and system clock.
    pub fn new(ports: PricingWorkerPorts, config: PricingWorkerConfig) -> Self {
        Self::with_runtime(ports, PricingWorkerRuntime::default(), config)
    }

    /// Build a worker with injected time sources. Tests pass a parked
    /// sleeper and a controllable clock.
    pub fn with_runtime(
        ports: PricingWorkerPorts,
        runtime: PricingWorkerRuntime,
        config: PricingWorkerConfig,
    ) -> Self {
        Self {
            policy: RepricingPolicy::new(config.rounding_step, config.materiality_threshold),
            ports,
            runtime,
            config,
        }
    }

    /// Execute one cycle and log its result.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleSkipped> {
        let started_at = self.runtime.clock.utc();

        let rate = match self.fetch_rate().await {
            Ok(rate) => rate,
            Err(err) => {
                warn!(error = %err, "pricing cycle skipped: rate fetch failed");
                return Err(CycleSkipped::RateUnavailable(err));
            }
        };
        info!(%rate, "pricing cycle started");

        let cars = match self
            .bounded_store(self.ports.repository.eligible_cars())
            .await
        {
            Ok(cars) => cars,
            Err(err) => {
                error!(error = %err, "pricing cycle skipped: eligible cars unavailable");
                return Err(CycleSkipped::InventoryUnavailable(err));
            }
        };

        let mut report = CycleReport {
            rate,
            evaluated: cars.len(),
            updated: 0,
            unchanged: 0,
            failed: 0,
            started_at,
            finished_at: started_at,
        };
        for car in &cars {
            self.reprice(car, rate, &mut report).await;
        }
        report.finished_at = self.runtime.clock.utc();

        info!(
            updated = report.updated,
            unchanged = report.unchanged,
            failed = report.failed,
            "pricing cycle complete"
        );
        Ok(report)
    }

    async fn reprice(&self, car: &RepricingCandidate, rate: ExchangeRate, report: &mut CycleReport) {
        match self.policy.decide(car, rate) {
            PriceDecision::Keep { .. } => report.unchanged += 1,
            PriceDecision::Update { price_kzt } => {
                match self
                    .bounded_store(self.ports.repository.set_price(car.id, price_kzt))
                    .await
                {
                    Ok(()) => report.updated += 1,
                    Err(err) => {
                        report.failed += 1;
                        warn!(car_id = %car.id, error = %err, "price update failed");
                    }
                }
            }
        }
    }

    async fn fetch_rate(&self) -> Result<ExchangeRate, RateSourceError> {
        let timeout = self.config.call_timeout;
        tokio::time::timeout(timeout, self.ports.rate_source.current_rate())
            .await
            .unwrap_or_else(|_| {
                Err(RateSourceError::timeout(format!(
                    "no rate within {timeout:?}"
                )))
            })
    }

    async fn bounded_store<T>(
        &self,
        call: impl Future<Output = Result<T, CarStoreError>>,
    ) -> Result<T, CarStoreError> {
        let timeout = self.config.call_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or_else(|_| Err(CarStoreError::timeout(format!("no response within {timeout:?}"))))
    }

    /// Start the loop on the current tokio runtime.
    ///
    /// The first cycle runs immediately, then one cycle per period. Cycles
    /// never overlap. Dropping the handle detaches the worker; call
    /// [`PricingWorkerHandle::shutdown`] to stop it.
    pub fn spawn(self) -> PricingWorkerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(WorkerState::Idle);
        let task = tokio::spawn(self.run(shutdown_rx, state_tx));
        PricingWorkerHandle {
            shutdown: shutdown_tx,
            state: state_rx,
            task,
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>, state: watch::Sender<WorkerState>) {
        info!(period_secs = self.config.period.as_secs(), "pricing worker started");
        loop {
            state.send_replace(WorkerState::RunningCycle);
            if let Err(reason) = self.run_cycle().await {
                debug!(%reason, "waiting for next tick after skipped cycle");
            }
            state.send_replace(WorkerState::Idle);

            let stop = tokio::select! {
                biased;
                stop = shutdown_requested(&mut shutdown) => stop,
                () = self.runtime.sleeper.sleep(self.config.period) => false,
            };
            if stop {
                break;
            }
        }
        state.send_replace(WorkerState::Stopped);
        info!("pricing worker stopped");
    }
}

/// Resolves to `true` once shutdown is requested. Never resolves if the
/// handle was dropped.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) -> bool {
    let requested = shutdown.wait_for(|stop| *stop).await.is_ok();
    if requested {
        return true;
    }
    std::future::pending::<bool>().await
}

/// Control handle for a spawned [`PricingWorker`].
pub struct PricingWorkerHandle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<WorkerState>,
    task: JoinHandle<()>,
}

impl PricingWorkerHandle {
    /// Most recent state published by the worker loop.
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn watch_state(&self) -> watch::Receiver<WorkerState> {
        self.state.clone()
    }

    /// Request shutdown and wait for the loop to exit. An in-flight cycle
    /// completes first.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        if let Err(err) = self.task.await {
            error!(error = %err, "pricing worker task ended abnormally");
        }
    }
}
