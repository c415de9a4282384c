//! Clock, sleeper and rate-source doubles.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use tokio::sync::Notify;

use crate::domain::ports::{ExchangeRate, ExchangeRateSource, RateSourceError};
use crate::domain::pricing_worker::Sleeper;

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *guard(&self.0) += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *guard(&self.0)
    }
}

/// Records every requested sleep. The first `wakeups` sleeps return at
/// once; later ones park forever after signalling [`Self::wait_parked`].
#[derive(Default)]
pub struct ParkingSleeper {
    requested: Mutex<Vec<Duration>>,
    wakeups: AtomicUsize,
    parked: Notify,
}

impl ParkingSleeper {
    /// Sleeper that lets `wakeups` ticks through before parking.
    pub fn with_wakeups(wakeups: usize) -> Self {
        Self {
            wakeups: AtomicUsize::new(wakeups),
            ..Self::default()
        }
    }

    pub fn requested(&self) -> Vec<Duration> {
        guard(&self.requested).clone()
    }

    /// Resolve once the worker has parked in a sleep.
    pub async fn wait_parked(&self) {
        self.parked.notified().await;
    }
}

#[async_trait]
impl Sleeper for ParkingSleeper {
    async fn sleep(&self, duration: Duration) {
        guard(&self.requested).push(duration);
        let admitted = self
            .wakeups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if admitted {
            return;
        }
        self.parked.notify_one();
        std::future::pending::<()>().await;
    }
}

/// Always returns the same rate.
#[derive(Debug, Clone, Copy)]
pub struct FixedRateSource(pub f64);

#[async_trait]
impl ExchangeRateSource for FixedRateSource {
    async fn current_rate(&self) -> Result<ExchangeRate, RateSourceError> {
        ExchangeRate::new(self.0)
    }
}

/// Always fails with a transport error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRateSource;

#[async_trait]
impl ExchangeRateSource for FailingRateSource {
    async fn current_rate(&self) -> Result<ExchangeRate, RateSourceError> {
        Err(RateSourceError::transport("upstream unreachable"))
    }
}

/// Replays scripted results, then fails once exhausted.
#[derive(Default)]
pub struct SequenceRateSource {
    script: Mutex<VecDeque<Result<f64, RateSourceError>>>,
    calls: AtomicUsize,
}

impl SequenceRateSource {
    pub fn new(script: impl IntoIterator<Item = Result<f64, RateSourceError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExchangeRateSource for SequenceRateSource {
    async fn current_rate(&self) -> Result<ExchangeRate, RateSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = guard(&self.script).pop_front();
        match next {
            Some(Ok(rate)) => ExchangeRate::new(rate),
            Some(Err(err)) => Err(err),
            None => Err(RateSourceError::transport("rate script exhausted")),
        }
    }
}
