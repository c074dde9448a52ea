//! Revalidation cache for polled contract reads.
//!
//! A [`Revalidator`] owns the latest [`Resource`] state for one fetcher and
//! publishes it on a `watch` channel. Every revalidation spawns an
//! independent fetch; whichever fetch completes last overwrites the state,
//! even if it was started earlier. Fetches are never cancelled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::StakerError;
use crate::ports::telemetry::Telemetry;

/// Loading / ready / failed state of a polled value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<T> {
    /// No fetch has completed yet.
    Loading,
    Ready { value: T, fetched_at: DateTime<Utc> },
    /// The latest completed fetch failed; `last` keeps the previous value.
    Failed { error: String, last: Option<T> },
}

impl<T> Resource<T> {
    /// Latest known value, if any fetch ever succeeded.
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::Failed { last, .. } => last.as_ref(),
            Self::Loading => None,
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub const fn error(&self) -> Option<&String> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl<T: Clone> Resource<T> {
    /// Value or `fallback`: the zero placeholder for reads that default
    /// instead of surfacing an error.
    pub fn value_or(&self, fallback: T) -> T {
        self.value().cloned().unwrap_or(fallback)
    }
}

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, StakerError>> + Send + Sync>;

/// Timer and on-demand revalidation of one fetcher.
pub struct Revalidator<T> {
    name: &'static str,
    fetcher: Fetcher<T>,
    state: Arc<watch::Sender<Resource<T>>>,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl<T> Revalidator<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: &'static str, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, StakerError>> + Send + 'static,
    {
        let (state, _) = watch::channel(Resource::Loading);
        Self {
            name,
            fetcher: Arc::new(move || fetch().boxed()),
            state: Arc::new(state),
            telemetry: None,
        }
    }

    /// Count poll outcomes under this revalidator's name.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn subscribe(&self) -> watch::Receiver<Resource<T>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Resource<T> {
        self.state.borrow().clone()
    }

    /// Start a fetch in the background. Its result replaces the state when
    /// it completes, regardless of fetches started after it.
    pub fn revalidate(&self) -> JoinHandle<()> {
        let fut = (self.fetcher)();
        let state = Arc::clone(&self.state);
        let telemetry = self.telemetry.clone();
        let name = self.name;

        tokio::spawn(async move {
            let result = fut.await;
            store(name, &state, telemetry.as_deref(), result);
        })
    }

    /// Fetch inline and return the resulting state.
    pub async fn refresh(&self) -> Resource<T> {
        let result = (self.fetcher)().await;
        store(self.name, &self.state, self.telemetry.as_deref(), result);
        self.current()
    }

    /// Revalidate every `interval` until shutdown. The first tick fires
    /// immediately.
    pub async fn run(&self, interval: Duration, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(resource = self.name, ?interval, "Revalidation started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!(resource = self.name, "Revalidation stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let _ = self.revalidate();
                }
            }
        }
    }
}

fn store<T: Clone>(
    name: &'static str,
    state: &watch::Sender<Resource<T>>,
    telemetry: Option<&dyn Telemetry>,
    result: Result<T, StakerError>,
) {
    if let Some(t) = telemetry {
        t.record_poll(name, result.is_ok());
    }

    state.send_modify(|current| {
        *current = match result {
            Ok(value) => {
                debug!(resource = name, "Revalidated");
                Resource::Ready {
                    value,
                    fetched_at: Utc::now(),
                }
            }
            Err(e) => {
                warn!(resource = name, error = %e, "Revalidation failed");
                Resource::Failed {
                    error: e.to_string(),
                    last: current.value().cloned(),
                }
            }
        };
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_refresh_moves_from_loading_to_ready() {
        let poller = Revalidator::new("answer", || async { Ok::<_, StakerError>(42u32) });
        assert!(poller.current().is_loading());

        let state = poller.refresh().await;
        assert_eq!(state.value(), Some(&42));
    }

    #[tokio::test]
    async fn test_failure_keeps_last_value() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let poller = Revalidator::new("flaky", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(7u32)
                } else {
                    Err(StakerError::Digest("gone".into()))
                }
            }
        });

        poller.refresh().await;
        let state = poller.refresh().await;
        assert_eq!(state.error().map(String::as_str), Some("contract digest: gone"));
        assert_eq!(state.value(), Some(&7));
        assert_eq!(state.value_or(0), 7);
    }

    #[tokio::test]
    async fn test_value_or_defaults_when_never_loaded() {
        let poller = Revalidator::new("never", || async { Err::<u32, _>(StakerError::NotConnected) });
        let state = poller.refresh().await;
        assert_eq!(state.value_or(0), 0);
    }
}
