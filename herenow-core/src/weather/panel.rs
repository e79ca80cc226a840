//! The weather card of the insights panel: cache, inline error and the
//! deferred rate-limit retry.

use parking_lot::Mutex;
use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use crate::{
    error::WeatherError, geo::Coordinates, model::WeatherSnapshot, task::DeferredTask,
};

use super::{WeatherCache, WeatherSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fresh snapshot was already cached; nothing was requested.
    CacheHit,
    Updated,
    /// Rate limited; one retry was scheduled after the given delay.
    RetryScheduled(Duration),
    Failed,
}

#[derive(Debug, Default)]
struct PanelState {
    cache: WeatherCache,
    error: Option<String>,
    retry: DeferredTask,
}

#[derive(Debug)]
struct Inner {
    source: Arc<dyn WeatherSource>,
    state: Mutex<PanelState>,
}

/// Cloneable handle; clones share one cache and one retry slot.
#[derive(Debug, Clone)]
pub struct WeatherPanel {
    inner: Arc<Inner>,
}

impl WeatherPanel {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { inner: Arc::new(Inner { source, state: Mutex::new(PanelState::default()) }) }
    }

    /// Latest snapshot, fresh or not.
    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        self.inner.state.lock().cache.latest().cloned()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.lock().error.clone()
    }

    pub fn has_pending_retry(&self) -> bool {
        self.inner.state.lock().retry.is_pending()
    }

    /// Refreshes the weather for `coords` unless the cached snapshot is still fresh.
    ///
    /// Any previously scheduled retry is cancelled first, so at most one retry
    /// timer is ever live for this panel.
    pub async fn refresh(&self, coords: Coordinates) -> RefreshOutcome {
        {
            let mut state = self.inner.state.lock();
            if state.retry.cancel() {
                tracing::debug!("Cancelled pending weather retry");
            }
            if state.cache.fresh().is_some() {
                tracing::debug!("Weather cache hit, skipping request");
                return RefreshOutcome::CacheHit;
            }
            state.error = None;
        }

        let result = self.inner.source.current(coords).await;

        let mut state = self.inner.state.lock();
        match result {
            Ok(snapshot) => {
                tracing::info!("Weather updated: {} {}°C", snapshot.condition, snapshot.temperature_c);
                state.cache.store(snapshot);
                state.error = None;
                RefreshOutcome::Updated
            }
            Err(e) => {
                state.error = Some(e.user_message());
                if let WeatherError::RateLimited { retry_after } = e {
                    tracing::warn!("Weather fetch rate limited, retrying in {:?}", retry_after);
                    schedule_retry(&self.inner, &mut state, coords, retry_after);
                    RefreshOutcome::RetryScheduled(retry_after)
                } else {
                    tracing::error!("Weather fetch error: {}", e);
                    RefreshOutcome::Failed
                }
            }
        }
    }
}

fn schedule_retry(inner: &Arc<Inner>, state: &mut PanelState, coords: Coordinates, delay: Duration) {
    let weak: Weak<Inner> = Arc::downgrade(inner);

    state.retry.schedule(delay, move |ticket| async move {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.state.lock().retry.release(ticket);

        tracing::debug!("Running deferred weather retry");
        WeatherPanel { inner }.refresh(coords).await;
    });
}
