// ── Refresh coordinator ──
//
// Periodically pulls every unit from the Aseko API, replaces the exposed
// unit map on success, and translates failures into host-level signals:
// re-authentication required vs. transient update failure.

use std::sync::Arc;
use std::time::Duration;

use aseko_api::{AsekoClient, UnitSnapshot};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::store::{UnitMap, UnitStore};
use crate::stream::UnitStream;

// ── RefreshStatus ────────────────────────────────────────────────

/// Whether a refresh cycle is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Outcome of the most recent refresh, observable by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshStatus {
    pub state: RefreshState,
    /// `false` after a failed cycle until the next successful one.
    pub last_update_success: bool,
    /// Set when the API key was rejected; cleared by the next success.
    pub auth_failed: bool,
    /// Message of the last failure, if the last cycle failed.
    pub last_error: Option<String>,
    /// Completion time of the last successful cycle.
    pub last_refresh: Option<DateTime<Utc>>,
}

impl Default for RefreshStatus {
    fn default() -> Self {
        Self {
            state: RefreshState::Idle,
            last_update_success: true,
            auth_failed: false,
            last_error: None,
            last_refresh: None,
        }
    }
}

// ── Coordinator ──────────────────────────────────────────────────

/// Owns the polling loop and the latest unit map.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Refresh cycles are
/// serialized: a new one never starts while another is in flight.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    client: AsekoClient,
    store: UnitStore,
    status: watch::Sender<RefreshStatus>,
    refresh_lock: Mutex<()>,
    refresh_requested: Notify,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Build a coordinator and its API client. Does NOT fetch anything --
    /// call [`start()`](Self::start) for the first refresh and polling.
    pub fn new(config: CoordinatorConfig) -> Result<Self, CoreError> {
        let client = config.build_client()?;
        Ok(Self::with_client(config, client))
    }

    /// Build around an existing client.
    pub fn with_client(config: CoordinatorConfig, client: AsekoClient) -> Self {
        let (status, _) = watch::channel(RefreshStatus::default());

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                store: UnitStore::new(),
                status,
                refresh_lock: Mutex::new(()),
                refresh_requested: Notify::new(),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &AsekoClient {
        &self.inner.client
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the first refresh, then spawn the periodic refresh task.
    ///
    /// A failing first refresh is returned to the caller and no task is
    /// spawned, so the host can refuse to set up (or ask for a new key).
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        self.refresh().await?;
        self.spawn_refresh_task().await;

        info!(
            units = self.inner.store.len(),
            interval_secs = self.inner.config.scan_interval.as_secs(),
            "coordinator started"
        );
        Ok(())
    }

    /// Spawn the periodic refresh task without a first refresh.
    ///
    /// For hosts that keep polling after a transient [`start()`](Self::start)
    /// failure. Does nothing with a zero interval, after shutdown, or when
    /// the task is already running.
    pub async fn spawn_refresh_task(&self) {
        let period = self.inner.config.scan_interval;
        if period.is_zero() || self.inner.cancel.is_cancelled() {
            return;
        }

        let mut handles = self.inner.task_handles.lock().await;
        if handles.is_empty() {
            let coordinator = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(refresh_task(coordinator, period, cancel)));
            debug!(interval_secs = period.as_secs(), "refresh task spawned");
        }
    }

    /// Stop the periodic task and wait for it to exit.
    ///
    /// A refresh cancelled mid-flight leaves the previous map in place.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("coordinator stopped");
    }

    /// Ask the periodic task for an immediate refresh.
    ///
    /// Coalesces: several requests before the task wakes yield one cycle.
    pub fn request_refresh(&self) {
        self.inner.refresh_requested.notify_one();
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run one refresh cycle now.
    ///
    /// On success the unit map is replaced wholesale and subscribers are
    /// notified. On failure the previous map stays visible and the status
    /// records whether re-authentication is required.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let _serialized = self.inner.refresh_lock.lock().await;
        let _idle = IdleOnDrop::enter(&self.inner.status);

        match self.inner.client.get_units().await {
            Ok(units) => {
                self.apply(units);
                Ok(())
            }
            Err(err) => {
                let err = CoreError::from(err);
                let auth = err.is_auth_failure();
                let message = err.to_string();
                self.inner.status.send_modify(|s| {
                    s.last_update_success = false;
                    s.auth_failed |= auth;
                    s.last_error = Some(message);
                });
                Err(err)
            }
        }
    }

    fn apply(&self, units: Vec<UnitSnapshot>) {
        let map = self.inner.store.replace(units);
        let now = Utc::now();
        self.inner.status.send_modify(|s| {
            s.last_update_success = true;
            s.auth_failed = false;
            s.last_error = None;
            s.last_refresh = Some(now);
        });
        debug!(units = map.len(), "refresh complete");
    }

    // ── State observation ────────────────────────────────────────

    /// The current unit map (cheap `Arc` clone).
    pub fn units(&self) -> Arc<UnitMap> {
        self.inner.store.snapshot()
    }

    /// One unit from the current map.
    pub fn unit(&self, serial_number: &str) -> Option<Arc<UnitSnapshot>> {
        self.inner.store.get(serial_number)
    }

    /// Subscribe to successful refreshes.
    pub fn subscribe(&self) -> UnitStream {
        self.inner.store.subscribe()
    }

    /// Subscribe to refresh status changes.
    pub fn status(&self) -> watch::Receiver<RefreshStatus> {
        self.inner.status.subscribe()
    }

    pub fn last_update_success(&self) -> bool {
        self.inner.status.borrow().last_update_success
    }
}

/// Marks the status `Refreshing` for its lifetime, `Idle` when dropped,
/// including when the refresh future is cancelled.
struct IdleOnDrop<'a>(&'a watch::Sender<RefreshStatus>);

impl<'a> IdleOnDrop<'a> {
    fn enter(status: &'a watch::Sender<RefreshStatus>) -> Self {
        status.send_modify(|s| s.state = RefreshState::Refreshing);
        Self(status)
    }
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|s| s.state = RefreshState::Idle);
    }
}

// ── Background task ──────────────────────────────────────────────

/// Periodically refresh, or sooner when explicitly requested.
async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = coordinator.inner.refresh_requested.notified() => {
                interval.reset();
                run_cycle(&coordinator, &cancel).await;
            }
            _ = interval.tick() => run_cycle(&coordinator, &cancel).await,
        }
    }
}

async fn run_cycle(coordinator: &Coordinator, cancel: &CancellationToken) {
    tokio::select! {
        biased;
        () = cancel.cancelled() => debug!("refresh cancelled by shutdown"),
        result = coordinator.refresh() => match result {
            Ok(()) => {}
            Err(e) if e.is_auth_failure() => {
                warn!(error = %e, "API key rejected, re-authentication required");
            }
            Err(e) => warn!(error = %e, "periodic refresh failed"),
        },
    }
}
