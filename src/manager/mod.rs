//! Startup flow orchestration
//!
//! The [`UpdateManager`] is the only component that swallows errors. Every
//! failure after the baseline is resolved is logged and turned into "keep
//! the baseline", so the host always gets a loadable [`Location`].
//!
//! ```text
//! Idle -> Resolving -> Checking -> Downloading -> Verifying -> Installing -> Committing -> Done
//!                          \             \             \             \            \
//!                           +-------------+-------------+-------------+------------+--> Errored -> Done
//! ```
//!
//! Usage from a host:
//!
//! ```ignore
//! let manager = Arc::new(UpdateManager::new(config)?);
//! manager.resolve_bundle_to_load(|location| host.load(location));
//! ```

pub mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

pub use state::{FlowOutcome, FlowStage, FlowState, StartupReport};

use crate::client::{CheckOutcome, ProgressCallback, UpdateClient};
use crate::config::UpdaterConfig;
use crate::domain::{BundleRecord, Location};
use crate::error::{self, Result, UpdaterError};
use crate::hash;
use crate::installer::ArchiveInstaller;
use crate::resolver::BundleResolver;

/// Held for the duration of one flow; releases the flag on drop.
///
/// Shared with every blocking task of the flow, so an aborted flow keeps the
/// flag until its in-progress hashing or extraction has returned.
#[derive(Debug)]
struct FlightGuard {
    flag: Arc<AtomicBool>,
}

impl FlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// An error tagged with the stage it ended the flow in
#[derive(Debug)]
struct FlowFailure {
    stage: FlowStage,
    error: UpdaterError,
}

impl FlowFailure {
    fn at(stage: FlowStage) -> impl FnOnce(UpdaterError) -> Self {
        move |error| Self { stage, error }
    }
}

/// Handle to a flow running in the background
#[derive(Debug)]
pub struct StartupHandle {
    task: JoinHandle<()>,
    result: oneshot::Receiver<StartupReport>,
}

impl StartupHandle {
    /// Abort the flow. Anything not yet committed is discarded.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the report; `None` if the flow was cancelled
    pub async fn wait(self) -> Option<StartupReport> {
        self.result.await.ok()
    }
}

pub struct UpdateManager {
    config: UpdaterConfig,
    resolver: BundleResolver,
    client: UpdateClient,
    installer: ArchiveInstaller,
    in_flight: Arc<AtomicBool>,
    bundle: RwLock<Option<Location>>,
    state: watch::Sender<FlowState>,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for UpdateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateManager")
            .field("resolver", &self.resolver)
            .field("installer", &self.installer)
            .field("in_flight", &self.in_flight)
            .field("bundle", &self.bundle)
            .finish_non_exhaustive()
    }
}

impl UpdateManager {
    pub fn new(config: UpdaterConfig) -> Result<Self> {
        config.validate()?;

        let resolver = BundleResolver::from_config(&config)?;
        let client = UpdateClient::from_config(&config)?;
        let installer = ArchiveInstaller::new(config.install_root()?, config.entry_file.clone());
        let (state, _) = watch::channel(FlowState::Idle);

        Ok(Self {
            config,
            resolver,
            client,
            installer,
            in_flight: Arc::new(AtomicBool::new(false)),
            bundle: RwLock::new(None),
            state,
            progress: None,
        })
    }

    /// Report download progress to `callback`
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub fn resolver(&self) -> &BundleResolver {
        &self.resolver
    }

    pub fn client(&self) -> &UpdateClient {
        &self.client
    }

    /// Watch flow state changes, e.g. to drive a waiting screen
    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> FlowState {
        self.state.borrow().clone()
    }

    /// The bundle the host should load, once a flow has resolved one
    pub fn bundle_to_load(&self) -> Option<Location> {
        self.bundle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run the startup flow and return the bundle to load. Never fails.
    pub async fn run_startup_flow(&self) -> Location {
        self.run_startup_flow_report().await.location
    }

    /// Run the startup flow and report how it ended.
    ///
    /// If another flow is in flight this returns immediately with
    /// [`FlowOutcome::AlreadyRunning`] and does not sweep anything.
    pub async fn run_startup_flow_report(&self) -> StartupReport {
        match FlightGuard::acquire(&self.in_flight) {
            Some(guard) => self.run_flow(guard).await,
            None => self.already_running(),
        }
    }

    /// Start the flow on the runtime. `None` if one is already in flight.
    pub fn spawn_startup_flow(self: &Arc<Self>) -> Option<StartupHandle> {
        let guard = FlightGuard::acquire(&self.in_flight)?;
        let manager = Arc::clone(self);
        let (tx, rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let report = manager.run_flow(guard).await;
            // Receiver dropped means nobody is waiting
            let _ = tx.send(report);
        });

        Some(StartupHandle { task, result: rx })
    }

    /// Host entry point: run the flow in the background and hand the
    /// resulting location to `callback` exactly once.
    ///
    /// Returns `None` (and never calls `callback`) when a flow is already in
    /// flight. If the flow is aborted, `callback` still receives the last
    /// known loadable bundle.
    pub fn resolve_bundle_to_load<F>(self: &Arc<Self>, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Location) + Send + 'static,
    {
        let handle = self.spawn_startup_flow()?;
        let manager = Arc::clone(self);

        Some(tokio::spawn(async move {
            let location = match handle.wait().await {
                Some(report) => report.location,
                None => manager
                    .bundle_to_load()
                    .unwrap_or_else(|| manager.resolver.peek_baseline().path),
            };
            callback(location);
        }))
    }

    async fn run_flow(&self, guard: FlightGuard) -> StartupReport {
        let guard = Arc::new(guard);
        self.publish(FlowState::Resolving);
        let baseline = self.resolver.resolve_baseline();
        self.set_bundle(baseline.path.clone());
        tracing::info!(version = %baseline.version, location = %baseline.path, "baseline bundle resolved");

        if !self.config.enabled {
            tracing::info!("update checks disabled");
            return self.finish(baseline, FlowOutcome::Skipped);
        }

        match self.try_update(&baseline, &guard).await {
            Ok(Some(record)) => {
                self.set_bundle(record.path.clone());
                let outcome = FlowOutcome::Updated {
                    from: baseline.version.clone(),
                    to: record.version.clone(),
                };
                tracing::info!(from = %baseline.version, to = %record.version, "bundle updated");
                self.finish(record, outcome)
            }
            Ok(None) => self.finish(baseline, FlowOutcome::UpToDate),
            Err(FlowFailure { stage, error }) => {
                tracing::warn!(stage = %stage, error = %error, "update abandoned, keeping baseline bundle");
                let reason = error.to_string();
                self.publish(FlowState::Errored {
                    stage,
                    reason: reason.clone(),
                });
                self.finish(baseline, FlowOutcome::Failed { stage, reason })
            }
        }
    }

    /// Check, download, verify, install and commit.
    ///
    /// `Ok(None)` means there is nothing newer. The record is written last, so
    /// cancelling at any earlier await leaves it untouched.
    async fn try_update(
        &self,
        baseline: &BundleRecord,
        guard: &Arc<FlightGuard>,
    ) -> std::result::Result<Option<BundleRecord>, FlowFailure> {
        self.publish(FlowState::Checking);
        let info = match self
            .client
            .check_remote(&baseline.version)
            .await
            .map_err(FlowFailure::at(FlowStage::Checking))?
        {
            CheckOutcome::NoUpdate => return Ok(None),
            CheckOutcome::UpdateAvailable(info) => info,
        };

        self.publish(FlowState::Downloading {
            version: info.version.clone(),
        });
        let archive = self
            .client
            .download(
                &info.archive_url,
                self.installer.install_root(),
                self.progress.as_ref(),
            )
            .await
            .map_err(FlowFailure::at(FlowStage::Downloading))?;

        self.publish(FlowState::Verifying);
        let digest = self.config.digest;
        let expected = info.checksum.clone();
        let archive = run_blocking(guard, move || {
            hash::verify_checksum(archive.path(), &expected, digest)?;
            Ok(archive)
        })
        .await
        .map_err(FlowFailure::at(FlowStage::Verifying))?;

        self.publish(FlowState::Installing);
        let installer = self.installer.clone();
        let version = info.version.clone();
        // The archive moves into the task so it outlives extraction even if
        // this flow is aborted meanwhile
        let location = run_blocking(guard, move || {
            installer.install_archive(archive.path(), &version)
        })
        .await
        .map_err(FlowFailure::at(FlowStage::Installing))?;

        self.publish(FlowState::Committing);
        let record = BundleRecord::new(info.version, location);
        self.resolver
            .store()
            .save(&record)
            .map_err(FlowFailure::at(FlowStage::Committing))?;

        Ok(Some(record))
    }

    fn already_running(&self) -> StartupReport {
        let record = self.resolver.peek_baseline();
        let location = self.bundle_to_load().unwrap_or_else(|| record.path.clone());
        tracing::debug!("startup flow already in flight");
        StartupReport {
            location,
            record,
            outcome: FlowOutcome::AlreadyRunning,
        }
    }

    fn finish(&self, record: BundleRecord, outcome: FlowOutcome) -> StartupReport {
        self.publish(FlowState::Done(outcome.clone()));
        StartupReport {
            location: record.path.clone(),
            record,
            outcome,
        }
    }

    fn publish(&self, state: FlowState) {
        tracing::debug!(state = ?state, "flow state");
        self.state.send_replace(state);
    }

    fn set_bundle(&self, location: Location) {
        *self.bundle.write().unwrap_or_else(PoisonError::into_inner) = Some(location);
    }
}

/// Run blocking filesystem work off the async workers.
///
/// The task holds its own reference to `guard`: aborting the flow cannot stop
/// a blocking task, so the flag stays set until `work` returns.
async fn run_blocking<T, F>(guard: &Arc<FlightGuard>, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let guard = Arc::clone(guard);
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        work()
    })
        .await
        .map_err(|e| error::file_operation("blocking task", e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{create_temp_dir, test_config};

    #[test]
    fn test_flight_guard_is_exclusive() {
        let flag = Arc::new(AtomicBool::new(false));
        let first = FlightGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(FlightGuard::acquire(&flag).is_none());

        drop(first);
        assert!(FlightGuard::acquire(&flag).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_aborted_flow_keeps_flag_until_blocking_work_returns() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = Arc::new(FlightGuard::acquire(&flag).unwrap());
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let task = tokio::spawn(async move {
            run_blocking(&guard, move || {
                let _ = started_tx.send(());
                let _ = release_rx.recv();
                Ok(())
            })
            .await
        });

        started_rx.await.unwrap();
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        // The async side is gone but the blocking task still runs
        assert!(flag.load(Ordering::Acquire));
        assert!(FlightGuard::acquire(&flag).is_none());

        release_tx.send(()).unwrap();
        for _ in 0..100 {
            if !flag.load(Ordering::Acquire) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!flag.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_disabled_flow_skips_check() {
        let temp = create_temp_dir();
        let mut config = test_config(&temp);
        config.enabled = false;
        let manager = UpdateManager::new(config).unwrap();

        let report = manager.run_startup_flow_report().await;
        assert_eq!(report.outcome, FlowOutcome::Skipped);
        assert_eq!(
            report.location,
            Location::Shipped("index.bundle".to_string())
        );
        assert_eq!(manager.bundle_to_load(), Some(report.location));
        assert!(manager.current_state().is_done());
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn test_unreachable_service_keeps_baseline() {
        let temp = create_temp_dir();
        let mut config = test_config(&temp);
        config.check_timeout_secs = 2;
        let manager = UpdateManager::new(config).unwrap();

        let report = manager.run_startup_flow_report().await;
        assert!(matches!(
            report.outcome,
            FlowOutcome::Failed {
                stage: FlowStage::Checking,
                ..
            }
        ));
        assert_eq!(
            report.location,
            Location::Shipped("index.bundle".to_string())
        );
    }

    #[tokio::test]
    async fn test_second_trigger_reports_already_running() {
        let temp = create_temp_dir();
        let manager = UpdateManager::new(test_config(&temp)).unwrap();

        let _guard = FlightGuard::acquire(&manager.in_flight).unwrap();
        let report = manager.run_startup_flow_report().await;
        assert_eq!(report.outcome, FlowOutcome::AlreadyRunning);
        assert_eq!(manager.current_state(), FlowState::Idle);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let temp = create_temp_dir();
        let mut config = test_config(&temp);
        config.check_url = String::new();
        assert!(UpdateManager::new(config).is_err());
    }
}
