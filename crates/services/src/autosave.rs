//! Debounced persistence of a changing value.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::Clock;

pub type SaveError = Box<dyn StdError + Send + Sync>;
pub type SaveFuture = Pin<Box<dyn Future<Output = Result<(), SaveError>> + Send>>;
type SaveFn<T> = Arc<dyn Fn(T) -> SaveFuture + Send + Sync>;

const SCHEDULED: u8 = 0;
const RUNNING: u8 = 1;
const CANCELLED: u8 = 2;

/// Observable state of an [`AutoSaver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoSaveStatus {
    pub is_saving: bool,
    /// Completion time of the last successful save.
    pub last_saved: Option<DateTime<Utc>>,
}

struct Pending {
    state: Arc<AtomicU8>,
    handle: JoinHandle<()>,
}

/// Trailing-debounce saver.
///
/// The first value passed to [`AutoSaver::on_change`] is taken as already
/// persisted and never saved. Every later value replaces any pending save
/// and is written once `delay` passes without another change. Writes never
/// overlap: a save that comes due while an older one is still writing waits
/// for it, so the newest value always lands last. Failed saves are logged
/// and leave `last_saved` untouched.
///
/// Must be driven from inside a tokio runtime.
pub struct AutoSaver<T> {
    save: SaveFn<T>,
    delay: Duration,
    clock: Clock,
    status: Arc<Mutex<AutoSaveStatus>>,
    write_lock: Arc<tokio::sync::Mutex<()>>,
    pending: Option<Pending>,
    /// Saves already writing when a newer value arrived.
    in_flight: Vec<JoinHandle<()>>,
    primed: bool,
    disposed: bool,
}

impl<T> AutoSaver<T>
where
    T: Send + 'static,
{
    pub fn new<F, Fut>(delay: Duration, clock: Clock, save: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SaveError>> + Send + 'static,
    {
        Self {
            save: Arc::new(move |value: T| -> SaveFuture { Box::pin(save(value)) }),
            delay,
            clock,
            status: Arc::new(Mutex::new(AutoSaveStatus::default())),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
            pending: None,
            in_flight: Vec::new(),
            primed: false,
            disposed: false,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Applies to saves scheduled after this call.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    #[must_use]
    pub fn status(&self) -> AutoSaveStatus {
        read_status(&self.status)
    }

    /// True while a save is waiting for its delay to elapse.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.state.load(Ordering::SeqCst) == SCHEDULED)
    }

    /// Report a new value.
    pub fn on_change(&mut self, value: T) {
        if self.disposed {
            return;
        }
        if !self.primed {
            self.primed = true;
            return;
        }
        self.cancel_scheduled();
        self.track_running();

        let state = Arc::new(AtomicU8::new(SCHEDULED));
        let handle = tokio::spawn(run_save(
            Arc::clone(&self.save),
            value,
            self.delay,
            self.clock,
            Arc::clone(&state),
            Arc::clone(&self.status),
            Arc::clone(&self.write_lock),
        ));
        self.pending = Some(Pending { state, handle });
    }

    /// Drop any scheduled save and wait for every save already writing.
    pub async fn cancel(&mut self) {
        self.cancel_scheduled();
        self.track_running();
        for handle in std::mem::take(&mut self.in_flight) {
            if let Err(err) = handle.await {
                log::warn!("auto-save task failed: {err}");
            }
        }
    }

    /// Stop for good. A save already writing is left to finish.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.cancel_scheduled();
    }

    fn cancel_scheduled(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        if pending
            .state
            .compare_exchange(SCHEDULED, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            pending.handle.abort();
            self.pending = None;
        }
    }

    /// Move a save that is already writing out of `pending` so it can still
    /// be awaited.
    fn track_running(&mut self) {
        if let Some(pending) = self.pending.take() {
            if !pending.handle.is_finished() {
                self.in_flight.push(pending.handle);
            }
        }
        self.in_flight.retain(|handle| !handle.is_finished());
    }
}

impl<T> Drop for AutoSaver<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            if pending
                .state
                .compare_exchange(SCHEDULED, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                pending.handle.abort();
            }
        }
    }
}

impl<T> fmt::Debug for AutoSaver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSaver")
            .field("delay", &self.delay)
            .field("status", &read_status(&self.status))
            .field("primed", &self.primed)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

async fn run_save<T>(
    save: SaveFn<T>,
    value: T,
    delay: Duration,
    clock: Clock,
    state: Arc<AtomicU8>,
    status: Arc<Mutex<AutoSaveStatus>>,
    write_lock: Arc<tokio::sync::Mutex<()>>,
) {
    tokio::time::sleep(delay).await;
    // Still SCHEDULED while waiting here, so a newer value can cancel it.
    let _writing = write_lock.lock().await;
    if state
        .compare_exchange(SCHEDULED, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return;
    }

    update_status(&status, |status| status.is_saving = true);
    let result = save(value).await;
    match result {
        Ok(()) => {
            let saved_at = clock.now();
            update_status(&status, |status| {
                status.is_saving = false;
                status.last_saved = Some(saved_at);
            });
            log::debug!("auto-saved at {saved_at}");
        }
        Err(err) => {
            update_status(&status, |status| status.is_saving = false);
            log::warn!("auto-save failed: {err}");
        }
    }
}

fn read_status(status: &Mutex<AutoSaveStatus>) -> AutoSaveStatus {
    status.lock().map(|status| *status).unwrap_or_default()
}

fn update_status(status: &Mutex<AutoSaveStatus>, apply: impl FnOnce(&mut AutoSaveStatus)) {
    if let Ok(mut guard) = status.lock() {
        apply(&mut guard);
    }
}
