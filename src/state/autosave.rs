use crate::api::{ApiClient, ApiResult};
use leptos::task::spawn_local;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Deferred-callback primitive. In the browser this is `window.setTimeout`.
pub(crate) trait TimerDriver: Send + Sync + 'static {
    /// Schedules `callback` after `delay_ms`; `None` if the timer could not be armed.
    fn set_timeout(&self, delay_ms: i32, callback: Box<dyn FnOnce() + Send>) -> Option<i32>;
    fn clear_timeout(&self, handle: i32);
}

pub(crate) type SaveDone = Box<dyn FnOnce(ApiResult<()>) + Send>;

/// Where saves go. `done` runs once the request settles.
pub(crate) trait NoteSink: Send + Sync + 'static {
    fn persist(&self, identifier: String, content: String, done: SaveDone);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum SyncStatus {
    /// Nothing edited in this session yet.
    #[default]
    Idle,
    /// A save is scheduled or in flight.
    Syncing,
    Saved,
    /// The last save failed.
    Unsaved,
}

impl SyncStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle | Self::Saved => "All changes saved",
            Self::Syncing => "Saving changes...",
            Self::Unsaved => "Changes not saved",
        }
    }

    pub fn is_syncing(self) -> bool {
        self == Self::Syncing
    }
}

#[derive(Debug, Default)]
struct SessionState {
    buffer: String,
    pending_timer: Option<i32>,
    /// Bumped on every change; a timer or completion for an older value is stale.
    generation: u64,
    status: SyncStatus,
    disposed: bool,
}

/// Debounced autosave for one editing session.
///
/// Every change replaces the buffered content, cancels the scheduled save and
/// arms a new one `quiet_ms` later. When the timer fires the whole buffer is
/// persisted under the session's identifier; there is no retry.
///
/// The identifier is fixed at construction. `dispose()` ends the session: the
/// pending timer is cancelled and late completions are ignored. In-flight
/// requests are not aborted.
#[derive(Clone)]
pub(crate) struct AutosaveController {
    identifier: Arc<str>,
    quiet_ms: i32,
    timers: Arc<dyn TimerDriver>,
    sink: Arc<dyn NoteSink>,
    state: Arc<Mutex<SessionState>>,
    on_status: Arc<dyn Fn(SyncStatus) + Send + Sync>,
}

impl AutosaveController {
    pub fn new(
        identifier: &str,
        initial_content: String,
        quiet_ms: i32,
        timers: Arc<dyn TimerDriver>,
        sink: Arc<dyn NoteSink>,
        on_status: impl Fn(SyncStatus) + Send + Sync + 'static,
    ) -> Self {
        Self {
            identifier: Arc::from(identifier),
            quiet_ms,
            timers,
            sink,
            state: Arc::new(Mutex::new(SessionState {
                buffer: initial_content,
                ..Default::default()
            })),
            on_status: Arc::new(on_status),
        }
    }

    /// Browser wiring: `window.setTimeout` plus `POST /notes` through `client`.
    pub fn for_browser(
        identifier: &str,
        initial_content: String,
        quiet_ms: i32,
        client: ApiClient,
        on_status: impl Fn(SyncStatus) + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            identifier,
            initial_content,
            quiet_ms,
            Arc::new(WindowTimers),
            Arc::new(ApiSink { client }),
            on_status,
        )
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // A poisoned lock only means a callback panicked; the state is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records a new editor value and (re)schedules the save.
    pub fn on_change(&self, content: &str) {
        let (previous, generation) = {
            let mut s = self.lock();
            if s.disposed {
                return;
            }
            s.buffer = content.to_string();
            s.generation += 1;
            s.status = SyncStatus::Syncing;
            (s.pending_timer.take(), s.generation)
        };

        if let Some(handle) = previous {
            self.timers.clear_timeout(handle);
        }
        (self.on_status)(SyncStatus::Syncing);
        self.schedule(generation);
    }

    fn schedule(&self, generation: u64) {
        let this = self.clone();
        let armed = self
            .timers
            .set_timeout(self.quiet_ms, Box::new(move || this.fire(generation)));

        let Some(handle) = armed else {
            tracing::warn!(identifier = %self.identifier, "could not arm autosave timer, saving now");
            self.fire(generation);
            return;
        };

        let stale = {
            let mut s = self.lock();
            if s.disposed || s.generation != generation {
                true
            } else {
                s.pending_timer = Some(handle);
                false
            }
        };
        if stale {
            self.timers.clear_timeout(handle);
        }
    }

    fn fire(&self, generation: u64) {
        let content = {
            let mut s = self.lock();
            if s.disposed || s.generation != generation {
                return;
            }
            s.pending_timer = None;
            s.buffer.clone()
        };

        tracing::debug!(identifier = %self.identifier, bytes = content.len(), "saving note");

        let this = self.clone();
        self.sink.persist(
            self.identifier.to_string(),
            content,
            Box::new(move |result| this.finish(generation, result)),
        );
    }

    fn finish(&self, generation: u64, result: ApiResult<()>) {
        match &result {
            Ok(()) => tracing::info!(identifier = %self.identifier, "note saved"),
            Err(e) => {
                tracing::error!(identifier = %self.identifier, kind = ?e.kind, error = %e, "failed to save note")
            }
        }

        let status = {
            let mut s = self.lock();
            // A newer edit keeps the indicator on until its own save settles.
            if s.disposed || s.generation != generation {
                return;
            }
            s.status = if result.is_ok() {
                SyncStatus::Saved
            } else {
                SyncStatus::Unsaved
            };
            s.status
        };
        (self.on_status)(status);
    }

    /// Ends the session: cancels the pending save and silences late completions.
    pub fn dispose(&self) {
        let pending = {
            let mut s = self.lock();
            if s.disposed {
                return;
            }
            s.disposed = true;
            s.pending_timer.take()
        };

        if let Some(handle) = pending {
            tracing::debug!(identifier = %self.identifier, "dropping pending autosave");
            self.timers.clear_timeout(handle);
        }
    }
}

thread_local! {
    /// Closures behind armed `setTimeout` handles. An entry is dropped when its
    /// timer fires or is cleared, releasing the callback and its captures.
    static LIVE_TIMERS: RefCell<HashMap<i32, Closure<dyn FnMut()>>> = RefCell::new(HashMap::new());
}

fn release_timer(handle: i32) {
    let closure = LIVE_TIMERS.with(|t| t.borrow_mut().remove(&handle));
    drop(closure);
}

/// `window.setTimeout` / `window.clearTimeout`.
pub(crate) struct WindowTimers;

impl TimerDriver for WindowTimers {
    fn set_timeout(&self, delay_ms: i32, callback: Box<dyn FnOnce() + Send>) -> Option<i32> {
        let win = web_sys::window()?;
        let armed: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

        let own_handle = armed.clone();
        let closure = Closure::once(move || {
            // wasm-bindgen defers freeing a closure that is still running.
            if let Some(handle) = own_handle.get() {
                release_timer(handle);
            }
            callback();
        });

        let handle = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay_ms,
            )
            .ok()?;
        armed.set(Some(handle));
        LIVE_TIMERS.with(|t| t.borrow_mut().insert(handle, closure));
        Some(handle)
    }

    fn clear_timeout(&self, handle: i32) {
        if let Some(win) = web_sys::window() {
            win.clear_timeout_with_handle(handle);
        }
        release_timer(handle);
    }
}

/// Persists through the notes API.
pub(crate) struct ApiSink {
    pub client: ApiClient,
}

impl NoteSink for ApiSink {
    fn persist(&self, identifier: String, content: String, done: SaveDone) {
        let client = self.client.clone();
        spawn_local(async move {
            let result = client.save_note(&identifier, &content).await;
            done(result);
        });
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn live_timers() -> usize {
        LIVE_TIMERS.with(|t| t.borrow().len())
    }

    async fn sleep(ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            if let Some(win) = web_sys::window() {
                let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
            }
        });
        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    }

    #[wasm_bindgen_test]
    fn test_cleared_timer_releases_callback() {
        let captured = Arc::new(());
        let held = captured.clone();
        let handle = WindowTimers
            .set_timeout(60_000, Box::new(move || drop(held)))
            .unwrap();
        assert_eq!(Arc::strong_count(&captured), 2);

        WindowTimers.clear_timeout(handle);
        assert_eq!(Arc::strong_count(&captured), 1);
        assert_eq!(live_timers(), 0);
    }

    #[wasm_bindgen_test]
    async fn test_fired_timer_releases_closure() {
        let fired = Arc::new(Mutex::new(false));
        let flag = fired.clone();
        WindowTimers.set_timeout(0, Box::new(move || *flag.lock().unwrap() = true));
        assert_eq!(live_timers(), 1);

        sleep(20).await;
        assert!(*fired.lock().unwrap());
        assert_eq!(live_timers(), 0);
    }
}
