//! Visibility, maximize and close handling for the main window.
//!
//! The platform window sits behind `WindowSurface`; the coordinator keeps a
//! mirror of its state and owns the quitting flag. Closing is two-phase: the
//! backend is terminated first and the window closes from the termination
//! callback.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use crate::{append_shutdown_log, backend_supervisor::BackendTerminator};

pub(crate) trait WindowSurface: Clone + Send + Sync + 'static {
    fn is_visible(&self) -> Result<bool, String>;
    fn is_minimized(&self) -> Result<bool, String>;
    fn is_maximized(&self) -> Result<bool, String>;
    fn show(&self) -> Result<(), String>;
    fn hide(&self) -> Result<(), String>;
    fn minimize(&self) -> Result<(), String>;
    fn unminimize(&self) -> Result<(), String>;
    fn maximize(&self) -> Result<(), String>;
    fn unmaximize(&self) -> Result<(), String>;
    fn focus(&self) -> Result<(), String>;
    fn close(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WindowState {
    pub(crate) visible: bool,
    pub(crate) minimized: bool,
    pub(crate) maximized: bool,
}

pub(crate) struct WindowLifecycleCoordinator<S: WindowSurface> {
    surface: S,
    state: Arc<Mutex<WindowState>>,
    quitting: Arc<AtomicBool>,
}

impl<S: WindowSurface> WindowLifecycleCoordinator<S> {
    pub(crate) fn new(surface: S) -> Self {
        Self {
            surface,
            state: Arc::new(Mutex::new(WindowState::default())),
            quitting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn state(&self) -> WindowState {
        *self.lock_state()
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::SeqCst)
    }

    /// Refreshes the mirror from the platform. Fields the platform cannot
    /// report keep their previous value.
    pub(crate) fn sync(&self) -> WindowState {
        let mut state = self.lock_state();
        if let Ok(visible) = self.surface.is_visible() {
            state.visible = visible;
        }
        if let Ok(minimized) = self.surface.is_minimized() {
            state.minimized = minimized;
        }
        if let Ok(maximized) = self.surface.is_maximized() {
            state.maximized = maximized;
        }
        *state
    }

    /// Restore, show, focus. Also used to surface the window for a second
    /// launch.
    pub(crate) fn show(&self) {
        let minimized = self
            .surface
            .is_minimized()
            .unwrap_or_else(|_| self.lock_state().minimized);
        if minimized {
            log_failure("unminimize", self.surface.unminimize());
        }
        log_failure("show", self.surface.show());
        log_failure("focus", self.surface.focus());

        let mut state = self.lock_state();
        state.visible = true;
        state.minimized = false;
    }

    pub(crate) fn hide(&self) {
        log_failure("hide", self.surface.hide());
        self.lock_state().visible = false;
    }

    pub(crate) fn minimize(&self) {
        log_failure("minimize", self.surface.minimize());
        self.lock_state().minimized = true;
    }

    pub(crate) fn toggle_maximize(&self) {
        if self.sync().maximized {
            log_failure("unmaximize", self.surface.unmaximize());
            self.lock_state().maximized = false;
        } else {
            log_failure("maximize", self.surface.maximize());
            self.lock_state().maximized = true;
        }
    }

    pub(crate) fn toggle_visibility(&self) {
        if self.sync().visible {
            self.hide();
        } else {
            self.show();
        }
    }

    /// Stops the backend, then closes the window once it has exited. Ignored
    /// while a close is already underway.
    pub(crate) fn request_close<B>(&self, backend: &B)
    where
        B: BackendTerminator + ?Sized,
    {
        if self.quitting.swap(true, Ordering::SeqCst) {
            tracing::debug!("close already in progress; request ignored");
            return;
        }

        append_shutdown_log("close requested; stopping backend before closing window");
        let surface = self.surface.clone();
        let state = Arc::clone(&self.state);
        backend.terminate(Box::new(move |report| {
            append_shutdown_log(&format!(
                "backend ended as {} (exit code {:?}); closing window",
                report.final_state.as_str(),
                report.exit_code
            ));
            log_failure("close", surface.close());
            state.lock().unwrap_or_else(PoisonError::into_inner).visible = false;
        }));
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_failure(operation: &str, result: Result<(), String>) {
    if let Err(error) = result {
        tracing::warn!("main window {operation} failed: {error}");
    }
}
