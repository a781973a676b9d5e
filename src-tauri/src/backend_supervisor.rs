//! Lifecycle of the single managed backend process.
//!
//! `SupervisorCore` is a plain state machine: every transition returns the
//! side effects it requires (callbacks to run, a kill switch to pull) and
//! `ProcessSupervisor` performs them after releasing its lock. The async half
//! spawns the child, pumps its output into the core and waits for exit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Child,
    sync::oneshot,
};

use crate::{
    backend_launch::LaunchPlan,
    backend_readiness::ReadinessDetector,
    build_debug_command, process_control, ShellError, ShellResult, BACKEND_LOG_TARGET,
    BACKEND_OUTPUT_DRAIN_TIMEOUT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessState {
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

impl ProcessState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServiceProcess {
    pub(crate) pid: Option<u32>,
    pub(crate) state: ProcessState,
    pub(crate) started_at: DateTime<Local>,
    pub(crate) last_exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SupervisorEvent {
    /// One decoded line from the backend's error stream.
    Output(String),
    Exited(Option<i32>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExitReport {
    pub(crate) exit_code: Option<i32>,
    pub(crate) final_state: ProcessState,
    pub(crate) error: Option<String>,
}

pub(crate) type ReadyCallback = Box<dyn FnOnce() + Send>;
pub(crate) type ExitCallback = Box<dyn FnOnce(ExitReport) + Send>;
type EndOfLifeHandler = Arc<dyn Fn(ExitReport) + Send + Sync>;

pub(crate) enum SupervisorEffect {
    Ready(ReadyCallback),
    Kill(oneshot::Sender<()>),
    Finished {
        report: ExitReport,
        callbacks: Vec<ExitCallback>,
    },
}

impl SupervisorEffect {
    fn run(self) {
        match self {
            Self::Ready(callback) => callback(),
            Self::Kill(switch) => {
                if switch.send(()).is_err() {
                    tracing::debug!("backend waiter already gone; kill request dropped");
                }
            }
            Self::Finished { report, callbacks } => {
                for callback in callbacks {
                    callback(report.clone());
                }
            }
        }
    }
}

/// Anything the window coordinator can ask to shut the backend down.
pub(crate) trait BackendTerminator {
    /// `on_done` runs only once the process has exited, or at once when no
    /// process is alive.
    fn terminate(&self, on_done: ExitCallback);
}

#[derive(Default)]
pub(crate) struct SupervisorCore {
    process: Option<ServiceProcess>,
    alive: bool,
    stop_requested: bool,
    readiness: ReadinessDetector,
    kill_switch: Option<oneshot::Sender<()>>,
    on_ready: Option<ReadyCallback>,
    on_end: Option<EndOfLifeHandler>,
    terminate_waiters: Vec<ExitCallback>,
    last_report: Option<ExitReport>,
}

impl SupervisorCore {
    pub(crate) fn begin_start(&mut self) -> ShellResult<()> {
        if self.alive {
            return Err(ShellError::BackendAlreadyRunning);
        }

        self.alive = true;
        self.stop_requested = false;
        self.readiness.reset();
        self.kill_switch = None;
        self.process = Some(ServiceProcess {
            pid: None,
            state: ProcessState::Starting,
            started_at: Local::now(),
            last_exit_code: None,
        });
        Ok(())
    }

    pub(crate) fn attach(
        &mut self,
        pid: Option<u32>,
        kill_switch: oneshot::Sender<()>,
    ) -> Vec<SupervisorEffect> {
        if let Some(process) = self.process.as_mut() {
            process.pid = pid;
        }
        if self.stop_requested {
            return vec![SupervisorEffect::Kill(kill_switch)];
        }
        self.kill_switch = Some(kill_switch);
        Vec::new()
    }

    pub(crate) fn spawn_failed(&mut self, message: String) -> Vec<SupervisorEffect> {
        self.alive = false;
        self.kill_switch = None;
        if let Some(process) = self.process.as_mut() {
            process.state = ProcessState::Failed;
        }
        self.finish(ExitReport {
            exit_code: None,
            final_state: ProcessState::Failed,
            error: Some(message),
        })
    }

    pub(crate) fn handle_event(&mut self, event: SupervisorEvent) -> Vec<SupervisorEffect> {
        if !self.alive {
            return Vec::new();
        }

        match event {
            SupervisorEvent::Output(line) => {
                let Some(process) = self.process.as_mut() else {
                    return Vec::new();
                };
                if process.state != ProcessState::Starting || !self.readiness.observe(&line) {
                    return Vec::new();
                }
                process.state = ProcessState::Running;
                self.on_ready
                    .take()
                    .map(SupervisorEffect::Ready)
                    .into_iter()
                    .collect()
            }
            SupervisorEvent::Exited(exit_code) => {
                self.alive = false;
                self.kill_switch = None;
                let final_state = if self.stop_requested || exit_code == Some(0) {
                    ProcessState::Stopped
                } else {
                    ProcessState::Failed
                };
                if let Some(process) = self.process.as_mut() {
                    process.state = final_state;
                    process.last_exit_code = exit_code;
                }
                self.finish(ExitReport {
                    exit_code,
                    final_state,
                    error: None,
                })
            }
        }
    }

    pub(crate) fn begin_terminate(&mut self, on_done: ExitCallback) -> Vec<SupervisorEffect> {
        if !self.alive {
            return vec![SupervisorEffect::Finished {
                report: self.last_known_report(),
                callbacks: vec![on_done],
            }];
        }

        self.terminate_waiters.push(on_done);
        if self.stop_requested {
            return Vec::new();
        }

        self.stop_requested = true;
        if let Some(process) = self.process.as_mut() {
            process.state = ProcessState::Stopping;
        }
        // Not attached yet: `attach` pulls the switch.
        self.kill_switch
            .take()
            .map(SupervisorEffect::Kill)
            .into_iter()
            .collect()
    }

    /// One-shot. Fires immediately when the current process is already ready.
    pub(crate) fn set_on_ready(&mut self, callback: ReadyCallback) -> Vec<SupervisorEffect> {
        if self.alive && self.readiness.is_ready() {
            return vec![SupervisorEffect::Ready(callback)];
        }
        self.on_ready = Some(callback);
        Vec::new()
    }

    pub(crate) fn set_on_end(&mut self, handler: EndOfLifeHandler) {
        self.on_end = Some(handler);
    }

    pub(crate) fn snapshot(&self) -> Option<ServiceProcess> {
        self.process.clone()
    }

    pub(crate) fn live_pid(&self) -> Option<u32> {
        if !self.alive {
            return None;
        }
        self.process.as_ref().and_then(|process| process.pid)
    }

    fn last_known_report(&self) -> ExitReport {
        self.last_report.clone().unwrap_or_else(|| ExitReport {
            exit_code: None,
            final_state: self
                .process
                .as_ref()
                .map_or(ProcessState::Stopped, |process| process.state),
            error: None,
        })
    }

    fn finish(&mut self, report: ExitReport) -> Vec<SupervisorEffect> {
        self.last_report = Some(report.clone());
        self.on_ready = None;

        let mut callbacks: Vec<ExitCallback> = Vec::new();
        if let Some(handler) = self.on_end.clone() {
            callbacks.push(Box::new(move |report| handler(report)));
        }
        callbacks.append(&mut self.terminate_waiters);
        vec![SupervisorEffect::Finished { report, callbacks }]
    }
}

#[derive(Clone, Default)]
pub(crate) struct ProcessSupervisor {
    core: Arc<Mutex<SupervisorCore>>,
}

impl ProcessSupervisor {
    fn lock_core(&self) -> MutexGuard<'_, SupervisorCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply<F>(&self, transition: F)
    where
        F: FnOnce(&mut SupervisorCore) -> Vec<SupervisorEffect>,
    {
        let effects = {
            let mut core = self.lock_core();
            transition(&mut core)
        };
        for effect in effects {
            effect.run();
        }
    }

    /// Spawns the backend on the async runtime. Spawn errors are reported
    /// through the end-of-life handler, not here.
    pub(crate) fn start(&self, plan: LaunchPlan) -> ShellResult<()> {
        self.lock_core().begin_start()?;
        let supervisor = self.clone();
        tauri::async_runtime::spawn(async move {
            supervisor.spawn_and_watch(plan).await;
        });
        Ok(())
    }

    pub(crate) fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.apply(|core| core.set_on_ready(Box::new(callback)));
    }

    pub(crate) fn on_end<F>(&self, handler: F)
    where
        F: Fn(ExitReport) + Send + Sync + 'static,
    {
        self.lock_core().set_on_end(Arc::new(handler));
    }

    pub(crate) fn handle_event(&self, event: SupervisorEvent) {
        self.apply(|core| core.handle_event(event));
    }

    pub(crate) fn snapshot(&self) -> Option<ServiceProcess> {
        self.lock_core().snapshot()
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.lock_core().alive
    }

    /// Synchronous kill for the exit path, where awaiting the waiter task is
    /// no longer possible.
    pub(crate) fn force_kill_if_alive(&self) {
        let Some(pid) = self.lock_core().live_pid() else {
            return;
        };
        match process_control::kill_tree_by_pid(pid) {
            Ok(()) => tracing::info!(pid, "killed backend process during exit"),
            Err(error) => tracing::warn!(pid, "failed to kill backend during exit: {error}"),
        }
    }

    async fn spawn_and_watch(self, plan: LaunchPlan) {
        let debug_command = build_debug_command(&plan);
        let mut child = match plan.to_command().spawn() {
            Ok(child) => child,
            Err(error) => {
                let failure = ShellError::SpawnFailure(format!(
                    "command {debug_command:?} in {}: {error}",
                    plan.cwd.display()
                ));
                tracing::error!("{failure}");
                self.apply(|core| core.spawn_failed(failure.to_string()));
                return;
            }
        };

        let pid = child.id();
        tracing::info!(pid, command = ?debug_command, "backend process spawned");

        let stdout_task = child
            .stdout
            .take()
            .map(|stdout| tauri::async_runtime::spawn(forward_output(stdout, "stdout", None)));
        let stderr_task = child.stderr.take().map(|stderr| {
            tauri::async_runtime::spawn(forward_output(stderr, "stderr", Some(self.clone())))
        });

        let (kill_switch, kill_signal) = oneshot::channel();
        self.apply(|core| core.attach(pid, kill_switch));

        let exit_code = wait_for_exit(&mut child, kill_signal).await;
        for task in [stdout_task, stderr_task].into_iter().flatten() {
            if tokio::time::timeout(BACKEND_OUTPUT_DRAIN_TIMEOUT, task)
                .await
                .is_err()
            {
                tracing::debug!("backend output still open after exit; not waiting further");
            }
        }

        tracing::info!(pid, exit_code, "backend process exited");
        self.handle_event(SupervisorEvent::Exited(exit_code));
    }
}

impl BackendTerminator for ProcessSupervisor {
    fn terminate(&self, on_done: ExitCallback) {
        self.apply(|core| core.begin_terminate(on_done));
    }
}

async fn wait_for_exit(child: &mut Child, kill_signal: oneshot::Receiver<()>) -> Option<i32> {
    let status = tokio::select! {
        status = child.wait() => status,
        signal = kill_signal => {
            if signal.is_ok() {
                if let Err(error) = process_control::request_termination(child) {
                    tracing::warn!("{error}");
                }
            }
            child.wait().await
        }
    };

    match status {
        Ok(status) => status.code(),
        Err(error) => {
            tracing::warn!("failed to wait for backend process: {error}");
            None
        }
    }
}

/// Logs every line of `stream`. Error-stream lines also feed readiness
/// detection. Bytes are decoded lossily so bad encodings never end the loop.
async fn forward_output<R>(stream: R, label: &'static str, supervisor: Option<ProcessSupervisor>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer).await {
            Ok(0) => break,
            Ok(_) => {
                let decoded = String::from_utf8_lossy(&buffer);
                let line = decoded.trim_end_matches(['\r', '\n']);
                tracing::info!(target: BACKEND_LOG_TARGET, stream = label, "{line}");
                if let Some(supervisor) = supervisor.as_ref() {
                    supervisor.handle_event(SupervisorEvent::Output(line.to_string()));
                }
            }
            Err(error) => {
                tracing::warn!("failed to read backend {label}: {error}");
                break;
            }
        }
    }
}
