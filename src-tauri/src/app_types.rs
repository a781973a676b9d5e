use crate::{
    backend_supervisor::ServiceProcess,
    control_client::{ControlOutcome, ControlResponseBody},
};

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackendBridgeState {
    pub(crate) running: bool,
    pub(crate) state: Option<&'static str>,
    pub(crate) pid: Option<u32>,
    pub(crate) started_at: Option<String>,
    pub(crate) last_exit_code: Option<i32>,
    pub(crate) can_manage: bool,
}

impl BackendBridgeState {
    pub(crate) fn from_snapshot(snapshot: Option<&ServiceProcess>, quitting: bool) -> Self {
        let Some(process) = snapshot else {
            return Self {
                running: false,
                state: None,
                pid: None,
                started_at: None,
                last_exit_code: None,
                can_manage: !quitting,
            };
        };

        Self {
            running: matches!(
                process.state,
                crate::backend_supervisor::ProcessState::Running
            ),
            state: Some(process.state.as_str()),
            pid: process.pid,
            started_at: Some(process.started_at.to_rfc3339()),
            last_exit_code: process.last_exit_code,
            can_manage: !quitting,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct BackendBridgeResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ControlBridgeResult {
    pub(crate) ok: bool,
    pub(crate) status: Option<u16>,
    pub(crate) body: Option<ControlResponseBody>,
    pub(crate) reason: Option<String>,
}

impl From<ControlOutcome> for ControlBridgeResult {
    fn from(outcome: ControlOutcome) -> Self {
        Self {
            ok: outcome.ok,
            status: Some(outcome.status),
            body: Some(outcome.body),
            reason: None,
        }
    }
}

impl ControlBridgeResult {
    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: None,
            body: None,
            reason: Some(reason.into()),
        }
    }
}
