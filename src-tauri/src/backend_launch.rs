use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::process::Command;

use crate::{deploy_config::DeploySettings, BACKEND_MANAGED_MODE_FLAG};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchPlan {
    pub(crate) cmd: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) cwd: PathBuf,
}

impl LaunchPlan {
    /// `<python> gui.py --port <port> --electron`, run from the NKAS root.
    pub(crate) fn from_settings(root_dir: &Path, settings: &DeploySettings) -> Self {
        Self {
            cmd: settings.python_executable.clone(),
            args: vec![
                settings.entry_script.clone(),
                "--port".to_string(),
                settings.webui_port.clone(),
                BACKEND_MANAGED_MODE_FLAG.to_string(),
            ],
            cwd: root_dir.to_path_buf(),
        }
    }

    pub(crate) fn to_command(&self) -> Command {
        let mut command = Command::new(&self.cmd);
        command
            .args(&self.args)
            .current_dir(&self.cwd)
            .env("PYTHONUNBUFFERED", "1")
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(target_os = "windows")]
        command.creation_flags(crate::CREATE_NO_WINDOW);

        command
    }
}

pub(crate) fn build_debug_command(plan: &LaunchPlan) -> Vec<String> {
    let mut parts = vec![plan.cmd.display().to_string()];
    parts.extend(plan.args.iter().cloned());
    parts
}
