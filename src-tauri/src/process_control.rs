use std::process::{Command, Stdio};

use tokio::process::Child;

/// Asks the backend (and, on Windows, its whole process tree) to die. The
/// caller still awaits `Child::wait` to observe the exit.
pub(crate) fn request_termination(child: &mut Child) -> Result<(), String> {
    #[cfg(target_os = "windows")]
    {
        if let Some(pid) = child.id() {
            match kill_tree_by_pid(pid) {
                Ok(()) => return Ok(()),
                Err(error) => {
                    tracing::warn!("taskkill failed for backend pid {pid}: {error}");
                }
            }
        }
    }

    match child.start_kill() {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
        Err(error) => Err(format!("failed to kill backend process: {error}")),
    }
}

/// Last-resort kill used while the shell itself is exiting and no async
/// runtime work can be awaited.
pub(crate) fn kill_tree_by_pid(pid: u32) -> Result<(), String> {
    let mut command = kill_command(pid);
    let program = command.get_program().to_string_lossy().into_owned();
    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|error| format!("failed to run {program}: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("kill command for pid {pid} exited with {status}"))
    }
}

#[cfg(target_os = "windows")]
fn kill_command(pid: u32) -> Command {
    use std::os::windows::process::CommandExt;

    let mut command = Command::new("taskkill");
    command
        .args(["/pid", &pid.to_string(), "/t", "/f"])
        .creation_flags(crate::CREATE_NO_WINDOW);
    command
}

#[cfg(not(target_os = "windows"))]
fn kill_command(pid: u32) -> Command {
    let mut command = Command::new("kill");
    command.args(["-KILL", &pid.to_string()]);
    command
}
