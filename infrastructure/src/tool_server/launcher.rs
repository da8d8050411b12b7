//! Tool server process launcher
//!
//! Runs `mcp.startup_command` through the platform shell when the tool
//! server does not answer its first health probes. The child is killed when
//! the launcher is dropped.

use async_trait::async_trait;
use std::process::Stdio;
use storm_application::{ServerLauncher, ToolServerError};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Starts the tool server with a shell command, at most once.
#[derive(Debug)]
pub struct CommandLauncher {
    command: String,
    child: Mutex<Option<Child>>,
}

impl CommandLauncher {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            child: Mutex::new(None),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn shell(command: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    }
}

#[async_trait]
impl ServerLauncher for CommandLauncher {
    async fn launch(&self) -> Result<(), ToolServerError> {
        let mut child = self.child.lock().await;
        if let Some(running) = child.as_mut() {
            match running.try_wait() {
                Ok(None) => {
                    warn!("Tool server process already started; not launching again");
                    return Ok(());
                }
                Ok(Some(status)) => warn!("Previous tool server process exited with {}", status),
                Err(e) => warn!("Failed to poll tool server process: {}", e),
            }
        }

        info!("Starting tool server: {}", self.command);
        let spawned = Self::shell(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolServerError::Launch {
                command: self.command.clone(),
                reason: e.to_string(),
            })?;
        *child = Some(spawned);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_launch_runs_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("started");
        let launcher = CommandLauncher::new(format!("echo up > '{}'", marker.display()));

        launcher.launch().await.unwrap();

        let mut waited = 0;
        while !marker.exists() && waited < 50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            waited += 1;
        }
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_running_process_is_not_launched_twice() {
        let launcher = CommandLauncher::new("sleep 5");

        launcher.launch().await.unwrap();
        launcher.launch().await.unwrap();

        let mut child = launcher.child.lock().await;
        assert!(child.as_mut().unwrap().try_wait().unwrap().is_none());
    }
}
