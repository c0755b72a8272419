// TourBox Shell Spawner
// Detached `sh -c` launches for shell: actions

use std::process::{Command, Stdio};

use super::{CommandSpawner, ShellSpawnError};

/// Runs shell actions through `sh -c` without waiting for them
#[derive(Debug, Clone)]
pub struct ShellSpawner {
    shell: String,
}

impl Default for ShellSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellSpawner {
    pub fn new() -> Self {
        Self::with_shell("/bin/sh")
    }

    /// Use a different shell binary; it must accept `-c <command>`
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl CommandSpawner for ShellSpawner {
    fn spawn_detached(&mut self, command: &str) -> Result<(), ShellSpawnError> {
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ShellSpawnError {
                command: command.to_string(),
                source,
            })?;

        // Reap off the event loop so finished commands don't linger as zombies.
        let pid = child.id();
        std::thread::spawn(move || match child.wait() {
            Ok(status) => log::debug!("Shell command (pid {}) exited: {}", pid, status),
            Err(e) => log::debug!("Shell command (pid {}) wait failed: {}", pid, e),
        });

        log::debug!("Executed: {}", command);
        Ok(())
    }
}
