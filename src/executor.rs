use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// Trait for the remote command channel.
///
/// The engine hands over a fully formed command string and blocks on its
/// completion; it does not manage the channel's lifecycle.
pub trait CommandExecutor {
    /// Run a command and return its raw textual output
    fn execute(&self, command: &str) -> Result<String>;
}

/// Executes command strings through the local shell
pub struct ShellExecutor;

impl CommandExecutor for ShellExecutor {
    fn execute(&self, command: &str) -> Result<String> {
        debug!(command, "Executing remote command");

        let output = Command::new("sh")
            .args(["-c", command])
            .output()
            .map_err(|e| Error::Executor(format!("failed to spawn `{}`: {}", command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Executor(format!(
                "`{}` exited with {}: {}",
                command,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::Executor(format!("invalid UTF-8 in command output: {}", e)))?;

        debug!(bytes = stdout.len(), "Command completed");

        Ok(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let out = ShellExecutor.execute("printf 'hello'").unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_nonzero_exit_is_executor_error() {
        let err = ShellExecutor.execute("exit 3").unwrap_err();
        assert!(matches!(err, Error::Executor(_)));
    }
}
