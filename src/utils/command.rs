//! External process execution with consistent error handling.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, RemoteCommandFailedDetails, Result};

/// Run `program` with `args` inside `dir`, capturing output.
///
/// Spawn failures and non-zero exits both become `remote.command_failed`
/// with whatever stdout/stderr was captured.
pub fn run_in(dir: &Path, program: &str, args: &[String]) -> Result<Output> {
    let command_line = display_command(program, args);

    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| {
            Error::remote_command_failed(RemoteCommandFailedDetails {
                command: command_line.clone(),
                exit_code: -1,
                stdout: String::new(),
                stderr: format!("Failed to start {}: {}", program, e),
            })
        })?;

    if !output.status.success() {
        return Err(Error::remote_command_failed(RemoteCommandFailedDetails {
            command: command_line,
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: error_text(&output),
        }));
    }

    Ok(output)
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
