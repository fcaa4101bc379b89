//! Running the external tool.
//!
//! [`Executor`] is the seam between the operation pipeline and process
//! spawning; tests substitute a recording implementation.

use std::process::{Command, ExitStatus, Stdio};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::invocation::Invocation;

/// Runs an [`Invocation`] to completion.
pub trait Executor {
    /// # Errors
    ///
    /// Returns [`Error::SubProcessExit`] with the child's status when it exits
    /// non-zero, or an error if it could not be run at all.
    fn execute(&mut self, invocation: &Invocation) -> Result<()>;
}

/// Spawns the external tool with inherited stdio and waits for it, without a
/// timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<()> {
        let mut command = Command::new(&invocation.executable);
        command.args(invocation.to_args());

        execute_command(command, &invocation.environment)
    }
}

/// Executes a command with additional environment variables.
///
/// The child inherits stdin, stdout and stderr, and its environment is the
/// current process environment plus `environment`.
///
/// # Arguments
///
/// * `command` - The command to spawn, with its arguments already set
/// * `environment` - Extra variables for the child, such as values read from
///   the settings file
///
/// # Errors
///
/// Returns an error if command execution fails or exits with non-zero status.
/// A non-zero exit is [`Error::SubProcessExit`] carrying the child's code, and
/// termination by a signal is [`Error::SubProcessSignal`].
///
/// # Examples
///
/// ```no_run
/// use std::process::Command;
/// use indexmap::IndexMap;
/// use snowrun_core::execution::execute_command;
///
/// let mut command = Command::new("snow");
/// command.args(["connection", "list"]);
///
/// let environment = IndexMap::from([("DEMO_ROLE".to_string(), "DEMO".to_string())]);
/// execute_command(command, &environment)?;
/// # Ok::<(), snowrun_core::error::Error>(())
/// ```
pub fn execute_command<'a, I>(mut command: Command, environment: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let command = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .envs(environment);

    debug!("Spawning {:?}", command);
    let status = command.spawn()?.wait()?;

    check_status(status)
}

fn check_status(status: ExitStatus) -> Result<()> {
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(Error::SubProcessExit { code }),
        None => Err(Error::SubProcessSignal),
    }
}

/// Runs a command and captures its standard output.
///
/// Stdin is closed. Output is decoded lossily as UTF-8.
///
/// # Errors
///
/// Returns [`Error::CapturedExit`] with the captured standard error when the
/// command exits non-zero.
pub fn capture_command(mut command: Command) -> Result<String> {
    let program = command.get_program().to_string_lossy().to_string();
    info!("Capturing output of `{program}`");

    let output = command.stdin(Stdio::null()).output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(Error::CapturedExit {
            program,
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
