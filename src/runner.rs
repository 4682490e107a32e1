//! Blocking external-process execution with command-line echo.
//!
//! Every child inherits this process's stdin/stdout/stderr (QEMU takes the
//! serial console over stdio), so the runner's only output of its own is the
//! step banner and the command line it is about to execute.

use std::env;
use std::ffi::OsStr;
use std::io;
use std::process::Command;
use std::time::Duration;

pub struct Runner {
    github_actions: bool,
}

/// How a step failed: the human-readable reason plus the child's exit code
/// when the child ran at all.
#[derive(Debug)]
pub struct StepFailure {
    pub reason: String,
    pub code: Option<i32>,
}

impl Runner {
    pub fn new() -> Self {
        let github_actions = env::var("GITHUB_ACTIONS")
            .map(|v| v == "true")
            .unwrap_or(false);
        Self { github_actions }
    }

    /// Announce a step that does not spawn a child process.
    pub fn step_banner(&self, desc: &str) {
        println!();
        println!("==> {desc}");
    }

    /// Echo `cmd` and run it to completion with inherited stdio.
    ///
    /// Returns a [`StepFailure`] if the child could not be started or exited
    /// unsuccessfully; classification into a stage error is the caller's job.
    pub fn run_step(&self, desc: &str, cmd: &mut Command) -> Result<(), StepFailure> {
        println!();
        if self.github_actions {
            println!("::group::{desc}");
        } else {
            println!("==> {desc}");
        }
        println!("{}", render(cmd));

        let status = {
            let mut attempts = 0u32;
            loop {
                match cmd.status() {
                    Ok(status) => break Ok(status),
                    Err(err) => {
                        // The integration tests exercise this binary against
                        // freshly written shell stubs; on parallel test
                        // runners that can surface as a transient `ETXTBUSY`
                        // ("Text file busy") at spawn time.
                        #[cfg(unix)]
                        let should_retry = err.raw_os_error() == Some(26);
                        #[cfg(not(unix))]
                        let should_retry = false;

                        if should_retry && attempts < 3 {
                            attempts += 1;
                            std::thread::sleep(Duration::from_millis(10 * attempts as u64));
                            continue;
                        }

                        break Err(err);
                    }
                }
            }
        };

        if self.github_actions {
            println!("::endgroup::");
        }

        let status = status.map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StepFailure {
                reason: format!("missing required command: {}", display(cmd.get_program())),
                code: None,
            },
            _ => StepFailure {
                reason: format!("failed to run {}: {err}", display(cmd.get_program())),
                code: None,
            },
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(StepFailure {
                reason: format!("{desc} ({status})"),
                code: status.code(),
            })
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a command the way a shell would be given it, for the pre-execution
/// echo. Purely cosmetic: no quoting, since none of the fixed argv strings
/// contain whitespace.
pub fn render(cmd: &Command) -> String {
    let mut parts = vec![display(cmd.get_program())];
    parts.extend(cmd.get_args().map(display));
    parts.join(" ")
}

fn display(value: &OsStr) -> String {
    value.to_string_lossy().to_string()
}
