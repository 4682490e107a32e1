//! Toolchain Invoker: verify the nightly toolchain, then build the app.

use crate::error::{Result, RunError};
use crate::runner::Runner;
use crate::tools;

pub fn run(runner: &Runner) -> Result<()> {
    // Diagnostic in output, load-bearing in exit status: a channel that
    // can't even report its version can't run the build below.
    runner
        .run_step("build: rustc version", &mut tools::rustc_version())
        .map_err(RunError::build)?;

    runner
        .run_step("build: cargo build", &mut tools::cargo_build())
        .map_err(RunError::build)?;

    Ok(())
}
