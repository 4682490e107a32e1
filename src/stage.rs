//! Artifact Stager: copy the compiled app into the boot partition layout.
//!
//! Exactly one file moves: the built `.efi` is copied to the path UEFI boot
//! discovery scans (`EFI/BOOT/BOOTX64.EFI`). The staging tree is owned by
//! the developer, not by this loop: nothing is created, cleaned, or locked
//! here, and the copy overwrites whatever a previous run staged.

use std::fs;
use std::path::Path;

use crate::error::{Result, RunError};
use crate::inspect;
use crate::paths;
use crate::runner::Runner;

pub fn run(runner: &Runner) -> Result<()> {
    let src = paths::built_artifact();
    let dst = paths::staged_artifact();
    runner.step_banner(&format!("stage {} -> {}", src.display(), dst.display()));

    copy_artifact(&src, &dst)?;

    // Diagnostic only: a failed dump never fails the pipeline.
    inspect::write_disassembly(&src);

    Ok(())
}

/// Copy `src` to `dst`, overwriting. The copy itself is the existence
/// check: a missing source and a missing destination directory both surface
/// as the copy's io error, undistinguished.
pub fn copy_artifact(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|err| RunError::StageFailure {
        reason: format!("copy {} -> {}: {err}", src.display(), dst.display()),
    })?;
    Ok(())
}
