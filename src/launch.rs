//! Emulator Launcher: boot the staged tree under QEMU/OVMF.
//!
//! Blocks until the guest exits; the guest owns this process's console for
//! the duration of the run (serial over stdio). QEMU's exit status becomes
//! the pipeline's exit status, unmodified.

use crate::constants::QEMU_BINARY;
use crate::error::{Result, RunError};
use crate::runner::Runner;
use crate::tools;

pub fn run(runner: &Runner) -> Result<()> {
    runner
        .run_step(&format!("launch: {QEMU_BINARY}"), &mut tools::qemu_launch())
        .map_err(RunError::launch)
}
