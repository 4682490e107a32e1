//! Local development loop for the `uefi-div-bug` UEFI test app.
//!
//! One linear pipeline, three stages, no branching:
//!
//! 1. build the app with the nightly toolchain for `x86_64-unknown-uefi`,
//! 2. stage the compiled image at `efi_partition/EFI/BOOT/BOOTX64.EFI`,
//! 3. boot it under `qemu-system-x86_64` with OVMF on pflash and the
//!    staging tree attached as a writable FAT passthrough disk.
//!
//! Each stage must fully succeed before the next starts; the first failure
//! aborts the run and becomes the process exit status. After staging, a
//! best-effort diagnostic pass dumps a per-function disassembly of the
//! artifact to `disas.txt`.

pub mod build;
pub mod constants;
pub mod error;
pub mod inspect;
pub mod launch;
pub mod paths;
pub mod pipeline;
pub mod runner;
pub mod stage;
pub mod tools;

pub use error::{Result, RunError};
pub use pipeline::{Pipeline, PipelineState, StageId};
