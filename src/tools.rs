//! Constructors for the external commands the pipeline invokes.
//!
//! Argv is fixed; nothing here is parameterized at call time.

use std::process::Command;

use crate::constants::{
    APP_PACKAGE, BUILD_TARGET, EFI_PARTITION, OVMF_IMAGE, QEMU_BINARY, TOOLCHAIN_CHANNEL,
};

/// `rustc +nightly --version` — diagnostic visibility for the toolchain the
/// build is about to use. Output is shown, never parsed.
pub fn rustc_version() -> Command {
    let mut cmd = Command::new("rustc");
    cmd.arg(format!("+{TOOLCHAIN_CHANNEL}")).arg("--version");
    cmd
}

/// The UEFI app build. `-Zbuild-std` rebuilds core/alloc for the UEFI
/// target; RUSTFLAGS keeps LLVM IR and annotated assembly next to the
/// artifact for the post-staging disassembly dump to correlate against.
pub fn cargo_build() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg(format!("+{TOOLCHAIN_CHANNEL}"))
        .arg("build")
        .arg(format!("--target={BUILD_TARGET}"))
        .args([
            "-Zbuild-std=core,compiler_builtins,alloc",
            "-Zbuild-std-features=compiler-builtins-mem",
            "--package",
            APP_PACKAGE,
        ])
        .env("RUSTFLAGS", "--emit llvm-ir --emit asm -Z asm-comments");
    cmd
}

/// The QEMU launch: KVM acceleration, no display, guest serial on our
/// stdio, OVMF attached as a read-only pflash drive, and the staging tree
/// attached as a writable FAT passthrough disk.
pub fn qemu_launch() -> Command {
    let mut cmd = Command::new(QEMU_BINARY);
    cmd.args(["-enable-kvm", "-display", "none", "-serial", "stdio"])
        .arg("-drive")
        .arg(format!("if=pflash,format=raw,readonly=on,file={OVMF_IMAGE}"))
        .arg("-drive")
        .arg(format!("format=raw,file=fat:rw:{EFI_PARTITION}"));
    cmd
}
