//! Fixed knobs of the dev loop.
//!
//! Everything here is a hard constant: there are no flags, environment
//! variables, or config files that override these. Relative paths resolve
//! against the process working directory.

/// Toolchain channel the app must be built with (`-Zbuild-std` needs nightly).
pub const TOOLCHAIN_CHANNEL: &str = "nightly";

/// Target triple the app is compiled for.
pub const BUILD_TARGET: &str = "x86_64-unknown-uefi";

/// Cargo profile; determines the artifact directory under `target/`.
pub const BUILD_PROFILE: &str = "debug";

/// Package name of the UEFI app this loop builds and boots.
pub const APP_PACKAGE: &str = "uefi-div-bug";

/// Filename of the compiled PE image cargo produces for [`APP_PACKAGE`].
pub const APP_ARTIFACT: &str = "uefi-div-bug.efi";

/// Root of the staging tree QEMU exposes to the guest as a FAT volume.
pub const EFI_PARTITION: &str = "efi_partition";

/// Path under the staging root where UEFI boot discovery looks for an x64
/// application. This exact path is a contract with the firmware; never
/// rename it.
pub const BOOT_FILE: &str = "EFI/BOOT/BOOTX64.EFI";

/// OVMF firmware flash image, attached read-only.
pub const OVMF_IMAGE: &str = "ovmf.fd";

/// Emulator binary.
pub const QEMU_BINARY: &str = "qemu-system-x86_64";

/// Where the post-staging disassembly dump is written.
pub const DISAS_OUTPUT: &str = "disas.txt";
