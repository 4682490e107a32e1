//! Deterministic path derivation for the build artifact and its staged copy.

use std::path::{Path, PathBuf};

use crate::constants::{APP_ARTIFACT, BOOT_FILE, BUILD_PROFILE, BUILD_TARGET, EFI_PARTITION};

/// Where cargo leaves the compiled app:
/// `target/<target-triple>/<profile>/<artifact>`.
pub fn built_artifact() -> PathBuf {
    Path::new("target")
        .join(BUILD_TARGET)
        .join(BUILD_PROFILE)
        .join(APP_ARTIFACT)
}

/// Where the firmware expects to find the boot application:
/// `efi_partition/EFI/BOOT/BOOTX64.EFI`, regardless of the artifact name.
pub fn staged_artifact() -> PathBuf {
    Path::new(EFI_PARTITION).join(BOOT_FILE)
}
