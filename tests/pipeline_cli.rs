//! End-to-end pipeline scenarios against fake `rustc`/`cargo`/QEMU binaries.
//!
//! The stubs log their argv to a file and behave per a few `FAKE_*` env
//! knobs, so each scenario can verify exactly which children ran, with what
//! command lines, and that the pipeline's exit code tracks the failing
//! child's.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ARTIFACT_BYTES: &[u8] = b"fake-efi-image";

struct Harness {
    dir: TempDir,
    bin_dir: PathBuf,
    log_path: PathBuf,
}

impl Harness {
    /// Tempdir working copy with an empty staging tree and all three stubs.
    fn new() -> Self {
        let harness = Self::without_stubs();
        harness.write_rustc_stub();
        harness.write_cargo_stub();
        harness.write_qemu_stub();
        harness
    }

    fn without_stubs() -> Self {
        let dir = tempfile::tempdir().expect("create tempdir");
        let bin_dir = dir.path().join("bin");
        fs::create_dir(&bin_dir).expect("create stub bin dir");
        fs::create_dir_all(dir.path().join("efi_partition/EFI/BOOT"))
            .expect("create staging tree");
        let log_path = dir.path().join("argv.log");
        Self {
            dir,
            bin_dir,
            log_path,
        }
    }

    fn write_rustc_stub(&self) {
        write_stub(
            &self.bin_dir.join("rustc"),
            r#"log_argv rustc "$@"
echo "rustc-stub 1.0.0-nightly"
exit "${FAKE_RUSTC_EXIT:-0}"
"#,
        );
    }

    fn write_cargo_stub(&self) {
        write_stub(
            &self.bin_dir.join("cargo"),
            r#"log_argv cargo "$@"
if [[ "${FAKE_CARGO_EXIT:-0}" != 0 ]]; then
  exit "${FAKE_CARGO_EXIT}"
fi
if [[ "${FAKE_CARGO_SKIP_ARTIFACT:-0}" == 0 ]]; then
  mkdir -p target/x86_64-unknown-uefi/debug
  printf 'fake-efi-image' > target/x86_64-unknown-uefi/debug/uefi-div-bug.efi
fi
exit 0
"#,
        );
    }

    fn write_qemu_stub(&self) {
        write_stub(
            &self.bin_dir.join("qemu-system-x86_64"),
            r#"log_argv qemu-system-x86_64 "$@"
echo "qemu-stub serial console"
exit "${FAKE_QEMU_EXIT:-0}"
"#,
        );
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_uefi-run"));
        cmd.current_dir(self.dir.path())
            .env_clear()
            .env("PATH", &self.bin_dir)
            .env("UEFI_RUN_TEST_LOG", &self.log_path);
        cmd
    }

    fn staged_path(&self) -> PathBuf {
        self.dir.path().join("efi_partition/EFI/BOOT/BOOTX64.EFI")
    }

    fn invocations(&self) -> Vec<Vec<String>> {
        let log = fs::read_to_string(&self.log_path).unwrap_or_default();
        parse_invocations(&log)
    }

    fn programs_invoked(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .filter_map(|argv| argv.first().cloned())
            .collect()
    }
}

/// Stub preamble: a fixed PATH for the coreutils the stubs use themselves,
/// plus an argv logger shared by all three.
fn write_stub(path: &Path, body: &str) {
    let script = format!(
        r#"#!/bin/bash
set -euo pipefail
export PATH=/usr/bin:/bin
log_argv() {{
  local log="${{UEFI_RUN_TEST_LOG:?}}"
  for arg in "$@"; do
    echo "$arg" >> "$log"
  done
  echo "__END__" >> "$log"
}}
{body}"#
    );
    fs::write(path, script).expect("write stub");
    let mut perms = fs::metadata(path).expect("stat stub").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod stub");
}

fn parse_invocations(log: &str) -> Vec<Vec<String>> {
    let mut invocations = Vec::new();
    let mut current = Vec::new();
    for line in log.lines() {
        if line == "__END__" {
            if !current.is_empty() {
                invocations.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(line.to_string());
    }
    invocations
}

#[test]
fn full_pipeline_stages_the_artifact_and_exits_zero() {
    let harness = Harness::new();

    harness.command().assert().success();

    // The staged copy is byte-identical to what the build produced.
    assert_eq!(fs::read(harness.staged_path()).unwrap(), ARTIFACT_BYTES);

    // Strict order: version check, build, then the emulator.
    assert_eq!(
        harness.programs_invoked(),
        ["rustc", "cargo", "qemu-system-x86_64"]
    );

    let invocations = harness.invocations();
    let qemu = invocations.last().unwrap();
    assert!(qemu.contains(&"-enable-kvm".to_string()));
    assert!(qemu.contains(&"if=pflash,format=raw,readonly=on,file=ovmf.fd".to_string()));
    assert!(qemu.contains(&"format=raw,file=fat:rw:efi_partition".to_string()));
}

#[test]
fn pipeline_exit_code_equals_emulator_exit_code() {
    let harness = Harness::new();

    harness
        .command()
        .env("FAKE_QEMU_EXIT", "3")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("launch failed"));

    // The launcher ran; the failure happened inside the guest run.
    assert_eq!(
        harness.programs_invoked(),
        ["rustc", "cargo", "qemu-system-x86_64"]
    );
}

#[test]
fn failing_build_stops_the_pipeline() {
    let harness = Harness::new();

    harness
        .command()
        .env("FAKE_CARGO_EXIT", "1")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("build failed"));

    // Stager and launcher never ran.
    assert_eq!(harness.programs_invoked(), ["rustc", "cargo"]);
    assert!(!harness.staged_path().exists());
}

#[test]
fn failing_version_check_stops_before_the_build() {
    let harness = Harness::new();

    harness
        .command()
        .env("FAKE_RUSTC_EXIT", "2")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("build failed"));

    assert_eq!(harness.programs_invoked(), ["rustc"]);
}

#[test]
fn missing_artifact_after_build_is_a_stage_failure() {
    let harness = Harness::new();

    harness
        .command()
        .env("FAKE_CARGO_SKIP_ARTIFACT", "1")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("staging failed"));

    // The launcher never ran.
    assert_eq!(harness.programs_invoked(), ["rustc", "cargo"]);
    assert!(!harness.staged_path().exists());
}

#[test]
fn missing_staging_tree_is_a_stage_failure_and_is_not_created() {
    let harness = Harness::new();
    fs::remove_dir_all(harness.dir.path().join("efi_partition")).unwrap();

    harness
        .command()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("staging failed"));

    // No directory auto-creation, and no launch.
    assert!(!harness.dir.path().join("efi_partition").exists());
    assert_eq!(harness.programs_invoked(), ["rustc", "cargo"]);
}

#[test]
fn missing_emulator_binary_is_a_launch_failure() {
    let harness = Harness::without_stubs();
    harness.write_rustc_stub();
    harness.write_cargo_stub();
    // No qemu stub on PATH.

    harness
        .command()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "missing required command: qemu-system-x86_64",
        ));

    // Build and staging still completed.
    assert_eq!(fs::read(harness.staged_path()).unwrap(), ARTIFACT_BYTES);
}

#[test]
fn command_lines_are_echoed_before_the_child_runs() {
    let harness = Harness::new();

    let output = harness.command().assert().success().get_output().clone();
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

    let echo_idx = stdout
        .find("rustc +nightly --version")
        .expect("version-check command line should be echoed");
    let stub_idx = stdout
        .find("rustc-stub 1.0.0-nightly")
        .expect("stub output should be captured");
    assert!(echo_idx < stub_idx, "echo must precede the child's output");

    let qemu_echo_idx = stdout
        .find("qemu-system-x86_64 -enable-kvm -display none -serial stdio")
        .expect("launch command line should be echoed");
    let qemu_stub_idx = stdout
        .find("qemu-stub serial console")
        .expect("qemu stub output should be captured");
    assert!(qemu_echo_idx < qemu_stub_idx);
}

#[test]
fn restaging_is_idempotent_across_runs() {
    let harness = Harness::new();

    harness.command().assert().success();
    let after_first = fs::read(harness.staged_path()).unwrap();

    harness.command().assert().success();
    let after_second = fs::read(harness.staged_path()).unwrap();

    assert_eq!(after_first, after_second);
}
