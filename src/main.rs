use std::process;

use uefi_run::Pipeline;

fn main() {
    // No flags, no subcommands: one invocation runs the whole loop.
    if let Err(err) = Pipeline::new().run() {
        eprintln!("error: {err}");
        process::exit(err.exit_code());
    }
}
