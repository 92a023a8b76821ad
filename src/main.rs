//! HISE Exporter - queue-driven build, packaging and signing of HISE projects.
//!
//! Reads a queue file of jobs, validates them and runs them one by one,
//! exiting 0 only when every job finished.

use std::process;

#[tokio::main]
async fn main() {
    // Run CLI and get exit code
    let exit_code = match hise_exporter::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {suggestion}");
            }
            1
        }
    };

    process::exit(exit_code);
}
