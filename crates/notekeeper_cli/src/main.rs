//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notekeeper_core` linkage.
//! - Optionally load a note store and report its size.
//!
//! Usage: `notekeeper_cli [DATA_DIR]`

use notekeeper_core::{open_store, StoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notekeeper_core ping={}", notekeeper_core::ping());
    println!("notekeeper_core version={}", notekeeper_core::core_version());

    let Some(data_dir) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    let config = match StoreConfig::from_data_dir(&data_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid data dir: {err}");
            return ExitCode::FAILURE;
        }
    };

    let store = open_store(&config);
    println!(
        "notekeeper_core store={} notes={}",
        config.notes_path().display(),
        store.len()
    );
    ExitCode::SUCCESS
}
