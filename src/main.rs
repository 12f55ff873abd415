//! RAX FS Adapter - Entry Point
//!
//! Loads adapter settings, opens the configured root and logs a recursive
//! listing of the directory given as the first argument (the root by default).

use log::{error, info};
use std::process::ExitCode;

use rax_fs_adapter::error::handle_error;
use rax_fs_adapter::utils::setup_logging;
use rax_fs_adapter::{Adapter, AdapterSettings, EntryKind, LocalAdapter};

fn main() -> ExitCode {
    setup_logging();

    let settings = match AdapterSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load adapter settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    let adapter = match LocalAdapter::from_settings(&settings) {
        Ok(adapter) => adapter,
        Err(e) => {
            handle_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let directory = std::env::args().nth(1).unwrap_or_default();
    match adapter.list_contents(&directory, true) {
        Ok(entries) => {
            for entry in &entries {
                match entry.kind {
                    EntryKind::Dir => info!("{:>12}  {}  {}/", "-", entry.timestamp, entry.path),
                    EntryKind::File => info!(
                        "{:>12}  {}  {}",
                        entry.size.unwrap_or_default(),
                        entry.timestamp,
                        entry.path
                    ),
                }
            }
            info!("{} entries under {:?}", entries.len(), directory);
            ExitCode::SUCCESS
        }
        Err(e) => {
            handle_error(&e);
            ExitCode::FAILURE
        }
    }
}
