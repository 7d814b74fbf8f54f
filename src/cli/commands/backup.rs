//! Backup export/import command implementations.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::{print_json, Workspace};
use crate::cli::BackupCommands;
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::storage::atomic_write;
use crate::sync::codec;

#[derive(Serialize)]
struct ExportOutput<'a> {
    path: &'a str,
    records: usize,
    version: u32,
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    path: &'a str,
    records: usize,
    source_version: u32,
    changed: bool,
}

/// Execute backup commands.
pub fn execute(command: &BackupCommands, home: Option<&Path>, json: bool) -> Result<()> {
    let ws = Workspace::open(home)?;

    match command {
        BackupCommands::Export { output } => {
            let state = ws.store.state();
            let backup = codec::export(&state);
            let content = codec::encode(&backup)?;

            let Some(output) = output else {
                println!("{content}");
                return Ok(());
            };
            atomic_write(output, &content)?;
            let path = output.display().to_string();
            info!(%path, "Exported backup");

            if json {
                return print_json(&ExportOutput {
                    path: &path,
                    records: state.data.record_count(),
                    version: backup.version,
                });
            }
            println!("Exported {} record(s) to {path}", state.data.record_count());
            Ok(())
        }
        BackupCommands::Import { file } => {
            if !file.exists() {
                return Err(Error::BackupNotFound { path: file.clone() });
            }
            let content = fs::read_to_string(file)?;
            let value: serde_json::Value = serde_json::from_str(&content)?;
            let source_version = value
                .get("version")
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0);
            let backup = codec::decode_value(value, SystemClock.now_ms())?;

            let changed = ws.store.import_backup(backup);
            ws.save()?;
            let path = file.display().to_string();
            let records = ws.store.state().data.record_count();

            if json {
                return print_json(&ImportOutput {
                    path: &path,
                    records,
                    source_version,
                    changed,
                });
            }
            if changed {
                println!("Imported {records} record(s) from {path}");
            } else {
                println!("Backup matches local data; nothing imported.");
            }
            Ok(())
        }
    }
}
