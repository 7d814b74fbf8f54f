//! Confirmed setting changes: report view and data reset.
//!
//! A first run without `--confirm` prints what would change and a token.
//! Re-running with `--confirm <token>` applies the change, provided nothing
//! moved in between.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::{parse_scope, print_json, Workspace};
use crate::cli::ViewCommands;
use crate::error::Result;
use crate::store::SettingChange;

#[derive(Serialize)]
struct AppliedOutput<'a> {
    #[serde(flatten)]
    change: &'a SettingChange,
    applied: bool,
    changed: bool,
}

/// Execute view commands.
pub fn execute_view(command: &ViewCommands, home: Option<&Path>, json: bool) -> Result<()> {
    match command {
        ViewCommands::Set { view, confirm } => confirmed(
            SettingChange::SetDefaultView { view: *view },
            confirm.as_deref(),
            home,
            json,
        ),
        ViewCommands::Reset { confirm } => {
            confirmed(SettingChange::ResetReportSettings, confirm.as_deref(), home, json)
        }
    }
}

/// Execute the reset command.
pub fn execute_reset(scope: &str, confirm: Option<&str>, home: Option<&Path>, json: bool) -> Result<()> {
    let scope = parse_scope(scope)?;
    confirmed(SettingChange::ResetData { scope }, confirm, home, json)
}

fn confirmed(change: SettingChange, token: Option<&str>, home: Option<&Path>, json: bool) -> Result<()> {
    let ws = Workspace::open(home)?;

    let Some(token) = token else {
        let request = ws.store.request_change(change);
        if json {
            return print_json(&request);
        }
        println!("{}", request.description);
        println!(
            "Re-run with {} to apply.",
            format!("--confirm {}", request.token).yellow()
        );
        return Ok(());
    };

    let changed = ws.store.apply_change(&change, token)?;
    if changed {
        ws.save()?;
    }

    if json {
        return print_json(&AppliedOutput {
            change: &change,
            applied: true,
            changed,
        });
    }
    if changed {
        println!("{}", "Applied.".green());
    } else {
        println!("Nothing to change.");
    }
    Ok(())
}
