//! Profile command implementations.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::{print_json, Workspace};
use crate::cli::{ProfileCommands, ProfileSetArgs};
use crate::error::{Error, Result};
use crate::model::AppState;
use crate::store::ProfileUpdate;
use crate::sync::remote::DEFAULT_FILENAME;

#[derive(Serialize)]
struct ProfileOutput<'a> {
    user_name: &'a str,
    language: &'a str,
    selected_date: &'a str,
    default_date: &'a str,
    avatar_url: &'a str,
    default_view: &'a str,
    sync_enabled: bool,
    token_set: bool,
    gist_id: Option<&'a str>,
    filename: &'a str,
    records: usize,
    tombstones: usize,
}

impl<'a> ProfileOutput<'a> {
    fn new(state: &'a AppState) -> Self {
        Self {
            user_name: &state.user_name,
            language: &state.language,
            selected_date: &state.selected_date,
            default_date: &state.default_date,
            avatar_url: &state.avatar_url,
            default_view: state.settings.default_view.as_str(),
            sync_enabled: state.sync_enabled,
            token_set: !state.token.is_empty(),
            gist_id: Some(state.gist_id.as_str()).filter(|s| !s.is_empty()),
            filename: if state.filename.is_empty() {
                DEFAULT_FILENAME
            } else {
                &state.filename
            },
            records: state.data.record_count(),
            tombstones: state.data.tombstone_count(),
        }
    }
}

/// Execute profile commands.
pub fn execute(command: &ProfileCommands, home: Option<&Path>, json: bool) -> Result<()> {
    let ws = Workspace::open(home)?;

    match command {
        ProfileCommands::Show => show(&ws, json),
        ProfileCommands::Set(args) => set(&ws, args, json),
    }
}

fn show(ws: &Workspace, json: bool) -> Result<()> {
    let state = ws.store.state();
    let out = ProfileOutput::new(&state);

    if json {
        return print_json(&out);
    }

    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    println!("{}", "Profile".cyan().bold());
    println!("  Name:          {}", or_dash(out.user_name));
    println!("  Language:      {}", or_dash(out.language));
    println!("  Selected date: {}", or_dash(out.selected_date));
    println!("  Default date:  {}", or_dash(out.default_date));
    println!("  Default view:  {}", out.default_view);
    println!();
    println!("{}", "Sync".cyan().bold());
    let enabled = if out.sync_enabled { "yes".green() } else { "no".yellow() };
    println!("  Enabled:       {enabled}");
    println!("  Token:         {}", if out.token_set { "set" } else { "not set" });
    println!("  Gist:          {}", out.gist_id.unwrap_or("-"));
    println!("  File:          {}", out.filename);
    println!();
    println!(
        "  {} record(s), {} tombstone(s) in {}",
        out.records,
        out.tombstones,
        ws.state_path().display().to_string().dimmed()
    );
    Ok(())
}

fn set(ws: &Workspace, args: &ProfileSetArgs, json: bool) -> Result<()> {
    let update = ProfileUpdate {
        user_name: args.name.clone(),
        language: args.language.clone(),
        selected_date: args.selected_date.clone(),
        default_date: args.default_date.clone(),
        token: args.token.clone(),
        gist_id: args.gist_id.clone(),
        filename: args.filename.clone(),
        sync_enabled: args.sync,
        avatar_url: args.avatar_url.clone(),
    };
    if update.is_empty() {
        return Err(Error::InvalidArgument(
            "Pass at least one field to change, e.g. --name".to_string(),
        ));
    }

    let changed = ws.store.update_profile(&update);
    if changed {
        ws.save()?;
    }

    if json {
        let state = ws.store.state();
        return print_json(&serde_json::json!({
            "changed": changed,
            "profile": ProfileOutput::new(&state),
        }));
    }
    if changed {
        println!("Profile updated.");
    } else {
        println!("Profile unchanged.");
    }
    Ok(())
}
