//! Sync command implementations.
//!
//! Each command builds a [`SyncEngine`] over the loaded workspace and the
//! gist remote, runs one round-trip (or the foreground loop for `watch`),
//! and writes the state file plus sync bookkeeping back afterwards, whether
//! the round-trip succeeded or not.

use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use serde::Serialize;
use tracing::{debug, info};

use super::{print_json, Workspace};
use crate::cli::SyncCommands;
use crate::clock::{Clock, SystemClock};
use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::sync::{
    gc, ConflictPolicy, GcStats, GistStore, Resolution, SyncEngine, SyncReport, SyncResult,
    SyncState, SyncStatus,
};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Serialize)]
struct StatusOutput<'a> {
    can_sync: bool,
    gist_id: Option<&'a str>,
    dirty: bool,
    last_synced_at: Option<i64>,
    policy: ConflictPolicy,
    debounce_ms: u64,
    poll_secs: u64,
    retention_days: u64,
}

#[derive(Serialize)]
struct GcOutput {
    retention_days: u64,
    #[serde(flatten)]
    collected: GcStats,
}

/// Execute sync commands.
pub fn execute(command: &SyncCommands, home: Option<&Path>, json: bool) -> Result<()> {
    let mut ws = Workspace::open(home)?;
    let config = SyncConfig::resolve(ws.home())?;
    debug!(?config, "Resolved sync config");

    if let SyncCommands::Gc { days } = command {
        return collect(&ws, &config, *days, json);
    }

    let remote = GistStore::new(&config.api_url, config.request_timeout)?;
    let engine = SyncEngine::new(ws.store.clone(), remote, config, ws.meta.clone());

    if let SyncCommands::Status = command {
        return status(&ws, &engine, json);
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;

    rt.block_on(async {
        if engine.config().conflict_policy == ConflictPolicy::Ask && !json {
            answer_prompts(&engine);
        }

        match command {
            SyncCommands::Now => finish(&mut ws, &engine, engine.sync_now().await, json),
            SyncCommands::Push => finish(&mut ws, &engine, engine.push().await, json),
            SyncCommands::Pull { replace } => {
                let result = if *replace {
                    engine.pull_with(ConflictPolicy::RemoteWins).await
                } else {
                    engine.pull().await
                };
                finish(&mut ws, &engine, result, json)
            }
            SyncCommands::Watch => watch(&mut ws, &engine, json).await,
            SyncCommands::Status | SyncCommands::Gc { .. } => Ok(()),
        }
    })
}

/// Persist after a round-trip, then report it.
fn finish(
    ws: &mut Workspace,
    engine: &SyncEngine<GistStore>,
    result: SyncResult<SyncReport>,
    json: bool,
) -> Result<()> {
    ws.meta = engine.meta();
    ws.save()?;
    let report = result?;

    if json {
        return print_json(&report);
    }

    println!("{} {}", "Sync:".cyan().bold(), report.action);
    if let Some(merge) = report.merge {
        println!(
            "  {} from remote, {} kept local, {} conflict(s), {} resurrected",
            merge.from_remote, merge.from_local, merge.conflicts, merge.resurrected
        );
    }
    if !report.collected.is_empty() {
        println!("  {} expired tombstone(s) left out", report.collected.total());
    }
    if let Some(id) = &report.gist_id {
        println!("  Created gist {}", id.cyan());
    }
    Ok(())
}

fn status(ws: &Workspace, engine: &SyncEngine<GistStore>, json: bool) -> Result<()> {
    let state = ws.store.state();
    let config = engine.config();
    let out = StatusOutput {
        can_sync: state.can_sync(),
        gist_id: Some(state.gist_id.as_str()).filter(|s| !s.is_empty()),
        dirty: engine.is_dirty(),
        last_synced_at: ws.meta.last_synced_at,
        policy: config.conflict_policy,
        debounce_ms: u64::try_from(config.debounce.as_millis()).unwrap_or(u64::MAX),
        poll_secs: config.poll_interval.as_secs(),
        retention_days: config.retention.as_secs() / DAY.as_secs(),
    };

    if json {
        return print_json(&out);
    }

    println!("{}", "Sync Status".cyan().bold());
    let enabled = if out.can_sync { "yes".green() } else { "no".yellow() };
    println!("  Enabled:     {enabled}");
    println!("  Gist:        {}", out.gist_id.unwrap_or("-"));
    let last = out
        .last_synced_at
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map_or_else(|| "never".to_string(), |t| t.to_rfc3339());
    println!("  Last synced: {last}");
    let pending = if out.dirty { "yes".yellow() } else { "no".green() };
    println!("  Unpushed:    {pending}");
    println!("  Policy:      {}", out.policy);
    Ok(())
}

fn collect(ws: &Workspace, config: &SyncConfig, days: Option<u64>, json: bool) -> Result<()> {
    let retention = days.map_or(config.retention, |d| DAY * u32::try_from(d).unwrap_or(u32::MAX));
    let (collected, stats) = gc::collect(&ws.store.state().data, retention, SystemClock.now_ms());
    if !stats.is_empty() {
        ws.store.replace_data(collected);
        ws.save()?;
        info!(transactions = stats.transactions, tasks = stats.tasks, "Collected local tombstones");
    }

    if json {
        return print_json(&GcOutput {
            retention_days: retention.as_secs() / DAY.as_secs(),
            collected: stats,
        });
    }
    println!("Removed {} expired tombstone(s).", stats.total());
    Ok(())
}

/// Sync in the foreground until Ctrl-C, saving after every change.
async fn watch(ws: &mut Workspace, engine: &SyncEngine<GistStore>, json: bool) -> Result<()> {
    let mut changes = ws.store.subscribe();
    let mut states = engine.subscribe();
    let run = engine.run(async {
        let _ = tokio::signal::ctrl_c().await;
    });
    tokio::pin!(run);

    if !json {
        println!("Watching for changes. Press Ctrl-C to stop.");
    }

    loop {
        tokio::select! {
            () = &mut run => break,
            Ok(()) = changes.changed() => {
                ws.meta = engine.meta();
                ws.save()?;
            }
            Ok(()) = states.changed() => {
                let state = states.borrow_and_update().clone();
                ws.meta = engine.meta();
                ws.save()?;
                print_state(&state, json)?;
            }
        }
    }

    ws.meta = engine.meta();
    ws.save()
}

fn print_state(state: &SyncState, json: bool) -> Result<()> {
    if json {
        return print_json(state);
    }
    match &state.status {
        SyncStatus::Idle | SyncStatus::Loading => {}
        SyncStatus::Success(action) => println!("{} {action}", "sync".green()),
        SyncStatus::Error(msg) => println!("{} {msg}", "sync failed".red()),
    }
    Ok(())
}

/// Answer conflict prompts on the terminal.
fn answer_prompts(engine: &SyncEngine<GistStore>) {
    if !std::io::stdin().is_terminal() {
        return;
    }
    let mut prompts = engine.conflict_prompts();
    tokio::spawn(async move {
        while let Some(prompt) = prompts.recv().await {
            let (local, remote) = (prompt.local_records, prompt.remote_records);
            let answer = tokio::task::spawn_blocking(move || ask(local, remote))
                .await
                .unwrap_or(Resolution::Merge);
            let _ = prompt.reply.send(answer);
        }
    });
}

fn ask(local: usize, remote: usize) -> Resolution {
    let mut stderr = std::io::stderr();
    let _ = write!(
        stderr,
        "Local ({local} records) and remote ({remote} records) both changed. \
         [m]erge, use [r]emote, keep [l]ocal? "
    );
    let _ = stderr.flush();

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return Resolution::Merge;
    }
    match line.trim().to_lowercase().as_str() {
        "r" | "remote" => Resolution::UseRemote,
        "l" | "local" => Resolution::KeepLocal,
        _ => Resolution::Merge,
    }
}
