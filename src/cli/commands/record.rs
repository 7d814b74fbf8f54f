//! Transaction and task command implementations.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::{parse_date, parse_scope, print_json, Workspace};
use crate::cli::{RecordRef, TaskAddArgs, TaskCommands, TaskEditArgs, TxAddArgs, TxCommands, TxEditArgs};
use crate::error::{Error, Result};
use crate::model::{Task, TaskPatch, Transaction, TransactionKind, TransactionPatch};

#[derive(Serialize)]
struct MutationOutput<'a> {
    id: &'a str,
    date: &'a str,
    action: &'a str,
}

#[derive(Serialize)]
struct ListOutput<'a, T> {
    scope: String,
    count: usize,
    items: &'a [T],
}

/// Execute transaction commands.
pub fn execute_tx(command: &TxCommands, home: Option<&Path>, json: bool) -> Result<()> {
    let ws = Workspace::open(home)?;

    match command {
        TxCommands::Add(args) => tx_add(&ws, args, json),
        TxCommands::Edit(args) => tx_edit(&ws, args, json),
        TxCommands::Rm(record) => {
            let (y, m, d) = parse_date(&record.date)?;
            if !ws.store.remove_transaction(&y, &m, &d, &record.id) {
                return Err(not_found("Transaction", record));
            }
            ws.save()?;
            report(record, "deleted", json)
        }
        TxCommands::Restore(record) => {
            let (y, m, d) = parse_date(&record.date)?;
            if !ws.store.restore_transaction(&y, &m, &d, &record.id) {
                return Err(not_found("Transaction", record));
            }
            ws.save()?;
            report(record, "restored", json)
        }
        TxCommands::List { scope, kind } => {
            let scope = parse_scope(scope)?;
            let items: Vec<Transaction> = ws
                .store
                .transactions(&scope)
                .into_iter()
                .filter(|tx| kind.is_none_or(|k| tx.kind == k))
                .collect();

            if json {
                return print_json(&ListOutput {
                    scope: scope.to_string(),
                    count: items.len(),
                    items: &items,
                });
            }
            if items.is_empty() {
                println!("No transactions in {scope}.");
                return Ok(());
            }
            for tx in &items {
                let amount = match tx.kind {
                    TransactionKind::Income => format!("+{}", tx.amount).green(),
                    TransactionKind::Expense => format!("-{}", tx.amount).red(),
                };
                println!(
                    "{}  {:>12}  {}  {}",
                    tx.id.dimmed(),
                    amount,
                    tx.date,
                    tx.description.as_deref().unwrap_or("")
                );
            }
            println!();
            println!("{} transaction(s)", items.len());
            Ok(())
        }
    }
}

fn tx_add(ws: &Workspace, args: &TxAddArgs, json: bool) -> Result<()> {
    let (y, m, d) = parse_date(&args.date)?;
    let mut tx = Transaction::new(args.amount, args.kind, args.date.trim());
    tx.description = args.description.clone().filter(|s| !s.is_empty());
    if !args.labels.is_empty() {
        tx.labels = Some(args.labels.clone());
    }
    if let Some(id) = &args.id {
        tx = tx.with_id(id.clone());
    }

    let id = ws.store.add_transaction(&y, &m, &d, tx);
    ws.save()?;

    if json {
        return print_json(&MutationOutput {
            id: &id,
            date: &args.date,
            action: "added",
        });
    }
    println!("Added {} {} on {}: {}", args.kind, args.amount, args.date, id.cyan());
    Ok(())
}

fn tx_edit(ws: &Workspace, args: &TxEditArgs, json: bool) -> Result<()> {
    let (y, m, d) = parse_date(&args.record.date)?;
    let patch = TransactionPatch {
        amount: args.amount,
        kind: args.kind,
        description: args.description.as_ref().map(|s| Some(s.clone()).filter(|s| !s.is_empty())),
        date: None,
        labels: if args.clear_labels {
            Some(None)
        } else if args.labels.is_empty() {
            None
        } else {
            Some(Some(args.labels.clone()))
        },
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument("Nothing to change".to_string()));
    }

    if !ws.store.edit_transaction(&y, &m, &d, &args.record.id, &patch) {
        return Err(not_found("Transaction", &args.record));
    }
    ws.save()?;
    report(&args.record, "updated", json)
}

/// Execute task commands.
pub fn execute_task(command: &TaskCommands, home: Option<&Path>, json: bool) -> Result<()> {
    let ws = Workspace::open(home)?;

    match command {
        TaskCommands::Add(args) => task_add(&ws, args, json),
        TaskCommands::Edit(args) => task_edit(&ws, args, json),
        TaskCommands::Rm(record) => {
            let (y, m, d) = parse_date(&record.date)?;
            if !ws.store.remove_task(&y, &m, &d, &record.id) {
                return Err(not_found("Task", record));
            }
            ws.save()?;
            report(record, "deleted", json)
        }
        TaskCommands::Restore(record) => {
            let (y, m, d) = parse_date(&record.date)?;
            if !ws.store.restore_task(&y, &m, &d, &record.id) {
                return Err(not_found("Task", record));
            }
            ws.save()?;
            report(record, "restored", json)
        }
        TaskCommands::Done(record) => {
            let (y, m, d) = parse_date(&record.date)?;
            if !ws.store.toggle_task_done(&y, &m, &d, &record.id) {
                return Err(not_found("Task", record));
            }
            ws.save()?;
            let done = ws
                .store
                .tasks_by_day(&y, &m, &d)
                .iter()
                .any(|t| t.id == record.id && t.is_done);
            report(record, if done { "done" } else { "reopened" }, json)
        }
        TaskCommands::List { scope, pending } => {
            let scope = parse_scope(scope)?;
            let items: Vec<Task> = ws
                .store
                .tasks(&scope)
                .into_iter()
                .filter(|t| !*pending || !t.is_done)
                .collect();

            if json {
                return print_json(&ListOutput {
                    scope: scope.to_string(),
                    count: items.len(),
                    items: &items,
                });
            }
            if items.is_empty() {
                println!("No tasks in {scope}.");
                return Ok(());
            }
            for task in &items {
                let mark = if task.is_done { "[x]".green() } else { "[ ]".normal() };
                let priority = task
                    .priority
                    .map(|p| format!("P{p}").yellow().to_string())
                    .unwrap_or_default();
                println!("{mark} {} {}  {priority}", task.id.dimmed(), task.title);
            }
            println!();
            println!("{} task(s)", items.len());
            Ok(())
        }
    }
}

fn task_add(ws: &Workspace, args: &TaskAddArgs, json: bool) -> Result<()> {
    let (y, m, d) = parse_date(&args.date)?;
    let mut task = Task::new(args.title.clone());
    task.description = args.description.clone().filter(|s| !s.is_empty());
    task.priority = args.priority.filter(|p| *p != 0);
    if let Some(id) = &args.id {
        task = task.with_id(id.clone());
    }

    let id = ws.store.add_task(&y, &m, &d, task);
    ws.save()?;

    if json {
        return print_json(&MutationOutput {
            id: &id,
            date: &args.date,
            action: "added",
        });
    }
    println!("Added task on {}: {}", args.date, id.cyan());
    Ok(())
}

fn task_edit(ws: &Workspace, args: &TaskEditArgs, json: bool) -> Result<()> {
    let (y, m, d) = parse_date(&args.record.date)?;
    let patch = TaskPatch {
        title: args.title.clone(),
        description: args.description.as_ref().map(|s| Some(s.clone()).filter(|s| !s.is_empty())),
        is_done: None,
        priority: args.priority.map(|p| (p != 0).then_some(p)),
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument("Nothing to change".to_string()));
    }

    if !ws.store.edit_task(&y, &m, &d, &args.record.id, &patch) {
        return Err(not_found("Task", &args.record));
    }
    ws.save()?;
    report(&args.record, "updated", json)
}

fn not_found(kind: &'static str, record: &RecordRef) -> Error {
    Error::RecordNotFound {
        kind,
        id: format!("{} on {}", record.id, record.date),
    }
}

fn report(record: &RecordRef, action: &str, json: bool) -> Result<()> {
    if json {
        return print_json(&MutationOutput {
            id: &record.id,
            date: &record.date,
            action,
        });
    }
    println!("{} {}", action.green(), record.id);
    Ok(())
}
