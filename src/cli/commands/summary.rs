//! Summary command implementation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::{parse_scope, print_json, Workspace};
use crate::error::{Error, Result};
use crate::model::Summary;

#[derive(Serialize)]
struct SummaryOutput {
    scope: String,
    #[serde(flatten)]
    summary: Summary,
}

/// Execute the summary command.
///
/// # Errors
///
/// Returns an error if the date parts are not numeric or a day is given
/// without a month.
pub fn execute(
    year: &str,
    month: Option<&str>,
    day: Option<&str>,
    home: Option<&Path>,
    json: bool,
) -> Result<()> {
    let path = match (month, day) {
        (None, None) => year.to_string(),
        (Some(m), None) => format!("{year}/{m}"),
        (Some(m), Some(d)) => format!("{year}/{m}/{d}"),
        (None, Some(_)) => {
            return Err(Error::InvalidArgument("A day needs a month".to_string()));
        }
    };
    let scope = parse_scope(&path)?;

    let ws = Workspace::open(home)?;
    let summary = ws.store.state().data.summary(&scope);

    if json {
        return print_json(&SummaryOutput {
            scope: scope.to_string(),
            summary,
        });
    }

    println!("{}", format!("Summary for {scope}").cyan().bold());
    println!("  Income:  {}", summary.income.to_string().green());
    println!("  Expense: {}", summary.expense.to_string().red());
    println!("  Balance: {}", summary.balance.to_string().bold());
    Ok(())
}
