//! Rendering a [`RunSummary`] as a table or JSON.

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crosstest_core::{format_duration, RunSummary, TaskOutcome, TaskResult};

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "project")]
    project: String,
    #[tabled(rename = "task")]
    task: String,
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = "duration")]
    duration: String,
    #[tabled(rename = "detail")]
    detail: String,
}

impl From<&TaskResult> for ResultRow {
    fn from(r: &TaskResult) -> Self {
        let detail = match (&r.failed_step, &r.error) {
            (Some(step), Some(err)) => format!("at {step}: {err}"),
            (None, Some(err)) => err.clone(),
            _ => String::new(),
        };
        Self {
            project: r.project.to_string(),
            task: r.name.clone(),
            outcome: outcome_label(r.outcome),
            duration: format_duration(r.duration),
            detail,
        }
    }
}

pub fn print_json(summary: &RunSummary) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(summary).context("failed to serialize run summary")?
    );
    Ok(())
}

pub fn print_table(summary: &RunSummary) {
    if summary.results.is_empty() {
        println!("No projects matched.");
    } else {
        let rows: Vec<ResultRow> = summary.results.iter().map(ResultRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    let verdict = if summary.success {
        "PASSED".green().bold()
    } else {
        "FAILED".red().bold()
    };
    println!(
        "{verdict} {} succeeded, {} skipped, {} failed {}",
        summary.count(TaskOutcome::Succeeded),
        summary.count(TaskOutcome::Skipped),
        summary.count(TaskOutcome::Failed),
        format_duration(summary.duration),
    );
}

fn outcome_label(outcome: TaskOutcome) -> String {
    let label = outcome.to_string().to_uppercase();
    match outcome {
        TaskOutcome::Succeeded => label.green().bold().to_string(),
        TaskOutcome::Skipped => label.yellow().bold().to_string(),
        TaskOutcome::Failed => label.red().bold().to_string(),
    }
}
