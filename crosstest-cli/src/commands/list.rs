//! `crosstest list`: the projects a pattern selects, in registration order.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crosstest_core::Project;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Regular expression matched against the whole project name.
    pub pattern: Option<String>,
}

#[derive(Serialize, Tabled)]
struct ProjectRow {
    #[tabled(rename = "project")]
    name: String,
    #[tabled(rename = "language")]
    language: String,
    #[tabled(rename = "basedir")]
    basedir: String,
    #[tabled(rename = "repository")]
    repo: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "cloned")]
    cloned: bool,
}

impl ListArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<bool> {
        let (_, set) = global.load()?;
        let projects = set
            .registry
            .filter(self.pattern.as_deref())
            .context("invalid project pattern")?;

        let rows: Vec<ProjectRow> = projects
            .iter()
            .map(|p| row(p, p.dir_in(&set.root).is_dir()))
            .collect();

        if global.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize project list")?
            );
            return Ok(true);
        }

        if rows.is_empty() {
            println!("No projects match.");
            return Ok(true);
        }
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(true)
    }
}

fn row(project: &Project, cloned: bool) -> ProjectRow {
    let (repo, branch) = match &project.git {
        Some(git) => (git.repo.clone(), git.branch.clone()),
        None => ("-".to_owned(), "-".to_owned()),
    };
    ProjectRow {
        name: project.name().to_string(),
        language: project.language.clone().unwrap_or_else(|| "-".to_owned()),
        basedir: project.basedir.display().to_string(),
        repo,
        branch,
        cloned,
    }
}
