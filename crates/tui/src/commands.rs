use std::fmt;
use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use futures::future::join_all;

use crate::cli::{AddArgs, CliCommand, DeleteArgs, ListArgs};
use crate::config::AppConfig;
use crate::controller::TodoController;
use crate::core::commands as core_commands;
use crate::model::{filter_todos, items_left, DeleteResult};
use crate::remote::TodoStore;

pub(crate) const EMPTY_TITLE: &str = "Title should not be empty";

pub fn execute<W: Write>(config: &AppConfig, command: CliCommand, writer: W) -> Result<()> {
    let controller = core_commands::connect(config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(run(&controller, command, writer))
}

/// Drive one non-interactive command against `controller`.
pub async fn run<S: TodoStore, W: Write>(
    controller: &TodoController<S>,
    command: CliCommand,
    mut writer: W,
) -> Result<()> {
    match command {
        CliCommand::List(args) => handle_list(controller, &args, &mut writer).await,
        CliCommand::Add(args) => handle_add(controller, &args, &mut writer).await,
        CliCommand::Delete(args) => handle_delete(controller, &args, &mut writer).await,
        CliCommand::ClearCompleted => handle_clear_completed(controller, &mut writer).await,
        CliCommand::Tui => Err(anyhow!("launch interactive surfaces directly")),
    }
}

async fn handle_list<S: TodoStore, W: Write>(
    controller: &TodoController<S>,
    args: &ListArgs,
    mut writer: W,
) -> Result<()> {
    controller.load().await?;
    let state = controller.snapshot();
    let todos = filter_todos(state.todos(), args.filter);

    if args.json {
        serde_json::to_writer_pretty(&mut writer, &todos)?;
        writeln!(writer)?;
        return Ok(());
    }

    if todos.is_empty() {
        writeln!(writer, "No {} todos", args.filter)?;
    }
    for todo in &todos {
        let mark = if todo.completed { 'x' } else { ' ' };
        writeln!(writer, "[{mark}] {:>6}  {}", todo.id, todo.title)?;
    }
    writeln!(writer, "{}", items_left(state.active_count()))?;
    Ok(())
}

async fn handle_add<S: TodoStore, W: Write>(
    controller: &TodoController<S>,
    args: &AddArgs,
    mut writer: W,
) -> Result<()> {
    let title = args.title();
    if title.is_empty() {
        bail!(EMPTY_TITLE);
    }
    let todo = controller.create(title).await?;
    writeln!(writer, "Created #{} {}", todo.id, todo.title)?;
    Ok(())
}

async fn handle_delete<S: TodoStore, W: Write>(
    controller: &TodoController<S>,
    args: &DeleteArgs,
    mut writer: W,
) -> Result<()> {
    let outcomes = join_all(args.ids.iter().map(|id| controller.delete(*id))).await;
    let results: Vec<DeleteResult> = args
        .ids
        .iter()
        .zip(outcomes)
        .map(|(id, outcome)| DeleteResult {
            id: *id,
            deleted: outcome.is_ok(),
        })
        .collect();
    DeleteSummary::from_results(&results).write_to(&mut writer)
}

async fn handle_clear_completed<S: TodoStore, W: Write>(
    controller: &TodoController<S>,
    mut writer: W,
) -> Result<()> {
    controller.load().await?;
    let results = controller.clear_completed().await;
    DeleteSummary::from_results(&results).write_to(&mut writer)
}

struct DeleteSummary {
    deleted: usize,
    failed: Vec<u64>,
}

impl DeleteSummary {
    fn from_results(results: &[DeleteResult]) -> Self {
        let mut deleted = 0usize;
        let mut failed = Vec::new();
        for result in results {
            if result.deleted {
                deleted += 1;
            } else {
                failed.push(result.id);
            }
        }
        Self { deleted, failed }
    }

    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", SummaryLine::deleted(self.deleted))?;
        if !self.failed.is_empty() {
            let ids: Vec<String> = self.failed.iter().map(|id| id.to_string()).collect();
            writeln!(writer, "Unable to delete: {}", ids.join(", "))?;
        }
        Ok(())
    }
}

enum SummaryLine {
    Deleted(usize),
    NoneDeleted,
}

impl SummaryLine {
    fn deleted(count: usize) -> Self {
        if count > 0 {
            SummaryLine::Deleted(count)
        } else {
            SummaryLine::NoneDeleted
        }
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryLine::Deleted(count) => {
                write!(
                    f,
                    "Deleted {} todo{}",
                    count,
                    if *count == 1 { "" } else { "s" }
                )
            }
            SummaryLine::NoneDeleted => write!(f, "No todos deleted"),
        }
    }
}
