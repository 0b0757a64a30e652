//! Task management commands.
//!
//! Thin CLI plumbing around the sync client: create, list, tick and delete
//! tasks on either store. Cache relocation after an update is done here, on
//! the calling side, which is what the client contract expects.

use crate::libs::client::TasksClient;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::query::start_of_day;
use crate::libs::reminder::ReminderArguments;
use crate::libs::source::Source;
use crate::libs::task::TaskArguments;
use crate::libs::view::View;
use crate::{msg_bail_anyhow, msg_error, msg_info, msg_success};
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};
use uuid::Uuid;

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: TaskCommands,
}

#[derive(Debug, Subcommand)]
enum TaskCommands {
    #[command(about = "Create a task")]
    Add(AddArgs),
    #[command(about = "List tasks for a day")]
    List(ListArgs),
    #[command(about = "Toggle a task's ticked state")]
    Tick(TickArgs),
    #[command(about = "Delete a task")]
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(required = true)]
    title: String,
    #[arg(short, long)]
    description: Option<String>,
    #[arg(short, long)]
    notes: Option<String>,
    /// Due date: "YYYY-MM-DD" or "YYYY-MM-DD HH:MM" (defaults to now)
    #[arg(long)]
    due: Option<String>,
    /// Reminder times: "HH:MM" (on the due day) or "YYYY-MM-DD HH:MM"
    #[arg(short, long)]
    remind: Vec<String>,
    #[arg(short, long, value_enum, default_value_t = Source::Local)]
    source: Source,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Day to list: "YYYY-MM-DD" (defaults to today)
    #[arg(long)]
    date: Option<String>,
    /// Query one store only (defaults to every enabled store)
    #[arg(short, long, value_enum)]
    source: Option<Source>,
    /// Leave overdue tasks where they are instead of rolling them over
    #[arg(long)]
    no_rollover: bool,
    /// Refetch even if this day was already fetched
    #[arg(long)]
    refresh: bool,
}

#[derive(Debug, Args)]
struct TickArgs {
    #[arg(required = true)]
    id: String,
    #[arg(short, long, value_enum, default_value_t = Source::Local)]
    source: Source,
    /// Untick instead of tick
    #[arg(long)]
    undo: bool,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    #[arg(required = true)]
    id: String,
    #[arg(short, long, value_enum, default_value_t = Source::Local)]
    source: Source,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub async fn cmd(task_args: TaskArgs) -> Result<()> {
    let config = Config::read()?;
    let client = TasksClient::new(config.clone())?;

    match task_args.command {
        TaskCommands::Add(args) => add(&client, args).await,
        TaskCommands::List(args) => list(&client, &config, args).await,
        TaskCommands::Tick(args) => tick(&client, args).await,
        TaskCommands::Delete(args) => delete(&client, args).await,
    }
}

async fn add(client: &TasksClient, args: AddArgs) -> Result<()> {
    let due_date = parse_due(args.due.as_deref())?;

    let mut arguments = TaskArguments::new(&args.title, due_date);
    arguments.description = args.description;
    arguments.notes = args.notes;
    for raw in &args.remind {
        arguments.reminders.push(ReminderArguments::new(parse_reminder(raw, due_date.date_naive())?));
    }

    client.create(args.source, &arguments).await?;
    msg_success!(Message::TaskCreated);
    Ok(())
}

async fn list(client: &TasksClient, config: &Config, args: ListArgs) -> Result<()> {
    let day = match args.date.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => Local::now().date_naive(),
    };
    let sources = match args.source {
        Some(source) => vec![source],
        None => enabled_sources(config),
    };

    let fetched = client.fetch(&sources, Some(day), !args.no_rollover, args.refresh).await;
    if let Some(err) = fetched.error {
        msg_error!(Message::FetchPartialFailure(err.to_string()));
    }

    if fetched.tasks.is_empty() {
        msg_info!(Message::TasksNotFoundForDate(day.to_string()));
        return Ok(());
    }

    msg_info!(Message::TasksHeader(day.to_string()));
    View::tasks(&fetched.tasks)?;
    Ok(())
}

async fn tick(client: &TasksClient, args: TickArgs) -> Result<()> {
    let id = parse_id(&args.id)?;
    let new_state = !args.undo;

    let fetched = client.fetch(&[args.source], None, false, false).await;
    let task = match fetched.tasks.into_iter().find(|task| task.id == id) {
        Some(task) => task,
        None => {
            msg_error!(Message::TaskNotFound);
            return Ok(());
        }
    };
    let old_day = task.day();

    let updated = client.update(args.source, id, &task.toggle_tick_arguments(new_state)).await?;
    client.cache().update_in_place(updated.clone(), old_day).await;

    match new_state {
        true => msg_success!(Message::TaskTicked(updated.title)),
        false => msg_success!(Message::TaskUnticked(updated.title)),
    }
    Ok(())
}

async fn delete(client: &TasksClient, args: DeleteArgs) -> Result<()> {
    let id = parse_id(&args.id)?;

    let fetched = client.fetch(&[args.source], None, false, false).await;
    let task = match fetched.tasks.into_iter().find(|task| task.id == id) {
        Some(task) => task,
        None => {
            msg_error!(Message::TaskNotFound);
            return Ok(());
        }
    };

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteTask(task.title.clone()).to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::OperationCancelled);
            return Ok(());
        }
    }

    let deleted = client.delete(args.source, id).await?;
    client.cache().remove(&deleted, deleted.day()).await;

    msg_success!(Message::TaskDeleted);
    Ok(())
}

/// Every store the user has switched on.
fn enabled_sources(config: &Config) -> Vec<Source> {
    [Source::Local, Source::Remote].into_iter().filter(|source| source.is_enabled(config)).collect()
}

fn parse_id(raw: &str) -> Result<Uuid> {
    match Uuid::parse_str(raw) {
        Ok(id) => Ok(id),
        Err(_) => msg_bail_anyhow!(Message::TaskNotFound),
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?)
}

fn parse_due(raw: Option<&str>) -> Result<DateTime<Local>> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(Local::now()),
    };

    if let Ok(date_time) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        if let Some(due) = date_time.and_local_timezone(Local).earliest() {
            return Ok(due);
        }
    }
    Ok(start_of_day(parse_day(raw)?))
}

fn parse_reminder(raw: &str, due_day: NaiveDate) -> Result<DateTime<Local>> {
    if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M") {
        if let Some(at) = due_day.and_time(time).and_local_timezone(Local).earliest() {
            return Ok(at);
        }
    }
    parse_due(Some(raw))
}
