use super::task::Task;
use anyhow::Result;
use prettytable::{row, Table};

pub struct View {}

impl View {
    /// Renders a task list as a terminal table.
    pub fn tasks(tasks: &[Task]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "TITLE", "DUE", "DONE", "SOURCE", "REMINDERS"]);
        for task in tasks {
            table.add_row(row![
                short_id(task),
                task.title,
                task.due_date.format("%Y-%m-%d %H:%M"),
                if task.ticked { "x" } else { "" },
                task.source,
                task.reminders.len()
            ]);
        }
        table.printstd();

        Ok(())
    }
}

/// First id block, enough to disambiguate within a day bucket.
fn short_id(task: &Task) -> String {
    task.id.to_string().chars().take(8).collect()
}
