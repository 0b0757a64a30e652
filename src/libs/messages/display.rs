//! Display implementation for taskhive application messages.
//!
//! Converts structured [`Message`] values into the human-readable text shown
//! in the terminal. Keeping every user-facing string in one place keeps the
//! wording consistent and leaves room for localization later.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // Task messages
            Message::TaskCreated => "Task created successfully".to_string(),
            Message::TaskUpdated => "Task updated successfully".to_string(),
            Message::TaskDeleted => "Task deleted successfully".to_string(),
            Message::TaskNotFound => "Task not found".to_string(),
            Message::TasksHeader(date) => format!("Tasks for {}", date),
            Message::TasksNotFoundForDate(date) => format!("No tasks found for {}", date),
            Message::ConfirmDeleteTask(title) => format!("Delete task '{}'?", title),
            Message::TaskTicked(title) => format!("Ticked off '{}'", title),
            Message::TaskUnticked(title) => format!("Unticked '{}'", title),
            Message::FetchPartialFailure(error) => format!("Some stores could not be fetched: {}", error),

            // Configuration messages
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigModuleNotify => "Notification settings".to_string(),
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::PromptNotifyEnabled => "Hand reminders to the notification scheduler?".to_string(),

            // Session messages
            Message::WrongPassword(attempts) => format!("You entered the wrong password {} times!", attempts),

            // Generic messages
            Message::OperationCancelled => "Operation cancelled".to_string(),
        };

        write!(f, "{}", text)
    }
}
