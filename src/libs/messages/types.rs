#[derive(Debug, Clone)]
pub enum Message {
    // === TASK MESSAGES ===
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TaskNotFound,
    TasksHeader(String),                // date
    TasksNotFoundForDate(String),       // date
    ConfirmDeleteTask(String),          // title
    TaskTicked(String),                 // title
    TaskUnticked(String),               // title
    FetchPartialFailure(String),        // error

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigModuleNotify,
    PromptSelectModules,
    PromptNotifyEnabled,

    // === SESSION MESSAGES ===
    WrongPassword(i32), // attempts

    // === GENERIC MESSAGES ===
    OperationCancelled,
}
