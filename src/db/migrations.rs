//! Database schema migration management.
//!
//! Keeps the local store's schema versioned: every applied migration is
//! recorded in a tracking table and pending migrations run inside their own
//! transaction during database initialization.

use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

/// Tracking table recording every applied migration.
const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// A single schema change with its version and transformation logic.
#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// Registry of all migrations, applied in version order.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: task records
        self.add_migration(1, "create_tasks_table", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id TEXT NOT NULL PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    notes TEXT,
                    ticked INTEGER NOT NULL DEFAULT 0,
                    due_date TIMESTAMP NOT NULL,
                    completion_date TIMESTAMP,
                    creation_date TIMESTAMP NOT NULL,
                    update_date TIMESTAMP
                )",
                [],
            )?;
            // Index tasks by due date for day-bucketed queries
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date)", [])?;
            Ok(())
        });

        // Version 2: reminder records, cascading with their task
        self.add_migration(2, "create_reminders_table", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS reminders (
                    id TEXT NOT NULL PRIMARY KEY,
                    task_id TEXT NOT NULL,
                    time TIMESTAMP NOT NULL,
                    creation_date TIMESTAMP NOT NULL,
                    update_date TIMESTAMP,
                    FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_reminders_task_id ON reminders(task_id)", [])?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Applies every migration newer than the current schema version, each in
    /// its own transaction.
    pub fn apply_pending(&self, conn: &mut Connection) -> Result<()> {
        let current = current_version(conn)?;

        for migration in self.migrations.iter().filter(|migration| migration.version > current) {
            tracing::debug!(version = migration.version, name = migration.name, "applying migration");

            let tx = conn.transaction()?;
            (migration.up)(&tx)?;
            tx.execute(
                "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                params![migration.version, migration.name],
            )?;
            tx.commit()?;
        }

        Ok(())
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Ensures the tracking table exists and applies pending migrations.
pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute(MIGRATIONS_TABLE, [])?;
    MigrationManager::new().apply_pending(conn)
}

/// The highest applied migration version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<u32> {
    let version = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM migrations", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
