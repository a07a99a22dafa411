//! Export of a participant's event logs, one JSON file per system/task.
//!
//! Files land in `<output_dir>/<user_id>/<user_id>_system{S}_task{N}.json`
//! and carry the user id, the task key, a log count and the logs in
//! timestamp order.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use artographer_db::Database;
use artographer_db::models::LogRow;
use artographer_types::tasks;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("Database file '{}' not found", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// Opens the database the export reads from. The file must already exist
/// and is never modified.
pub fn open_database(path: &Path) -> Result<Database, OpenError> {
    if !path.exists() {
        return Err(OpenError::NotFound(path.to_path_buf()));
    }
    Ok(Database::open_read_only(path)?)
}

pub struct ExportOptions {
    pub user_id: String,
    pub output_dir: PathBuf,
    pub pretty: bool,
}

pub struct WrittenFile {
    pub path: PathBuf,
    pub log_count: usize,
}

pub struct Export {
    pub groups: BTreeMap<String, Vec<ExportedLog>>,
    pub files: Vec<WrittenFile>,
}

/// One log as written to disk. `created_at` is the stored column text.
#[derive(Debug, Serialize)]
pub struct ExportedLog {
    pub id: i64,
    pub timestamp: String,
    pub message: String,
    pub event_data: Value,
    pub created_at: String,
}

impl From<LogRow> for ExportedLog {
    fn from(row: LogRow) -> Self {
        ExportedLog {
            event_data: row.event_data_value(),
            id: row.id,
            timestamp: row.timestamp,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

#[derive(Serialize)]
struct TaskFile<'a> {
    user_id: &'a str,
    task: &'a str,
    log_count: usize,
    logs: &'a [ExportedLog],
}

/// Loads the user's logs and writes the per-task files. Returns `None`
/// without touching the filesystem when the user has no logs.
pub fn export_user_logs(db: &Database, options: &ExportOptions) -> Result<Option<Export>> {
    let logs: Vec<ExportedLog> = db
        .get_user_logs(&options.user_id)?
        .into_iter()
        .map(ExportedLog::from)
        .collect();
    if logs.is_empty() {
        return Ok(None);
    }

    let groups = tasks::group_by_task(logs, |log| &log.event_data);
    let files = write_task_files(&options.user_id, &groups, options)?;
    Ok(Some(Export { groups, files }))
}

fn write_task_files(
    user_id: &str,
    groups: &BTreeMap<String, Vec<ExportedLog>>,
    options: &ExportOptions,
) -> Result<Vec<WrittenFile>> {
    let user_dir = options.output_dir.join(user_id);
    fs::create_dir_all(&user_dir)
        .with_context(|| format!("creating output directory {}", user_dir.display()))?;

    let mut written = Vec::with_capacity(groups.len());
    for (task, logs) in groups {
        let file = TaskFile {
            user_id,
            task,
            log_count: logs.len(),
            logs,
        };

        // Round-trip through Value so object keys come out sorted
        let value = serde_json::to_value(&file)?;
        let body = if options.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };

        let path = user_dir.join(format!("{}_{}.json", user_id, task));
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        written.push(WrittenFile {
            path,
            log_count: logs.len(),
        });
    }

    Ok(written)
}

/// Human-readable totals: logs per task key and event types by frequency.
pub fn render_summary(user_id: &str, groups: &BTreeMap<String, Vec<ExportedLog>>) -> String {
    let rule = "=".repeat(50);
    let total: usize = groups.values().map(Vec::len).sum();

    let mut out = String::new();
    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "Summary for user {user_id}");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Total logs: {total}");
    let _ = writeln!(out, "Unique task/system combinations: {}", groups.len());

    let _ = writeln!(out, "\nLogs per task:");
    for (task, logs) in groups {
        let _ = writeln!(out, "  {task}: {} logs", logs.len());
    }

    let _ = writeln!(out, "\nEvent types:");
    for (message, count) in tasks::message_counts(groups.values().flatten().map(|log| log.message.as_str())) {
        let _ = writeln!(out, "  {message}: {count}");
    }
    out
}
