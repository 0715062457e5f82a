// src/models/progress.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One locally cached task completion.
/// At most one entry per task name within a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEntry {
    pub category_id: String,
    pub task_name: String,
    pub completed_at: DateTime<Utc>,
}

/// Audit record written by the daily cache reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetAudit {
    pub reset_at: DateTime<Utc>,
    pub cleared_categories: Vec<String>,
}
