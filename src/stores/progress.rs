// src/stores/progress.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::ClientError,
    models::progress::CompletionEntry,
    storage::{LocalStore, keys},
};

/// Local per-category progress cache: completion lists, the accumulated
/// point cache and the reward-claimed flag.
///
/// Purely local and best-effort. Remote-tracked progress never depends on
/// it, and the daily cache reset clears it wholesale. Read-modify-write
/// sequences are not atomic; each key has a single writer in practice.
pub struct ProgressCache {
    store: Arc<LocalStore>,
}

impl ProgressCache {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Completion list for a category, empty when nothing is cached.
    pub fn completed_tasks(&self, category_id: &str) -> Vec<CompletionEntry> {
        self.store
            .get_json(&keys::completed(category_id))
            .unwrap_or_else(|e| {
                tracing::warn!("failed to read completion cache: {}", e);
                None
            })
            .unwrap_or_default()
    }

    /// Records a task completion unless one with the same name exists.
    /// Returns whether a new entry was written.
    pub fn mark_task_complete(
        &self,
        category_id: &str,
        task_name: &str,
    ) -> Result<bool, ClientError> {
        let mut entries = self.completed_tasks(category_id);
        if entries.iter().any(|e| e.task_name == task_name) {
            return Ok(false);
        }

        entries.push(CompletionEntry {
            category_id: category_id.to_string(),
            task_name: task_name.to_string(),
            completed_at: Utc::now(),
        });
        self.store.put_json(&keys::completed(category_id), &entries)?;
        Ok(true)
    }

    /// Locally accumulated points for a category.
    pub fn category_points(&self, category_id: &str) -> i64 {
        self.store
            .get_json(&keys::category_points(category_id))
            .unwrap_or_else(|e| {
                tracing::warn!("failed to read category point cache: {}", e);
                None
            })
            .unwrap_or(0)
    }

    pub fn add_category_points(
        &self,
        category_id: &str,
        amount: i64,
    ) -> Result<i64, ClientError> {
        let total = self.category_points(category_id) + amount;
        self.store
            .put_json(&keys::category_points(category_id), &total)?;
        Ok(total)
    }

    pub fn reward_claimed(&self, category_id: &str) -> bool {
        self.store
            .get_json(&keys::reward_claimed(category_id))
            .unwrap_or_else(|e| {
                tracing::warn!("failed to read reward flag: {}", e);
                None
            })
            .unwrap_or(false)
    }

    /// Claims the category reward. The first claim wins; returns whether
    /// this call claimed it.
    pub fn claim_reward(&self, category_id: &str) -> Result<bool, ClientError> {
        if self.reward_claimed(category_id) {
            return Ok(false);
        }
        self.store
            .put_json(&keys::reward_claimed(category_id), &true)?;
        Ok(true)
    }
}
