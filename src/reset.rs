// src/reset.rs

use chrono::{Local, NaiveDate, Utc};

use crate::{
    error::ClientError,
    models::progress::ResetAudit,
    storage::{LocalStore, keys},
};

/// Clears the per-category caches once per calendar day.
///
/// Slots are addressed as category ids `1..=slots`. The routine is purely
/// local cache hygiene, uncoordinated with any server-side reset; once it
/// has run it is a no-op for the rest of the day.
pub fn run_daily_reset(
    store: &LocalStore,
    slots: usize,
    today: NaiveDate,
) -> Result<Option<ResetAudit>, ClientError> {
    let today = today.format("%Y-%m-%d").to_string();

    let last_reset: Option<String> = store.get_json(keys::LAST_RESET)?;
    if last_reset.as_deref() == Some(today.as_str()) {
        return Ok(None);
    }

    let mut cleared = Vec::with_capacity(slots);
    for slot in 1..=slots {
        let category_id = slot.to_string();
        store.remove(&keys::completed(&category_id))?;
        store.remove(&keys::category_points(&category_id))?;
        store.remove(&keys::reward_claimed(&category_id))?;
        cleared.push(category_id);
    }

    store.put_json(keys::LAST_RESET, &today)?;

    let audit = ResetAudit {
        reset_at: Utc::now(),
        cleared_categories: cleared,
    };
    store.put_json(keys::LAST_RESET_AUDIT, &audit)?;

    tracing::info!("daily cache reset cleared {} category slots", slots);
    Ok(Some(audit))
}

/// Bootstrap entry point: runs the reset against the local calendar date.
pub fn run_daily_reset_now(
    store: &LocalStore,
    slots: usize,
) -> Result<Option<ResetAudit>, ClientError> {
    run_daily_reset(store, slots, Local::now().date_naive())
}
