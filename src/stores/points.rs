// src/stores/points.rs

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicI64, Ordering},
};

use crate::{api::RemoteApi, session::SessionIdentity};

/// Single source of truth for the learner's point balance during a session.
///
/// Local state is authoritative for the current session; remote writes are
/// best-effort. A failed read resets the balance to 0, a failed write keeps
/// the optimistic local value. Writes are dispatched in call order with no
/// queueing, deduplication or fencing, so when two writes overlap the last
/// one to complete wins in the remote store.
pub struct PointsStore {
    api: Arc<dyn RemoteApi>,
    identity: SessionIdentity,
    balance: AtomicI64,
    loading: AtomicBool,
}

impl PointsStore {
    pub fn new(api: Arc<dyn RemoteApi>, identity: SessionIdentity) -> Self {
        Self {
            api,
            identity,
            balance: AtomicI64::new(0),
            loading: AtomicBool::new(true),
        }
    }

    /// Fetches the stored balance for the current identity.
    ///
    /// * No identity: the normal logged-out state. Balance stays 0 and no
    ///   request is issued.
    /// * Fetch failure: logged, balance reset to 0. Never an error.
    pub async fn initialize(&self) {
        let Some(user_id) = self.identity.user_id.as_deref() else {
            self.loading.store(false, Ordering::SeqCst);
            return;
        };

        match self.api.fetch_user(user_id).await {
            Ok(user) => {
                self.balance.store(user.points(), Ordering::SeqCst);
            }
            Err(e) => {
                tracing::warn!("failed to fetch point balance for {}: {}", user_id, e);
                self.balance.store(0, Ordering::SeqCst);
            }
        }

        self.loading.store(false, Ordering::SeqCst);
    }

    /// Re-runs the fetch path on demand, e.g. after navigating back to a
    /// dashboard.
    pub async fn refresh(&self) {
        self.initialize().await;
    }

    pub fn balance(&self) -> i64 {
        self.balance.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Adds to the balance optimistically and persists in the background.
    /// Returns the new local balance, effective immediately.
    pub fn add_points(&self, amount: i64) -> i64 {
        let new_balance = self.balance.fetch_add(amount, Ordering::SeqCst) + amount;
        self.push_remote(new_balance);
        new_balance
    }

    /// Sets the balance to an absolute value, same contract as `add_points`.
    pub fn set_points(&self, value: i64) -> i64 {
        self.balance.store(value, Ordering::SeqCst);
        self.push_remote(value);
        value
    }

    fn push_remote(&self, new_balance: i64) {
        let Some(user_id) = self.identity.user_id.clone() else {
            tracing::debug!("no identity, keeping point balance local only");
            return;
        };

        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(e) = api.update_points(&user_id, new_balance).await {
                // The optimistic local value is kept; the write was best-effort.
                tracing::warn!("failed to persist point balance for {}: {}", user_id, e);
            }
        });
    }
}
