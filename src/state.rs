// src/state.rs

use std::sync::Arc;

use crate::api::RemoteApi;
use crate::config::Config;
use crate::session::SessionIdentity;
use crate::storage::LocalStore;
use crate::stores::{points::PointsStore, progress::ProgressCache, survey::SurveyStore};

/// Aggregated client state for one session.
///
/// Identity is read once at construction; logging in or out means building
/// a fresh `SessionState`, the way a remounted view tree re-reads it.
pub struct SessionState {
    pub config: Config,
    pub store: Arc<LocalStore>,
    pub identity: SessionIdentity,
    pub points: Arc<PointsStore>,
    pub surveys: Arc<SurveyStore>,
    pub progress: ProgressCache,
}

impl SessionState {
    pub fn new(config: Config, store: Arc<LocalStore>, api: Arc<dyn RemoteApi>) -> Self {
        let identity = SessionIdentity::load(&store);
        let points = Arc::new(PointsStore::new(Arc::clone(&api), identity.clone()));
        let surveys = Arc::new(SurveyStore::new(api, identity.clone()));
        let progress = ProgressCache::new(Arc::clone(&store));

        Self {
            config,
            store,
            identity,
            points,
            surveys,
            progress,
        }
    }

    /// Synchronizes both remote-backed containers.
    pub async fn initialize(&self) {
        tokio::join!(self.points.initialize(), self.surveys.initialize());
    }
}
