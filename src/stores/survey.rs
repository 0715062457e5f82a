// src/stores/survey.rs

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use chrono::Utc;

use crate::{
    api::RemoteApi,
    error::ClientError,
    models::survey::{SubmitSurveyRequest, SurveyResponse},
    session::SessionIdentity,
};

/// Tracks survey submissions for the current learner.
///
/// The local list is append-only and preserves insertion order. An entry is
/// appended only after the remote write succeeds, so a failed submission
/// never mutates local state.
pub struct SurveyStore {
    api: Arc<dyn RemoteApi>,
    identity: SessionIdentity,
    responses: Mutex<Vec<SurveyResponse>>,
    loading: AtomicBool,
}

impl SurveyStore {
    pub fn new(api: Arc<dyn RemoteApi>, identity: SessionIdentity) -> Self {
        Self {
            api,
            identity,
            responses: Mutex::new(Vec::new()),
            loading: AtomicBool::new(true),
        }
    }

    /// Same contract as the points initializer: no identity means an idle
    /// empty list, a fetch failure means an empty list. Never an error.
    pub async fn initialize(&self) {
        let Some(user_id) = self.identity.user_id.as_deref() else {
            self.loading.store(false, Ordering::SeqCst);
            return;
        };

        match self.api.fetch_survey_responses(user_id).await {
            Ok(list) => *self.lock() = list,
            Err(e) => {
                tracing::warn!("failed to fetch survey responses for {}: {}", user_id, e);
                self.lock().clear();
            }
        }

        self.loading.store(false, Ordering::SeqCst);
    }

    pub async fn refresh(&self) {
        self.initialize().await;
    }

    /// Snapshot of the submissions recorded this session, in insertion order.
    pub fn responses(&self) -> Vec<SurveyResponse> {
        self.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Submits a survey and appends the server's canonical response.
    ///
    /// Requires a logged-in learner. Answers are forwarded as-is; the
    /// server owns validation.
    pub async fn add_response(
        &self,
        category_id: &str,
        answers: Vec<i64>,
    ) -> Result<SurveyResponse, ClientError> {
        let Some(user_id) = self.identity.user_id.clone() else {
            return Err(ClientError::NotAuthenticated);
        };

        let request = SubmitSurveyRequest {
            user_id,
            category_id: category_id.to_string(),
            answers,
            timestamp: Utc::now(),
        };

        let response = self.api.submit_survey_response(&request).await?;
        self.lock().push(response.clone());
        Ok(response)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SurveyResponse>> {
        // A poisoned lock still holds a usable list.
        self.responses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRecord;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct SurveyApi {
        existing: Vec<SurveyResponse>,
        reject_with: Option<String>,
        fail_fetch: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteApi for SurveyApi {
        async fn fetch_user(&self, _user_id: &str) -> Result<UserRecord, ClientError> {
            unimplemented!("not used by survey tests")
        }

        async fn update_points(&self, _user_id: &str, _xps: i64) -> Result<(), ClientError> {
            unimplemented!("not used by survey tests")
        }

        async fn fetch_survey_responses(
            &self,
            _user_id: &str,
        ) -> Result<Vec<SurveyResponse>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch {
                return Err(ClientError::Network("connection refused".to_string()));
            }
            Ok(self.existing.clone())
        }

        async fn submit_survey_response(
            &self,
            request: &SubmitSurveyRequest,
        ) -> Result<SurveyResponse, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.reject_with {
                return Err(ClientError::Remote {
                    status: 422,
                    message: message.clone(),
                });
            }
            // Canonical form carries a server-issued timestamp.
            Ok(SurveyResponse {
                category_id: request.category_id.clone(),
                answers: request.answers.clone(),
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            })
        }
    }

    fn identity(user_id: &str) -> SessionIdentity {
        SessionIdentity {
            user_id: Some(user_id.to_string()),
            role: None,
        }
    }

    fn entry(category_id: &str, answers: &[i64], day: u32) -> SurveyResponse {
        SurveyResponse {
            category_id: category_id.to_string(),
            answers: answers.to_vec(),
            timestamp: Utc.with_ymd_and_hms(2023, 12, day, 8, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn success_appends_canonical_entry() {
        let api = Arc::new(SurveyApi {
            existing: vec![entry("cat0", &[1, 2], 1)],
            ..Default::default()
        });
        let store = SurveyStore::new(api, identity("u1"));
        store.initialize().await;

        let response = store.add_response("cat1", vec![4, 5, 3]).await.unwrap();

        assert_eq!(response.category_id, "cat1");
        assert_eq!(response.answers, vec![4, 5, 3]);
        let list = store.responses();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], entry("cat0", &[1, 2], 1));
        assert_eq!(list[1], response);
    }

    #[tokio::test]
    async fn failure_leaves_list_unchanged() {
        let api = Arc::new(SurveyApi {
            existing: vec![entry("cat0", &[1, 2], 1)],
            reject_with: Some("answers out of range".to_string()),
            ..Default::default()
        });
        let store = SurveyStore::new(api, identity("u1"));
        store.initialize().await;

        let err = store.add_response("cat1", vec![9]).await.unwrap_err();

        assert_eq!(err.message(), "answers out of range");
        assert_eq!(store.responses(), vec![entry("cat0", &[1, 2], 1)]);
    }

    #[tokio::test]
    async fn logged_out_submission_is_rejected() {
        let api = Arc::new(SurveyApi::default());
        let store = SurveyStore::new(api.clone(), SessionIdentity::default());
        store.initialize().await;

        let err = store.add_response("cat1", vec![4]).await.unwrap_err();

        assert!(matches!(err, ClientError::NotAuthenticated));
        assert!(!err.message().is_empty());
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_failure_yields_empty_list() {
        let api = Arc::new(SurveyApi {
            existing: vec![entry("cat0", &[1], 1)],
            fail_fetch: true,
            ..Default::default()
        });
        let store = SurveyStore::new(api, identity("u1"));

        store.initialize().await;

        assert!(store.responses().is_empty());
        assert!(!store.is_loading());
    }
}
