// src/api.rs

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::{
    error::ClientError,
    models::{
        survey::{SubmitSurveyPayload, SubmitSurveyRequest, SurveyListPayload, SurveyResponse},
        user::UserRecord,
    },
};

/// Remote API surface the state containers depend on.
/// The production implementation is `HttpApi`; tests substitute mocks.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn fetch_user(&self, user_id: &str) -> Result<UserRecord, ClientError>;

    async fn update_points(&self, user_id: &str, xps: i64) -> Result<(), ClientError>;

    async fn fetch_survey_responses(
        &self,
        user_id: &str,
    ) -> Result<Vec<SurveyResponse>, ClientError>;

    async fn submit_survey_response(
        &self,
        request: &SubmitSurveyRequest,
    ) -> Result<SurveyResponse, ClientError>;
}

/// HTTP implementation backed by `reqwest`.
///
/// The cookie store is enabled so the session cookie set at login rides
/// along on every call; no bearer token is attached.
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // `Url::join` drops the last path segment unless the base ends in '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ClientError::Network(format!("invalid API base URL: {}", e)))?;

        let client = Client::builder().cookie_store(true).build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Network(format!("invalid endpoint '{}': {}", path, e)))
    }
}

/// Maps a non-success response to `ClientError::Remote`, extracting the
/// message from the error payload when one is present.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("error")
                .or_else(|| body.get("message"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

    Err(ClientError::Remote {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn fetch_user(&self, user_id: &str) -> Result<UserRecord, ClientError> {
        let url = self.endpoint(&format!("user/{}", user_id))?;
        let response = check(self.client.get(url).send().await?).await?;
        Ok(response.json::<UserRecord>().await?)
    }

    async fn update_points(&self, user_id: &str, xps: i64) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("user/{}/points", user_id))?;
        let response = self
            .client
            .patch(url)
            .json(&serde_json::json!({ "xps": xps }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn fetch_survey_responses(
        &self,
        user_id: &str,
    ) -> Result<Vec<SurveyResponse>, ClientError> {
        let url = self.endpoint(&format!("survey-responses/{}", user_id))?;
        let response = check(self.client.get(url).send().await?).await?;
        Ok(response.json::<SurveyListPayload>().await?.responses)
    }

    async fn submit_survey_response(
        &self,
        request: &SubmitSurveyRequest,
    ) -> Result<SurveyResponse, ClientError> {
        let url = self.endpoint("survey-responses")?;
        let response = check(self.client.post(url).json(request).send().await?).await?;
        Ok(response.json::<SubmitSurveyPayload>().await?.response)
    }
}
