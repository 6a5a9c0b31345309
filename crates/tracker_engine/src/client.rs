use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracker_core::{JobHandle, JobKind, JobRequest, JobSnapshot, DEFAULT_REQUEST_TIMEOUT};
use tracker_logging::tracker_debug;

use crate::{FailureKind, PollError, RefreshError, SubmissionError};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Backend root, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub bearer_token: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            bearer_token: None,
        }
    }
}

/// Contract over the backend job runner.
#[async_trait::async_trait]
pub trait JobClient: Send + Sync {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, SubmissionError>;

    /// Must be idempotent; the poller calls it repeatedly.
    async fn get_status(&self, job_id: &str) -> Result<JobSnapshot, PollError>;

    /// Reloads the lists a finished job of `kind` touched.
    async fn refresh_dataset(&self, kind: JobKind) -> Result<(), RefreshError>;
}

#[derive(Debug, Serialize)]
struct BulkImportBody<'a> {
    urls: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: String,
    #[serde(default)]
    total_items: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

struct CallError {
    kind: FailureKind,
    message: String,
}

impl CallError {
    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<CallError> for SubmissionError {
    fn from(err: CallError) -> Self {
        SubmissionError::new(err.kind, err.message)
    }
}

impl From<CallError> for PollError {
    fn from(err: CallError) -> Self {
        PollError::new(err.kind, err.message)
    }
}

impl From<CallError> for RefreshError {
    fn from(err: CallError) -> Self {
        RefreshError::new(err.kind, err.message)
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    settings: ClientSettings,
}

impl ReqwestJobClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, CallError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| CallError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.settings.bearer_token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Vec<u8>, CallError> {
        let response = self
            .authorize(builder)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|err| err.detail)
                .unwrap_or_else(|_| status.to_string());
            return Err(CallError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }
        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, CallError> {
        let body = self.send(builder).await?;
        serde_json::from_slice(&body)
            .map_err(|err| CallError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl JobClient for ReqwestJobClient {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, SubmissionError> {
        let client = self.build_client()?;
        let builder = match request {
            JobRequest::BulkImport { urls } => {
                if urls.is_empty() {
                    return Err(SubmissionError::new(
                        FailureKind::InvalidPayload,
                        "no URLs provided",
                    ));
                }
                let joined = urls.join("\n");
                let body = serde_json::to_vec(&BulkImportBody { urls: &joined })
                    .map_err(|err| SubmissionError::new(FailureKind::InvalidPayload, err.to_string()))?;
                client
                    .post(self.endpoint("games/bulk"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)
            }
            JobRequest::ReprocessAll => client.post(self.endpoint("games/reprocess-all")),
        };

        let response: SubmitResponse = self.send_json(builder).await?;
        tracker_debug!(
            "submit kind={} task_id={} total_items={}",
            request.kind(),
            response.task_id,
            response.total_items
        );
        Ok(JobHandle {
            id: response.task_id,
            total_items_hint: response.total_items,
        })
    }

    async fn get_status(&self, job_id: &str) -> Result<JobSnapshot, PollError> {
        let client = self.build_client()?;
        let builder = client.get(self.endpoint(&format!("games/tasks/{job_id}")));
        Ok(self.send_json(builder).await?)
    }

    async fn refresh_dataset(&self, kind: JobKind) -> Result<(), RefreshError> {
        let client = self.build_client()?;
        // Both kinds change the games list and the summary derived from it.
        for path in ["games/", "stats/summary"] {
            self.send(client.get(self.endpoint(path))).await?;
        }
        tracker_debug!("dataset refreshed after {}", kind);
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> CallError {
    if err.is_timeout() {
        return CallError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return CallError::new(FailureKind::Decode, err.to_string());
    }
    CallError::new(FailureKind::Network, err.to_string())
}
