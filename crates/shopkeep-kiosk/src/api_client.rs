//! HTTP client for the Shopkeep API.
//!
//! Serves the kiosk as both its question source and its answer evaluator,
//! and fetches the visitor's profile at startup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use shopkeep_core::client::ClientClass;
use shopkeep_core::error::DomainError;
use shopkeep_questions::pool::QuestionSource;
use tracing::debug;

use crate::dialogue::{AnswerEvaluator, EvaluationReply};

/// Header carrying the visitor id.
pub const VISITOR_ID_HEADER: &str = "x-visitor-id";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// A profile as the API returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProfile {
    pub visitor_id: String,
    pub visit_count: u32,
    #[serde(default)]
    pub answer_count: u32,
    #[serde(default)]
    pub good_answer_count: u32,
    pub current_title: String,
    #[serde(default)]
    pub unlocked_titles: Vec<String>,
    pub browser: ClientClass,
    #[serde(default)]
    pub is_new: bool,
}

#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    questions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EvaluateRequest<'a> {
    question: &'a str,
    answer: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HintsRequest<'a> {
    phone_number: &'a str,
}

#[derive(Debug, Deserialize)]
struct HintsResponse {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Client bound to one API root and one visitor.
#[derive(Debug, Clone)]
pub struct ShopkeepApiClient {
    client: Client,
    base_url: String,
    visitor_id: Option<String>,
}

impl ShopkeepApiClient {
    /// Creates a client that identifies itself with `user_agent`.
    #[must_use]
    pub fn new(base_url: &str, visitor_id: Option<String>, user_agent: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            visitor_id,
        }
    }

    fn with_visitor(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.visitor_id {
            Some(id) => builder.header(VISITOR_ID_HEADER, id),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, DomainError> {
        let response = builder
            .send()
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(format!("shopkeep api: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorResponse>()
            .await
            .map_or_else(|_| status.to_string(), |body| body.message);
        Err(match status.as_u16() {
            400 => DomainError::InvalidInput(message),
            404 => DomainError::ProfileNotFound(message),
            _ => DomainError::UpstreamUnavailable(message),
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, DomainError> {
        response
            .json()
            .await
            .map_err(|e| DomainError::MalformedUpstreamOutput(e.to_string()))
    }

    /// Looks up (and counts a visit on) the configured visitor's profile.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` when no visitor id is configured,
    /// otherwise whatever the API reports.
    pub async fn fetch_profile(&self) -> Result<RemoteProfile, DomainError> {
        let visitor_id = self
            .visitor_id
            .as_deref()
            .ok_or_else(|| DomainError::InvalidInput("no visitor id configured".to_owned()))?;
        let response = Self::send(
            self.client
                .get(format!("{}/player/{visitor_id}", self.base_url)),
        )
        .await?;
        Self::decode(response).await
    }

    /// Asks the API to text hints to `phone_number`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UpstreamUnavailable` if the API is unreachable.
    pub async fn request_hints(&self, phone_number: &str) -> Result<bool, DomainError> {
        let builder = self
            .client
            .post(format!("{}/request-hints", self.base_url))
            .json(&HintsRequest { phone_number });
        let response = Self::send(self.with_visitor(builder)).await?;
        let body: HintsResponse = Self::decode(response).await?;
        Ok(body.success)
    }
}

#[async_trait]
impl QuestionSource for ShopkeepApiClient {
    async fn fetch_questions(&self, count: usize) -> Result<Vec<String>, DomainError> {
        let response = Self::send(
            self.client
                .get(format!("{}/generate-questions", self.base_url))
                .query(&[("count", count)]),
        )
        .await?;
        let body: QuestionsResponse = Self::decode(response).await?;
        debug!(count = body.questions.len(), "questions fetched");
        Ok(body.questions)
    }
}

#[async_trait]
impl AnswerEvaluator for ShopkeepApiClient {
    async fn evaluate(&self, question: &str, answer: &str) -> Result<EvaluationReply, DomainError> {
        let builder = self
            .client
            .post(format!("{}/evaluate", self.base_url))
            .json(&EvaluateRequest { question, answer });
        let response = Self::send(self.with_visitor(builder)).await?;
        Self::decode(response).await
    }
}
