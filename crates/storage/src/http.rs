use std::env;

use async_trait::async_trait;
use quiz_core::model::{AnswerRecord, Member, QuizItem, QuizVariant};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use crate::records::{AnswerRecordPayload, QuizItemRecord, into_items};
use crate::repository::{AnswerSink, ItemRequest, QuizItemSource, StorageError};

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl ApiConfig {
    /// Reads `QUIZ_API_URL` (required) and `QUIZ_API_TOKEN` (optional).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("QUIZ_API_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let token = env::var("QUIZ_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Some(Self { base_url, token })
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    #[must_use]
    pub fn items_url(&self, member: &Member, request: &ItemRequest) -> String {
        format!(
            "{}/members/{}/quizzes/{}/collections/{}/items",
            self.base(),
            member.id(),
            request.variant,
            request.collection
        )
    }

    #[must_use]
    pub fn results_url(&self, member: &Member, variant: QuizVariant) -> String {
        format!(
            "{}/members/{}/quizzes/{}/results",
            self.base(),
            member.id(),
            variant
        )
    }
}

/// REST client for the remote quiz API.
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    config: ApiConfig,
}

impl HttpQuizApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

fn check_status(status: StatusCode) -> Result<(), StorageError> {
    if status == StatusCode::NOT_FOUND {
        return Err(StorageError::NotFound);
    }
    if !status.is_success() {
        return Err(StorageError::HttpStatus(status));
    }
    Ok(())
}

#[async_trait]
impl QuizItemSource for HttpQuizApi {
    async fn fetch_items(
        &self,
        member: &Member,
        request: &ItemRequest,
    ) -> Result<Vec<QuizItem>, StorageError> {
        let url = self.config.items_url(member, request);
        debug!(%url, "fetching quiz items");
        let response = self.authorized(self.client.get(&url)).send().await?;
        check_status(response.status())?;
        let records: Vec<QuizItemRecord> = response.json().await?;
        into_items(records)
    }
}

#[async_trait]
impl AnswerSink for HttpQuizApi {
    async fn submit_result(
        &self,
        member: &Member,
        variant: QuizVariant,
        record: AnswerRecord,
    ) -> Result<(), StorageError> {
        let url = self.config.results_url(member, variant);
        let payload = AnswerRecordPayload::new(member.id(), variant, record);
        let response = self
            .authorized(self.client.post(&url))
            .json(&payload)
            .send()
            .await?;
        check_status(response.status())
    }
}
