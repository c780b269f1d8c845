//! AppSync GraphQL 客户端
//!
//! 使用 ureq 同步 Agent，在 `spawn_blocking` 中执行请求：
//! - Agent 启动时创建一次，可跨请求复用，不携带请求级状态
//! - 每次调用受 `timeout_global` 约束，backend 无响应不会无限阻塞重定向

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, trace};
use ureq::Agent;

use super::graphql::{
    CREATE_EVENT_LABEL, GET_PROFILE, GraphQlRequest, GraphQlResponse,
    SEARCH_SESSIONS_WITH_CONVERSATION,
};
use super::models::{CreatedEventLabel, EventLabel, Profile, SessionPage};
use super::{ProfileKey, SessionQuery, TaggingBackend};
use crate::config::BackendConfig;
use crate::errors::{ClickTagError, Result};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AppSyncClient {
    endpoint: String,
    api_key: String,
    agent: Agent,
}

impl std::fmt::Debug for AppSyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSyncClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl AppSyncClient {
    pub fn new(config: &BackendConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_millis(config.timeout_ms)))
            .build()
            .into();

        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 同步执行一次 GraphQL POST（在 spawn_blocking 中调用）
    fn post_sync(
        agent: &Agent,
        endpoint: &str,
        api_key: &str,
        query: &str,
        variables: Value,
    ) -> Result<GraphQlResponse> {
        let body = GraphQlRequest { query, variables };

        let resp = agent
            .post(endpoint)
            .header(API_KEY_HEADER, api_key)
            .send_json(&body)?;

        let envelope: GraphQlResponse = resp.into_body().read_json()?;
        Ok(envelope)
    }

    async fn execute<T>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: Value,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        let api_key = self.api_key.clone();

        trace!("GraphQL {} variables: {}", operation, variables);

        let envelope = tokio::task::spawn_blocking(move || {
            Self::post_sync(&agent, &endpoint, &api_key, query, variables)
        })
        .await
        .map_err(|e| {
            ClickTagError::task_join(format!("{} request task failed: {}", operation, e))
        })??;

        let value = envelope.into_field(operation)?;
        debug!("GraphQL {} completed", operation);
        Ok(value)
    }
}

#[async_trait]
impl TaggingBackend for AppSyncClient {
    async fn get_profile(&self, key: &ProfileKey) -> Result<Option<Profile>> {
        let variables = json!({
            "enterpriseId": key.enterprise_id,
            "mode": key.mode,
            "channel": key.channel,
            "profileId": key.profile_id,
        });
        self.execute("getProfile", GET_PROFILE, variables).await
    }

    async fn search_sessions(&self, query: &SessionQuery) -> Result<SessionPage> {
        let variables = json!({
            "filter": {
                "enterpriseId": { "eq": query.enterprise_id },
                "mode": { "eq": query.mode },
                "customerId": { "eq": query.customer_id },
            },
            "sort": [
                { "field": "updatedAt", "direction": "desc" }
            ],
            "conversationLimit": query.conversation_window,
        });
        let page: Option<SessionPage> = self
            .execute("searchSessions", SEARCH_SESSIONS_WITH_CONVERSATION, variables)
            .await?;
        Ok(page.unwrap_or_default())
    }

    async fn create_event_label(&self, label: &EventLabel) -> Result<CreatedEventLabel> {
        let variables = json!({ "input": label });
        self.execute("createEventLabel", CREATE_EVENT_LABEL, variables)
            .await?
            .ok_or_else(|| {
                ClickTagError::backend_response("createEventLabel returned no record")
            })
    }

    fn name(&self) -> &'static str {
        "AppSync"
    }
}
