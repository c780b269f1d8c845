//! GraphQL 文档与请求/响应信封

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ClickTagError, Result};

pub const GET_PROFILE: &str = r#"
query GetProfile($enterpriseId: ID!, $mode: MODE!, $channel: CHANNEL!, $profileId: ID!) {
  getProfile(enterpriseId: $enterpriseId, mode: $mode, channel: $channel, profileId: $profileId) {
    enterpriseId
    mode
    profileId
    customer {
      enterpriseId
      mode
      customerId
      name
    }
    customerId
    channel
    createdAt
    updatedAt
  }
}
"#;

pub const SEARCH_SESSIONS_WITH_CONVERSATION: &str = r#"
query SearchSessionsWithConversation(
  $filter: SearchableSessionFilterInput
  $sort: [SearchableSessionSortInput]
  $limit: Int
  $nextToken: String
  $conversationLimit: Int
) {
  searchSessions(filter: $filter, sort: $sort, limit: $limit, nextToken: $nextToken) {
    items {
      enterpriseId
      mode
      sessionId
      customerId
      workspaceId
      flowId
      integrationId
      channel
      updatedAt
      createdAt
      currentNodeId
      nextNodeId
      conversationByDate(sortDirection: ASC, limit: $conversationLimit) {
        items {
          conversationId
          createdBy
          createdAt
          content
        }
      }
    }
    nextToken
    total
  }
}
"#;

pub const CREATE_EVENT_LABEL: &str = r#"
mutation CreateEventLabel($input: CreateEventLabelInput!, $condition: ModelEventLabelConditionInput) {
  createEventLabel(input: $input, condition: $condition) {
    enterpriseId
    labelId
    mode
    sessionId
    interactionId
    conversationId
    nodeId
    type
    label
    value
    createdAt
  }
}
"#;

/// POST body：`{query, variables}`
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
}

/// 响应信封：`{data, errors}`
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

impl GraphQlResponse {
    /// 取出 `data.<field>`
    ///
    /// - `errors` 非空 → `BackendResponse`
    /// - 字段缺失或为 null → `Ok(None)`
    pub fn into_field<T: DeserializeOwned>(self, field: &str) -> Result<Option<T>> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let joined = errors
                .iter()
                .map(|e| match &e.error_type {
                    Some(kind) => format!("{}: {}", kind, e.message),
                    None => e.message.clone(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ClickTagError::backend_response(format!(
                "{} failed: {}",
                field, joined
            )));
        }

        match self.data.and_then(|mut data| data.get_mut(field).map(Value::take)) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }
}
