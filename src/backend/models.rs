//! GraphQL backend 数据模型
//!
//! 只读投影（Profile / Session / Conversation）和写入模型（EventLabel）。
//! 字段名与 backend 的 camelCase 保持一致。

use serde::{Deserialize, Serialize};

/// 固定的标签类型
pub const LABEL_TYPE_DATA_POINT: &str = "DATA_POINT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub enterprise_id: Option<String>,
    pub mode: Option<String>,
    pub customer_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub enterprise_id: String,
    pub mode: String,
    pub profile_id: String,
    pub channel: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Profile {
    /// 用于查询 session 的 customer id
    ///
    /// 优先取关联 customer 的 id（profile 可能把身份重新映射到另一个 customer），
    /// 其次是 profile 自身的 customerId。
    pub fn resolved_customer_id(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|c| c.customer_id.as_deref())
            .or(self.customer_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub conversation_id: String,
    #[serde(default)]
    pub created_by: Option<String>,
    /// ISO-8601 时间戳，扫描时才解析
    #[serde(default)]
    pub created_at: Option<String>,
    /// JSON 编码的消息内容，至少包含 interactionId / nodeId
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationPage {
    #[serde(default)]
    pub items: Vec<Conversation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub enterprise_id: String,
    pub mode: String,
    pub session_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub flow_id: Option<String>,
    #[serde(default)]
    pub integration_id: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub current_node_id: Option<String>,
    #[serde(default)]
    pub next_node_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub conversation_by_date: Option<ConversationPage>,
}

impl Session {
    /// 内嵌的会话窗口；backend 返回 null 时视为空
    pub fn conversations(&self) -> &[Conversation] {
        self.conversation_by_date
            .as_ref()
            .map(|page| page.items.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPage {
    #[serde(default)]
    pub items: Vec<Session>,
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `createEventLabel` 的输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLabel {
    pub label_id: String,
    pub enterprise_id: String,
    pub mode: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(rename = "type")]
    pub label_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub interaction_id: String,
}

/// `createEventLabel` 返回的记录（只选取需要的字段）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEventLabel {
    pub label_id: String,
    pub enterprise_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub interaction_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
