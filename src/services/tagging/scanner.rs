//! 会话扫描
//!
//! 在 session 内嵌的会话窗口中找出 createdAt 最大的一条，并从其 JSON content 中取出
//! interactionId / nodeId。
//!
//! - 线性扫描全部会话，不依赖 backend 返回顺序
//! - 严格大于才替换，时间相同时先出现的胜出
//! - content 不是 JSON 对象或 createdAt 无法解析的会话被跳过（记录日志），不会中断扫描

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use tracing::{trace, warn};

use crate::backend::Conversation;

/// 扫描结果：时间最新的可用会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestInteraction {
    pub conversation_id: String,
    pub created_at: DateTime<FixedOffset>,
    pub interaction_id: Option<String>,
    pub node_id: Option<String>,
}

/// 解析后的 content 中我们关心的字段
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentIds {
    pub interaction_id: Option<String>,
    pub node_id: Option<String>,
}

/// 解析会话 content；非 JSON 对象时返回 None
pub fn parse_content(content: &str) -> Option<ContentIds> {
    let value: Value = serde_json::from_str(content).ok()?;
    if !value.is_object() {
        return None;
    }
    Some(ContentIds {
        interaction_id: id_field(&value, "interactionId"),
        node_id: id_field(&value, "nodeId"),
    })
}

/// 字符串或数字形式的 id；null、空串与其他类型视为缺失
fn id_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok()
}

/// 找出 createdAt 最大的可用会话
///
/// `required_node_id` 为 Some 时，只有 content.nodeId 与之相等的会话才参与比较。
pub fn scan_conversations(
    conversations: &[Conversation],
    required_node_id: Option<&str>,
) -> Option<LatestInteraction> {
    let mut latest: Option<LatestInteraction> = None;

    for conversation in conversations {
        let Some(ids) = conversation.content.as_deref().and_then(parse_content) else {
            warn!(
                "Skipping conversation {}: content is not a JSON object",
                conversation.conversation_id
            );
            continue;
        };

        let Some(created_at) = conversation.created_at.as_deref().and_then(parse_timestamp)
        else {
            warn!(
                "Skipping conversation {}: createdAt {:?} is not an RFC 3339 timestamp",
                conversation.conversation_id, conversation.created_at
            );
            continue;
        };

        if let Some(required) = required_node_id
            && ids.node_id.as_deref() != Some(required)
        {
            trace!(
                "Conversation {} nodeId {:?} does not match {}",
                conversation.conversation_id, ids.node_id, required
            );
            continue;
        }

        let is_later = latest
            .as_ref()
            .is_none_or(|current| created_at > current.created_at);

        if is_later {
            latest = Some(LatestInteraction {
                conversation_id: conversation.conversation_id.clone(),
                created_at,
                interaction_id: ids.interaction_id,
                node_id: ids.node_id,
            });
        }
    }

    latest
}
