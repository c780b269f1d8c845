//! 标签写入
//!
//! 写入是 best-effort：错误只记录日志并作为结果返回，调用方不会据此改变重定向。

use tracing::{error, info};

use super::scanner::LatestInteraction;
use crate::backend::{EventLabel, LABEL_TYPE_DATA_POINT, Session, TaggingBackend};
use crate::errors::ClickTagError;
use crate::services::click::ClickDescriptor;

/// 构造标签；没有 interactionId 时返回 None（不写入空上下文的标签）
pub fn build_event_label(
    session: &Session,
    click: &ClickDescriptor,
    latest: &LatestInteraction,
    label_id: String,
) -> Option<EventLabel> {
    let interaction_id = latest.interaction_id.clone()?;

    Some(EventLabel {
        label_id,
        enterprise_id: session.enterprise_id.clone(),
        mode: session.mode.clone(),
        session_id: session.session_id.clone(),
        flow_id: session.flow_id.clone(),
        customer_id: session.customer_id.clone(),
        workspace_id: session.workspace_id.clone(),
        label_type: LABEL_TYPE_DATA_POINT.to_string(),
        label: click.label_name.clone(),
        value: click.label_value.clone(),
        conversation_id: latest.conversation_id.clone(),
        node_id: latest.node_id.clone(),
        interaction_id,
    })
}

/// 提交标签，错误被吞掉只留日志
pub async fn write_label(
    backend: &dyn TaggingBackend,
    label: &EventLabel,
) -> Result<String, ClickTagError> {
    match backend.create_event_label(label).await {
        Ok(created) => {
            info!(
                "Created event label {} for session {} interaction {}",
                created.label_id, label.session_id, label.interaction_id
            );
            Ok(created.label_id)
        }
        Err(e) => {
            error!(
                "Error while creating event label {} via {}: {}",
                label.label_id,
                backend.name(),
                e
            );
            Err(e)
        }
    }
}
