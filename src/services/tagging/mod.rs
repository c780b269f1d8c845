//! 点击打标流水线
//!
//! ClickDescriptor → profile → session → 最新会话 → EventLabel
//!
//! 每一步依赖上一步的结果，因此按顺序 await。任何一步没有结果都会提前结束，
//! 但都不会影响重定向本身：流水线只返回 [`TaggingOutcome`] 供日志使用。

pub mod label;
pub mod profile;
pub mod scanner;
pub mod session;

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::TaggingBackend;
use crate::config::TaggingConfig;
use crate::errors::ClickTagError;
use crate::services::click::ClickDescriptor;

/// 部署相关的查询策略，启动时从配置构造
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggingPolicy {
    pub mode: String,
    pub channel: String,
    pub conversation_window: u32,
    pub require_next_node_match: bool,
}

impl From<&TaggingConfig> for TaggingPolicy {
    fn from(config: &TaggingConfig) -> Self {
        Self {
            mode: config.mode.clone(),
            channel: config.channel.clone(),
            conversation_window: config.conversation_window,
            require_next_node_match: config.require_next_node_match,
        }
    }
}

impl Default for TaggingPolicy {
    fn default() -> Self {
        Self::from(&TaggingConfig::default())
    }
}

/// 一次点击的打标结果
#[derive(Debug, Clone)]
pub enum TaggingOutcome {
    Labeled {
        label_id: String,
        session_id: String,
        interaction_id: String,
    },
    /// 缺少 enterpriseId/customerId，或 profile 不存在/查询失败
    IdentityUnresolved,
    /// 没有匹配的 session 或查询失败
    SessionUnresolved,
    /// 没有可用的 interactionId
    InteractionUnresolved,
    /// 标签写入失败（已记录日志）
    WriteFailed { label_id: String, error: ClickTagError },
}

impl TaggingOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaggingOutcome::Labeled { .. } => "labeled",
            TaggingOutcome::IdentityUnresolved => "identity_unresolved",
            TaggingOutcome::SessionUnresolved => "session_unresolved",
            TaggingOutcome::InteractionUnresolved => "interaction_unresolved",
            TaggingOutcome::WriteFailed { .. } => "write_failed",
        }
    }
}

pub struct TaggingPipeline {
    backend: Arc<dyn TaggingBackend>,
    policy: TaggingPolicy,
}

impl TaggingPipeline {
    pub fn new(backend: Arc<dyn TaggingBackend>, policy: TaggingPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn run(&self, click: &ClickDescriptor) -> TaggingOutcome {
        let backend = self.backend.as_ref();

        let Some((enterprise_id, customer_id)) = click.identity() else {
            debug!("Click carries no enterpriseId/customerId, skipping tagging");
            return TaggingOutcome::IdentityUnresolved;
        };

        let Some(profile) =
            profile::resolve_profile(backend, &self.policy, enterprise_id, customer_id).await
        else {
            return TaggingOutcome::IdentityUnresolved;
        };

        let Some(profile_customer_id) = profile.resolved_customer_id() else {
            warn!(
                "Profile {} has no customer id, skipping tagging",
                profile.profile_id
            );
            return TaggingOutcome::IdentityUnresolved;
        };

        let Some(session) =
            session::select_session(backend, &self.policy, enterprise_id, profile_customer_id)
                .await
        else {
            return TaggingOutcome::SessionUnresolved;
        };

        let required_node_id = if self.policy.require_next_node_match {
            session.next_node_id.as_deref()
        } else {
            None
        };

        if self.policy.require_next_node_match && required_node_id.is_none() {
            debug!(
                "Session {} has no nextNodeId to match, skipping tagging",
                session.session_id
            );
            return TaggingOutcome::InteractionUnresolved;
        }

        let Some(latest) = scanner::scan_conversations(session.conversations(), required_node_id)
        else {
            debug!("No usable conversation in session {}", session.session_id);
            return TaggingOutcome::InteractionUnresolved;
        };

        let label_id = Uuid::new_v4().to_string();
        let Some(event_label) = label::build_event_label(&session, click, &latest, label_id)
        else {
            debug!(
                "Latest conversation {} carries no interactionId",
                latest.conversation_id
            );
            return TaggingOutcome::InteractionUnresolved;
        };

        debug!(
            "Latest interaction {} in conversation {}",
            event_label.interaction_id, event_label.conversation_id
        );

        match label::write_label(backend, &event_label).await {
            Ok(label_id) => TaggingOutcome::Labeled {
                label_id,
                session_id: event_label.session_id,
                interaction_id: event_label.interaction_id,
            },
            Err(error) => TaggingOutcome::WriteFailed {
                label_id: event_label.label_id,
                error,
            },
        }
    }
}
