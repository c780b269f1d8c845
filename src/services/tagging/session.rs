use tracing::{debug, warn};

use super::TaggingPolicy;
use crate::backend::{Session, SessionQuery, TaggingBackend};

/// 选出 updatedAt 最新的 session
///
/// 直接取 backend 倒序结果的第 0 条。updatedAt 完全相同时没有二级排序键，
/// 选择结果取决于 backend 返回顺序。
pub async fn select_session(
    backend: &dyn TaggingBackend,
    policy: &TaggingPolicy,
    enterprise_id: &str,
    customer_id: &str,
) -> Option<Session> {
    let query = SessionQuery {
        enterprise_id: enterprise_id.to_string(),
        mode: policy.mode.clone(),
        customer_id: customer_id.to_string(),
        conversation_window: policy.conversation_window,
    };

    let page = match backend.search_sessions(&query).await {
        Ok(page) => page,
        Err(e) => {
            warn!(
                "Session search via {} failed, skipping tagging: {}",
                backend.name(),
                e
            );
            return None;
        }
    };

    debug!(
        "Session search returned {} item(s), total {:?}",
        page.items.len(),
        page.total
    );

    let session = page.items.into_iter().next();
    match &session {
        Some(s) => debug!(
            "Selected session {} (updatedAt {:?}, {} conversation(s))",
            s.session_id,
            s.updated_at,
            s.conversations().len()
        ),
        None => debug!(
            "No session for enterprise {} / customer {}",
            enterprise_id, customer_id
        ),
    }
    session
}
