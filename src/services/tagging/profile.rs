use tracing::{debug, warn};

use super::TaggingPolicy;
use crate::backend::{Profile, ProfileKey, TaggingBackend};

/// 查询 profile
///
/// backend 出错（网络、超时、GraphQL errors、解码失败）时降级为 `None`。
pub async fn resolve_profile(
    backend: &dyn TaggingBackend,
    policy: &TaggingPolicy,
    enterprise_id: &str,
    customer_id: &str,
) -> Option<Profile> {
    let key = ProfileKey {
        enterprise_id: enterprise_id.to_string(),
        mode: policy.mode.clone(),
        channel: policy.channel.clone(),
        profile_id: customer_id.to_string(),
    };

    match backend.get_profile(&key).await {
        Ok(Some(profile)) => {
            debug!(
                "Resolved profile {} (customer {:?})",
                profile.profile_id,
                profile.resolved_customer_id()
            );
            Some(profile)
        }
        Ok(None) => {
            debug!(
                "No profile for enterprise {} / customer {} ({} {})",
                enterprise_id, customer_id, key.mode, key.channel
            );
            None
        }
        Err(e) => {
            warn!(
                "Profile lookup via {} failed, skipping tagging: {}",
                backend.name(),
                e
            );
            None
        }
    }
}
