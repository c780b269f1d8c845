use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::services::TrackState;
use crate::backend::{AppSyncClient, TaggingBackend};
use crate::config::{DispatchMode, StaticConfig};
use crate::services::{TaggingPipeline, TaggingPolicy};

pub struct StartupContext {
    pub track_state: TrackState,
}

/// 准备服务器启动的上下文
///
/// 配置在这里被校验一次，backend 客户端与打标策略由配置构造后注入流水线。
pub fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    config
        .validate()
        .context("Invalid configuration, refusing to start")?;

    let client = AppSyncClient::new(&config.backend);
    info!(
        "Using GraphQL backend: {} (timeout {} ms)",
        client.endpoint(),
        config.backend.timeout_ms
    );
    let backend: Arc<dyn TaggingBackend> = Arc::new(client);

    let policy = TaggingPolicy::from(&config.tagging);
    info!(
        "Tagging policy: mode={}, channel={}, conversation_window={}",
        policy.mode, policy.channel, policy.conversation_window
    );
    if policy.require_next_node_match {
        warn!(
            "tagging.require_next_node_match is enabled: only conversations whose nodeId \
             equals the session's nextNodeId are labeled"
        );
    }

    let dispatch = config.tagging.dispatch;
    if dispatch == DispatchMode::Background {
        warn!(
            "Background tagging enabled: redirects return before label writes complete; \
             writes still in flight at shutdown may be lost"
        );
    }

    let pipeline = Arc::new(TaggingPipeline::new(backend, policy));
    let track_state = TrackState::new(pipeline, dispatch);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { track_state })
}
