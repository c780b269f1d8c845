//! Backend 抽象层
//!
//! 打标流水线依赖的三个 backend 操作：
//! 1. `get_profile`：按 (enterpriseId, mode, channel, profileId) 读取 profile
//! 2. `search_sessions`：按 (enterpriseId, mode, customerId) 搜索 session，updatedAt 倒序
//! 3. `create_event_label`：写入一条标签
//!
//! 生产实现是 [`AppSyncClient`]（GraphQL over HTTPS），测试中可替换为内存实现。

mod appsync;
pub mod graphql;
pub mod models;

use async_trait::async_trait;

use crate::errors::Result;

pub use appsync::AppSyncClient;
pub use models::{
    Conversation, ConversationPage, CreatedEventLabel, Customer, EventLabel, Profile, Session,
    SessionPage, LABEL_TYPE_DATA_POINT,
};

/// Profile 查询键
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileKey {
    pub enterprise_id: String,
    pub mode: String,
    pub channel: String,
    pub profile_id: String,
}

/// Session 搜索条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    pub enterprise_id: String,
    pub mode: String,
    pub customer_id: String,
    /// 每个 session 内嵌返回的会话条数
    pub conversation_window: u32,
}

#[async_trait]
pub trait TaggingBackend: Send + Sync {
    /// 读取 profile，不存在时返回 `Ok(None)`
    async fn get_profile(&self, key: &ProfileKey) -> Result<Option<Profile>>;

    /// 搜索 session，结果按 updatedAt 倒序
    async fn search_sessions(&self, query: &SessionQuery) -> Result<SessionPage>;

    async fn create_event_label(&self, label: &EventLabel) -> Result<CreatedEventLabel>;

    /// 实现名称（用于日志）
    fn name(&self) -> &'static str;
}
