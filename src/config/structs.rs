use serde::{Deserialize, Serialize};

use crate::errors::{ClickTagError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "clicktag.toml";

/// Profile/session 查询使用的默认模式
pub const DEFAULT_MODE: &str = "TEST";
/// Profile 查询使用的默认渠道
pub const DEFAULT_CHANNEL: &str = "WHATSAPP";

/// 原部署使用的环境变量名，作为 backend 配置的兜底来源
const LEGACY_ENDPOINT_ENV: &str = "APPSYNC_ENDPOINT";
const LEGACY_API_KEY_ENV: &str = "APPSYNC_API_KEY";

/// 静态配置（启动时加载一次，之后只读）
///
/// - server: 监听地址、端口、worker 数量
/// - backend: GraphQL 端点、API key、单次调用超时
/// - tagging: 打标策略（mode / channel / 会话窗口 / 调度方式）
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub tagging: TaggingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置并校验
    ///
    /// 优先级：ENV > TOML 文件 > 默认值
    /// ENV 前缀：CLICKTAG，分隔符：__
    /// 示例：CLICKTAG__BACKEND__ENDPOINT=https://example.appsync-api.com/graphql
    ///
    /// `APPSYNC_ENDPOINT` / `APPSYNC_API_KEY` 在未显式配置时作为兜底。
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("CLICKTAG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: StaticConfig = settings.try_deserialize()?;
        config.apply_legacy_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// 用旧的环境变量补齐空缺的 backend 配置
    pub(crate) fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.backend.endpoint.trim().is_empty()
            && let Some(endpoint) = lookup(LEGACY_ENDPOINT_ENV)
        {
            self.backend.endpoint = endpoint;
        }
        if self.backend.api_key.trim().is_empty()
            && let Some(key) = lookup(LEGACY_API_KEY_ENV)
        {
            self.backend.api_key = key;
        }
    }

    /// 启动期校验，缺少必要配置时直接失败，而不是拖到每个请求
    pub fn validate(&self) -> Result<()> {
        if self.backend.endpoint.trim().is_empty() {
            return Err(ClickTagError::config(
                "backend.endpoint is required (CLICKTAG__BACKEND__ENDPOINT or APPSYNC_ENDPOINT)",
            ));
        }
        if self.backend.api_key.trim().is_empty() {
            return Err(ClickTagError::config(
                "backend.api_key is required (CLICKTAG__BACKEND__API_KEY or APPSYNC_API_KEY)",
            ));
        }
        if self.backend.timeout_ms == 0 {
            return Err(ClickTagError::config("backend.timeout_ms must be greater than 0"));
        }
        if self.tagging.mode.trim().is_empty() || self.tagging.channel.trim().is_empty() {
            return Err(ClickTagError::config(
                "tagging.mode and tagging.channel must not be empty",
            ));
        }
        if self.tagging.conversation_window == 0 {
            return Err(ClickTagError::config(
                "tagging.conversation_window must be greater than 0",
            ));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let mut sample = Self::default();
        sample.backend.endpoint = "https://example.appsync-api.us-east-1.amazonaws.com/graphql".into();
        sample.backend.api_key = "da2-xxxxxxxxxxxxxxxxxxxxxxxxxx".into();
        toml::to_string_pretty(&sample)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// GraphQL backend 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    /// 单次 backend 调用的总超时（毫秒）
    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,
}

/// 打标流水线的调度方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// 在返回重定向之前等待整个打标流程结束
    #[default]
    Inline,
    /// 后台执行，立即返回重定向；进程退出时可能丢失未完成的写入
    Background,
}

/// 打标策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingConfig {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    /// 每个 session 内嵌返回的会话条数
    #[serde(default = "default_conversation_window")]
    pub conversation_window: u32,
    #[serde(default)]
    pub dispatch: DispatchMode,
    /// 仅把 nodeId 等于 session.nextNodeId 的会话作为候选
    #[serde(default)]
    pub require_next_node_match: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_backend_timeout_ms() -> u64 {
    3000
}

fn default_mode() -> String {
    DEFAULT_MODE.to_string()
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

fn default_conversation_window() -> u32 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            timeout_ms: default_backend_timeout_ms(),
        }
    }
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            channel: default_channel(),
            conversation_window: default_conversation_window(),
            dispatch: DispatchMode::default(),
            require_next_node_match: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
