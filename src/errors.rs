use std::fmt;

#[derive(Debug, Clone)]
pub enum ClickTagError {
    MissingParameter(String),
    Config(String),
    BackendTransport(String),
    BackendStatus(String),
    BackendResponse(String),
    Serialization(String),
    Timeout(String),
    TaskJoin(String),
}

impl ClickTagError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ClickTagError::MissingParameter(_) => "E001",
            ClickTagError::Config(_) => "E002",
            ClickTagError::BackendTransport(_) => "E003",
            ClickTagError::BackendStatus(_) => "E004",
            ClickTagError::BackendResponse(_) => "E005",
            ClickTagError::Serialization(_) => "E006",
            ClickTagError::Timeout(_) => "E007",
            ClickTagError::TaskJoin(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ClickTagError::MissingParameter(_) => "Missing Parameter",
            ClickTagError::Config(_) => "Configuration Error",
            ClickTagError::BackendTransport(_) => "Backend Transport Error",
            ClickTagError::BackendStatus(_) => "Backend Status Error",
            ClickTagError::BackendResponse(_) => "Backend Response Error",
            ClickTagError::Serialization(_) => "Serialization Error",
            ClickTagError::Timeout(_) => "Backend Timeout",
            ClickTagError::TaskJoin(_) => "Background Task Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ClickTagError::MissingParameter(msg)
            | ClickTagError::Config(msg)
            | ClickTagError::BackendTransport(msg)
            | ClickTagError::BackendStatus(msg)
            | ClickTagError::BackendResponse(msg)
            | ClickTagError::Serialization(msg)
            | ClickTagError::Timeout(msg)
            | ClickTagError::TaskJoin(msg) => msg,
        }
    }

    /// Backend 侧错误：查询阶段降级为 "unresolved"，写入阶段仅记录日志
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            ClickTagError::BackendTransport(_)
                | ClickTagError::BackendStatus(_)
                | ClickTagError::BackendResponse(_)
                | ClickTagError::Timeout(_)
        )
    }

    /// 格式化为彩色输出（启动失败时输出到终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ClickTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ClickTagError {}

// 便捷的构造函数
impl ClickTagError {
    pub fn missing_parameter<T: Into<String>>(msg: T) -> Self {
        ClickTagError::MissingParameter(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        ClickTagError::Config(msg.into())
    }

    pub fn backend_transport<T: Into<String>>(msg: T) -> Self {
        ClickTagError::BackendTransport(msg.into())
    }

    pub fn backend_status<T: Into<String>>(msg: T) -> Self {
        ClickTagError::BackendStatus(msg.into())
    }

    pub fn backend_response<T: Into<String>>(msg: T) -> Self {
        ClickTagError::BackendResponse(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ClickTagError::Serialization(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        ClickTagError::Timeout(msg.into())
    }

    pub fn task_join<T: Into<String>>(msg: T) -> Self {
        ClickTagError::TaskJoin(msg.into())
    }
}

impl From<serde_json::Error> for ClickTagError {
    fn from(err: serde_json::Error) -> Self {
        ClickTagError::Serialization(err.to_string())
    }
}

impl From<ureq::Error> for ClickTagError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => {
                ClickTagError::BackendStatus(format!("backend responded with HTTP {}", status))
            }
            ureq::Error::Timeout(which) => {
                ClickTagError::Timeout(format!("backend call timed out ({:?})", which))
            }
            ureq::Error::Json(e) => ClickTagError::Serialization(e.to_string()),
            other => ClickTagError::BackendTransport(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for ClickTagError {
    fn from(err: config::ConfigError) -> Self {
        ClickTagError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClickTagError>;
