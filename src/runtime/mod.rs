//! 运行时：启动准备、HTTP 服务器与优雅关闭

pub mod lifetime;
pub mod modes;
