//! HTTP 层：路由、handler 与中间件

pub mod middleware;
pub mod services;
