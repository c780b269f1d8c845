use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use tracing::trace;

use super::track::TrackState;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub backend: &'static str,
    pub dispatch: String,
    pub started_at: String,
    pub uptime_secs: i64,
}

/// Health Service
///
/// 只报告进程存活，不探测 backend（backend 不可用时重定向依然可用）。
pub struct HealthService;

impl HealthService {
    pub async fn liveness_check(
        state: web::Data<TrackState>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received liveness check request");

        let now = chrono::Utc::now();
        let uptime = now.signed_duration_since(app_start_time.start_datetime);

        HttpResponse::Ok().json(LivenessResponse {
            status: "ok",
            backend: state.pipeline().backend_name(),
            dispatch: format!("{:?}", state.dispatch()).to_lowercase(),
            started_at: app_start_time.start_datetime.to_rfc3339(),
            uptime_secs: uptime.num_seconds().max(0),
        })
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
