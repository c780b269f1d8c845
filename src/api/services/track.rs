//! 点击跟踪 + 重定向
//!
//! 只要拿到了 `redirect_url` 就一定返回 302；打标流水线的结果只进日志。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use tracing::{Instrument, Span, debug, info, warn};

use crate::config::DispatchMode;
use crate::services::click::{ClickDescriptor, MISSING_REDIRECT_URL};
use crate::services::{TaggingOutcome, TaggingPipeline};

/// 注入到 actix `app_data` 的共享状态
#[derive(Clone)]
pub struct TrackState {
    pipeline: Arc<TaggingPipeline>,
    dispatch: DispatchMode,
    in_flight: Arc<AtomicUsize>,
}

/// 后台任务结束（包括 panic）时归还计数
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl TrackState {
    pub fn new(pipeline: Arc<TaggingPipeline>, dispatch: DispatchMode) -> Self {
        Self {
            pipeline,
            dispatch,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 尚未完成的后台打标任务数
    pub fn pending_background(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn pipeline(&self) -> &Arc<TaggingPipeline> {
        &self.pipeline
    }

    pub fn dispatch(&self) -> DispatchMode {
        self.dispatch
    }
}

pub struct TrackService;

impl TrackService {
    pub async fn handle_track(req: HttpRequest, state: web::Data<TrackState>) -> HttpResponse {
        let click = match ClickDescriptor::from_query_string(req.query_string()) {
            Ok(click) => click,
            Err(e) => {
                debug!("Rejecting click: {}", e);
                return Self::missing_parameter_response();
            }
        };

        info!(
            "redirect_url: {} (enterpriseId: {:?}, customerId: {:?})",
            click.target_url, click.enterprise_id, click.customer_id
        );

        let location = Self::location_value(&click.target_url);
        Self::dispatch_tagging(&state, click).await;

        Self::redirect_response(location)
    }

    /// 按配置执行打标：inline 等待完成，background 交给 runtime 后立即返回
    async fn dispatch_tagging(state: &TrackState, click: ClickDescriptor) {
        match state.dispatch {
            DispatchMode::Inline => {
                let outcome = state.pipeline.run(&click).await;
                Self::log_outcome(&outcome);
            }
            DispatchMode::Background => {
                let pipeline = Arc::clone(&state.pipeline);
                state.in_flight.fetch_add(1, Ordering::AcqRel);
                let guard = InFlightGuard(Arc::clone(&state.in_flight));
                tokio::spawn(
                    async move {
                        let _guard = guard;
                        let outcome = pipeline.run(&click).await;
                        Self::log_outcome(&outcome);
                    }
                    .instrument(Span::current()),
                );
            }
        }
    }

    fn log_outcome(outcome: &TaggingOutcome) {
        match outcome {
            TaggingOutcome::Labeled {
                label_id,
                session_id,
                interaction_id,
            } => info!(
                "Click tagged: label {} session {} interaction {}",
                label_id, session_id, interaction_id
            ),
            TaggingOutcome::WriteFailed { label_id, error } => warn!(
                "Click not tagged, label {} write failed: {}",
                label_id, error
            ),
            other => debug!("Click not tagged: {}", other.as_str()),
        }
    }

    /// Location 头
    ///
    /// 解码后的 URL 可能含有非 ASCII 字符，此时把不可见字节重新 percent-encode。
    fn location_value(target: &str) -> HeaderValue {
        if target.bytes().all(|b| b.is_ascii_graphic())
            && let Ok(value) = HeaderValue::from_str(target)
        {
            return value;
        }

        let mut encoded = String::with_capacity(target.len() * 3);
        for byte in target.bytes() {
            if byte.is_ascii_graphic() {
                encoded.push(byte as char);
            } else {
                encoded.push_str(&format!("%{:02X}", byte));
            }
        }
        HeaderValue::from_str(&encoded).unwrap_or_else(|_| HeaderValue::from_static("/"))
    }

    #[inline]
    fn redirect_response(location: HeaderValue) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, location))
            .finish()
    }

    #[inline]
    fn missing_parameter_response() -> HttpResponse {
        HttpResponse::BadRequest().json(json!({ "message": MISSING_REDIRECT_URL }))
    }
}

/// Track 路由配置（兜底路由，需在其它 scope 之后注册）
pub fn track_routes() -> actix_web::Scope {
    web::scope("")
        .route("/{path}*", web::get().to(TrackService::handle_track))
        .route("/{path}*", web::head().to(TrackService::handle_track))
}
