//! Server mode
//!
//! 启动 HTTP 服务器：health scope 在前，兜底的 track 路由在后。

use actix_web::{App, HttpServer, middleware::DefaultHeaders, web};
use anyhow::Result;
use tracing::{info, warn};

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{AppStartTime, health_routes, track_routes};
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_server_startup(&config).map_err(|e| {
        tracing::error!("Server startup failed: {:#}", e);
        e
    })?;

    let track_state = startup.track_state;
    let state_for_shutdown = track_state.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} worker(s) for the server", cpu_count);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(track_state.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .wrap(
                DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(health_routes())
            .service(track_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    // SIGINT/SIGTERM 由下面自行处理：后台打标任务运行在 worker 上，必须在 worker 停止前收尾
    let mut signals = lifetime::shutdown::ShutdownListener::install()?;
    let server = server.bind(bind_address)?.disable_signals().run();
    let handle = server.handle();
    let mut server_task = actix_web::rt::spawn(server);

    tokio::select! {
        res = &mut server_task => {
            res??;
            return Ok(());
        }
        _ = signals.recv() => {}
    }

    handle.pause().await;
    lifetime::shutdown::finish_background_tagging(&state_for_shutdown).await;
    handle.stop(true).await;
    server_task.await??;

    warn!("Graceful shutdown completed");
    Ok(())
}
