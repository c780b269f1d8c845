use std::time::Duration;

use tokio::signal;
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use crate::api::services::TrackState;

/// 等待后台打标任务完成的最长时间（秒）
const DRAIN_TIMEOUT_SECS: u64 = 10;

const DRAIN_POLL_INTERVAL_MS: u64 = 50;

/// 触发关闭的信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM（容器、systemd、k8s）
    Terminate,
}

/// 关闭信号监听
///
/// `install` 时立即注册 handler，此后收到的 SIGINT/SIGTERM 不再走默认动作终止进程，
/// 而是由 [`ShutdownListener::recv`] 交给关闭流程。非 unix 平台只监听 Ctrl+C。
pub struct ShutdownListener {
    #[cfg(unix)]
    interrupt: signal::unix::Signal,
    #[cfg(unix)]
    terminate: signal::unix::Signal,
}

impl ShutdownListener {
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use signal::unix::SignalKind;

        Ok(Self {
            interrupt: signal::unix::signal(SignalKind::interrupt())?,
            terminate: signal::unix::signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// 等待下一个关闭信号
    #[cfg(unix)]
    pub async fn recv(&mut self) -> ShutdownSignal {
        let received = tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
        };
        info!(
            "Shutdown signal received ({:?}), stopping server...",
            received
        );
        received
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> ShutdownSignal {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received (Interrupt), stopping server..."),
            Err(e) => warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            ),
        }
        ShutdownSignal::Interrupt
    }
}

/// 暂停接收新连接后、停止 worker 前调用
pub async fn finish_background_tagging(state: &TrackState) {
    drain_background_tasks(state, Duration::from_secs(DRAIN_TIMEOUT_SECS)).await;
}

/// 等待后台打标任务结束；超时后放弃并返回剩余数量
pub async fn drain_background_tasks(state: &TrackState, limit: Duration) -> usize {
    let deadline = Instant::now() + limit;

    loop {
        let pending = state.pending_background();
        if pending == 0 {
            info!("All background tagging tasks completed");
            return 0;
        }
        if Instant::now() >= deadline {
            warn!(
                "{} background tagging task(s) still running after {:?}, abandoning",
                pending, limit
            );
            return pending;
        }
        sleep(Duration::from_millis(DRAIN_POLL_INTERVAL_MS)).await;
    }
}
