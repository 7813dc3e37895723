//! # 资源生命周期管理模块
//!
//! ## 设计思路
//!
//! `ResourceLifecycleManager` 是当前图片本地句柄的唯一所有者与唯一释放者：
//! 1. 发起请求前同步切到 `Loading`
//! 2. 以防缓存令牌拉取字节并校验签名
//! 3. 成功：释放旧句柄 → 分配新句柄 → `Ready`
//! 4. 失败：释放旧句柄（失败即清空，不静默展示旧图）→ `Failed`
//!
//! ## 并发与顺序
//!
//! 所有方法只需 `&self`，内部状态放在 `Mutex` 中且从不跨 `.await` 持锁。
//! 每次请求分配单调递增序号；结果返回时若序号不是最新发起的那个，直接丢弃，
//! 既不改状态也不分配句柄。因此后发起的请求总是决定最终状态，
//! 先发起但后返回的结果不会覆盖 `Ready`，也不会释放新句柄。
//!
//! 视图销毁后（`teardown`）所有在途结果同样被丢弃。

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use super::host::{BlobHost, ImageFetcher};
use super::pipeline;
use super::source::{FetchAttempt, LoadState, MonotonicClock, ResourceGuard};
use super::{DISPLAY_FAILED_MESSAGE, ImageError};

struct ManagerState {
    load: LoadState,
    active: Option<ResourceGuard>,
    latest_issued: u64,
    torn_down: bool,
}

/// 图片资源生命周期管理器。
pub struct ResourceLifecycleManager {
    fetcher: Arc<dyn ImageFetcher>,
    blobs: Arc<dyn BlobHost>,
    clock: MonotonicClock,
    state: Mutex<ManagerState>,
}

impl ResourceLifecycleManager {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, blobs: Arc<dyn BlobHost>) -> Self {
        Self {
            fetcher,
            blobs,
            clock: MonotonicClock::new(),
            state: Mutex::new(ManagerState {
                load: LoadState::Idle,
                active: None,
                latest_issued: 0,
                torn_down: false,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            log::warn!("⚠️ 生命周期状态锁已中毒，继续使用内部数据");
            poisoned.into_inner()
        })
    }

    /// 当前加载状态快照。
    pub fn current_state(&self) -> LoadState {
        self.lock_state().load.clone()
    }

    /// `Ready` 时返回当前资源。
    #[cfg(test)]
    pub(crate) fn active_resource(&self) -> Option<super::source::ImageResource> {
        self.lock_state().load.resource().cloned()
    }

    /// 请求一张新图片，返回本次调用结束时的状态。
    ///
    /// 若本次结果已被更新的请求取代，返回值是调用结束时的最新状态（可能仍为 `Loading`）。
    pub async fn request_new_image(&self) -> LoadState {
        let Some((sequence, token)) = self.begin_attempt() else {
            log::debug!("⏭️ 视图已销毁，忽略刷新请求");
            return self.current_state();
        };

        let total_start = Instant::now();
        let outcome = match self.fetcher.fetch(token).await {
            Ok(bytes) => pipeline::validate_image_signature(&bytes).map(|mime| {
                log::debug!("🔎 响应体签名：{}（{} 字节）", mime, bytes.len());
                bytes
            }),
            Err(err) => Err(err),
        };
        log::info!(
            "⏱️ 请求 #{} 完成 - fetch={}ms ok={}",
            sequence,
            total_start.elapsed().as_millis(),
            outcome.is_ok()
        );

        self.complete_attempt(FetchAttempt {
            sequence,
            token,
            outcome,
        })
    }

    /// 同步切到 `Loading` 并登记新序号。视图已销毁时返回 `None`。
    fn begin_attempt(&self) -> Option<(u64, i64)> {
        let mut state = self.lock_state();
        if state.torn_down {
            return None;
        }
        state.latest_issued += 1;
        state.load = LoadState::Loading;
        Some((state.latest_issued, self.clock.next_millis()))
    }

    fn complete_attempt(&self, attempt: FetchAttempt) -> LoadState {
        let mut state = self.lock_state();

        if state.torn_down || attempt.sequence != state.latest_issued {
            log::info!(
                "⏭️ 丢弃过期请求结果 #{}（t={}，最新 #{}）",
                attempt.sequence,
                attempt.token,
                state.latest_issued
            );
            return state.load.clone();
        }

        if let Some(previous) = state.active.take() {
            previous.retire();
        }

        let acquired = attempt.outcome.and_then(|bytes| {
            ResourceGuard::acquire(Arc::clone(&self.blobs), bytes, self.clock.next_millis())
        });

        state.load = match acquired {
            Ok(guard) => {
                let resource = guard.resource().clone();
                state.active = Some(guard);
                log::info!("✅ 新图片就绪 - 句柄: {}", resource.handle);
                LoadState::Ready(resource)
            }
            Err(err) => {
                log::error!(
                    "❌ 获取图片失败 #{} - code={} stage={}：{}",
                    attempt.sequence,
                    err.code(),
                    err.stage(),
                    err
                );
                LoadState::Failed(err.user_message())
            }
        };

        state.load.clone()
    }

    /// 视图报告图片渲染失败。
    ///
    /// 仅当 `handle` 是当前 `Ready` 的句柄时生效：释放资源并切到 `Failed`。
    pub fn report_display_failure(&self, handle: &str, error: &ImageError) -> LoadState {
        let mut state = self.lock_state();

        let is_current = state
            .load
            .resource()
            .is_some_and(|resource| resource.handle == handle);
        if !is_current {
            log::debug!("⏭️ 忽略过期的渲染失败报告：{}", handle);
            return state.load.clone();
        }

        log::error!("❌ 图片渲染失败 - 句柄: {}：{}", handle, error);
        if let Some(active) = state.active.take() {
            active.retire();
        }
        state.load = LoadState::Failed(DISPLAY_FAILED_MESSAGE.to_string());
        state.load.clone()
    }

    /// 视图永久关闭：无条件释放当前资源，之后的请求结果全部丢弃。
    pub fn teardown(&self) {
        let mut state = self.lock_state();
        state.torn_down = true;
        if let Some(active) = state.active.take() {
            active.retire();
        }
        state.load = LoadState::Idle;
        log::info!("🧹 视图已销毁，资源已释放");
    }
}
