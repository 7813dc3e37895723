//! # 数据模型与中间结果
//!
//! ## 设计思路
//!
//! 将“对外可见的状态”和“内部持有的资源”解耦：
//! - `ImageResource`：可克隆的只读描述（句柄字符串、创建时间、MIME），视图与分发器只拿到它
//! - `ResourceGuard`：本地句柄的唯一所有者（RAII），只有生命周期管理器持有
//! - `LoadState`：视图可执行哪些操作的唯一依据
//! - `FetchAttempt`：单次请求的序号、防缓存令牌与结果
//!
//! `ResourceGuard` 不实现 `Clone`，`retire` 消费自身，`Drop` 兜底释放，
//! 因此同一句柄不可能被释放两次，也不会因遗漏调用而泄漏。

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;

use super::ImageError;
use super::host::BlobHost;

/// 图片 MIME（接口约定返回 JPEG）。
pub const JPEG_MIME: &str = "image/jpeg";
/// 分享时生成的文件名。
pub const SHARE_FILE_NAME: &str = "inspirational-quote.jpg";

/// 下载建议文件名：`inspirational-quote-<毫秒时间戳>.jpg`。
pub fn download_file_name(stamp: i64) -> String {
    format!("inspirational-quote-{}.jpg", stamp)
}

/// 单调递增的毫秒时间戳来源。
///
/// 取当前墙钟毫秒，若与上次相同或回拨则取上次 + 1，保证同一进程内永不重复。
/// 用于请求防缓存令牌与下载文件名。
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(observed) => prev = observed,
            }
        }
    }
}

/// 已分配本地句柄的图片资源描述。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageResource {
    /// 进程内有效的本地句柄（类 URI 字符串）。
    pub handle: String,
    /// 创建时间（单调毫秒时间戳）。
    pub created_at: i64,
    /// 负载 MIME。
    pub mime_type: &'static str,
}

/// 视图加载状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Ready(ImageResource),
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// `Ready` 时返回当前资源。
    pub fn resource(&self) -> Option<&ImageResource> {
        match self {
            Self::Ready(resource) => Some(resource),
            _ => None,
        }
    }

    /// `Failed` 时返回用户可见错误文案。
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// 单次获取请求。
#[derive(Debug)]
pub struct FetchAttempt {
    /// 发起顺序号，单调递增。
    pub sequence: u64,
    /// 防缓存令牌（毫秒时间戳）。
    pub token: i64,
    pub outcome: Result<Bytes, ImageError>,
}

/// 本地句柄的所有权包装。
///
/// 成功获取后创建，被新资源替换、获取失败、展示失败或视图销毁时释放，且只释放一次。
pub(crate) struct ResourceGuard {
    resource: ImageResource,
    blobs: Arc<dyn BlobHost>,
    retired: bool,
}

impl ResourceGuard {
    /// 为负载分配新的本地句柄。
    pub(crate) fn acquire(
        blobs: Arc<dyn BlobHost>,
        payload: Bytes,
        created_at: i64,
    ) -> Result<Self, ImageError> {
        let handle = blobs.create(payload, JPEG_MIME)?;
        log::debug!("🔗 已分配本地句柄：{}", handle);
        Ok(Self {
            resource: ImageResource {
                handle,
                created_at,
                mime_type: JPEG_MIME,
            },
            blobs,
            retired: false,
        })
    }

    pub(crate) fn resource(&self) -> &ImageResource {
        &self.resource
    }

    /// 显式释放句柄。
    pub(crate) fn retire(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.retired {
            return;
        }
        self.retired = true;
        if self.blobs.revoke(&self.resource.handle) {
            log::debug!("🧹 已释放本地句柄：{}", self.resource.handle);
        } else {
            log::warn!("⚠️ 本地句柄已不存在：{}", self.resource.handle);
        }
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// 分享链第一层生成的文件对象。
#[derive(Debug, Clone)]
pub struct ShareFile {
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Bytes,
}

/// 交给宿主“另存为”原语的请求。
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub handle: String,
    pub file_name: String,
    pub bytes: Bytes,
}
