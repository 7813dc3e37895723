//! # 分发调度模块
//!
//! ## 设计思路
//!
//! `DistributionDispatcher` 是当前资源的只读消费者，提供两个独立操作：
//! - `save`：以 `inspirational-quote-<时间戳>.jpg` 为建议文件名交给宿主“另存为”
//! - `share`：按 `ShareChain` 顺序尝试各分享方式
//!
//! 两者都只在 `LoadState::Ready` 时生效，其余状态为空操作。
//! 分发器从不释放句柄；每次操作开始时先从句柄复制一份负载（`Bytes` 引用计数），
//! 之后即使生命周期管理器释放了该句柄，在途操作也不受影响。
//! 所有失败只写日志，不回报给视图。

use std::sync::Arc;

use super::ImageError;
use super::host::{BlobHost, SaveHost};
use super::share::{ShareChain, ShareRequest};
use super::source::{
    ImageResource, JPEG_MIME, LoadState, MonotonicClock, SHARE_FILE_NAME, SaveRequest, ShareFile,
    download_file_name,
};

/// 分发调度器。
pub struct DistributionDispatcher {
    blobs: Arc<dyn BlobHost>,
    saver: Arc<dyn SaveHost>,
    chain: ShareChain,
    clock: MonotonicClock,
    page_url: String,
}

impl DistributionDispatcher {
    pub fn new(
        blobs: Arc<dyn BlobHost>,
        saver: Arc<dyn SaveHost>,
        chain: ShareChain,
        page_url: impl Into<String>,
    ) -> Self {
        Self {
            blobs,
            saver,
            chain,
            clock: MonotonicClock::new(),
            page_url: page_url.into(),
        }
    }

    /// 保存当前图片到磁盘（触发即返回，不回报结果）。
    pub fn save(&self, state: &LoadState) {
        let Some(resource) = state.resource() else {
            log::debug!("⏭️ 当前无可用图片，忽略保存");
            return;
        };

        let bytes = match self.blobs.read(&resource.handle) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("❌ 保存失败，无法读取本地句柄：{}", err);
                return;
            }
        };

        let file_name = download_file_name(self.clock.next_millis());
        let request = SaveRequest {
            handle: resource.handle.clone(),
            file_name: file_name.clone(),
            bytes,
        };

        match self.saver.save_as(request) {
            Ok(()) => log::info!("💾 已触发保存：{}", file_name),
            Err(err) => log::error!("❌ 保存失败 - code={}：{}", err.code(), err),
        }
    }

    /// 分享当前图片。
    pub async fn share(&self, state: &LoadState) {
        let Some(resource) = state.resource() else {
            log::debug!("⏭️ 当前无可用图片，忽略分享");
            return;
        };

        let file = match self.materialize_share_file(resource) {
            Ok(file) => Some(file),
            Err(err) => {
                log::warn!("⚠️ 生成分享文件失败，直接使用兜底方式：{}", err);
                None
            }
        };

        let request = ShareRequest {
            file,
            page_url: self.page_url.clone(),
        };
        self.chain.run(&request).await;
    }

    /// 从本地句柄重新读取负载并生成分享文件。
    fn materialize_share_file(&self, resource: &ImageResource) -> Result<ShareFile, ImageError> {
        let bytes = self.blobs.read(&resource.handle)?;
        Ok(ShareFile {
            name: SHARE_FILE_NAME.to_string(),
            mime_type: JPEG_MIME,
            bytes,
        })
    }
}
