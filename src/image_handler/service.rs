//! # 服务层（视图控制器状态）
//!
//! ## 设计思路
//!
//! `QuoteViewState` 是视图唯一持有的显式状态对象，替代散落在各回调里的全局可变状态。
//! 它组合生命周期管理器与分发调度器，对外只暴露少量稳定 API：
//! - `activate` / `refresh`：请求新图片并尝试渲染
//! - `save` / `share`：基于当前状态分发
//! - `report_display_failure`：视图渲染失败回报
//! - `teardown`：视图永久关闭
//! - `snapshot`：视图渲染所需的只读快照
//!
//! ## 实现思路
//!
//! 宿主能力通过 `HostBundle` 注入；`new` 使用桌面实现，测试注入替身。
//! 刷新成功后立即对负载做一次完整解码（即“渲染”），失败按展示错误处理。

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::blob::MemoryBlobStore;
use super::desktop::{DownloadSaver, SystemOpener, UnsupportedShare};
use super::dispatcher::DistributionDispatcher;
use super::handler::ResourceLifecycleManager;
use super::host::{BlobHost, HostBundle};
use super::loader::HttpImageFetcher;
use super::pipeline::{self, RenderedImage};
use super::share::ShareChain;
use super::{ImageConfig, ImageError, LoadState};

/// 视图渲染快照。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    pub status: &'static str,
    pub loading: bool,
    pub error_message: Option<String>,
    pub handle: Option<String>,
    pub dimensions: Option<(u32, u32)>,
    pub format: Option<String>,
    pub can_refresh: bool,
    pub can_save: bool,
    pub can_share: bool,
}

/// 桌面宿主能力集合。
///
/// # 示例
/// ```rust,no_run
/// use quote_viewer::image_handler::{desktop_hosts, ImageConfig};
///
/// let hosts = desktop_hosts(&ImageConfig::default(), std::env::temp_dir())?;
/// # Ok::<(), quote_viewer::image_handler::ImageError>(())
/// ```
pub fn desktop_hosts(config: &ImageConfig, download_dir: PathBuf) -> Result<HostBundle, ImageError> {
    Ok(HostBundle {
        fetcher: Arc::new(HttpImageFetcher::new(config)?),
        blobs: Arc::new(MemoryBlobStore::new()),
        saver: Arc::new(DownloadSaver::new(download_dir)),
        sharer: Arc::new(UnsupportedShare),
        opener: Arc::new(SystemOpener),
    })
}

/// 视图控制器状态。
pub struct QuoteViewState {
    manager: ResourceLifecycleManager,
    dispatcher: DistributionDispatcher,
    blobs: Arc<dyn BlobHost>,
    config: ImageConfig,
    rendered: Mutex<Option<(String, RenderedImage)>>,
}

impl QuoteViewState {
    /// 使用桌面宿主实现创建。
    pub fn new(config: ImageConfig, download_dir: PathBuf) -> Result<Self, ImageError> {
        let hosts = desktop_hosts(&config, download_dir)?;
        Self::with_hosts(config, hosts)
    }

    /// 使用自定义宿主能力创建，主要用于测试。
    pub fn with_hosts(config: ImageConfig, hosts: HostBundle) -> Result<Self, ImageError> {
        config.validate()?;

        let chain = ShareChain::standard(hosts.sharer, hosts.opener, &config);
        log::info!("📤 分享链：{}", chain.tier_names().join(" → "));
        let dispatcher = DistributionDispatcher::new(
            Arc::clone(&hosts.blobs),
            hosts.saver,
            chain,
            config.page_url.clone(),
        );
        let manager = ResourceLifecycleManager::new(hosts.fetcher, Arc::clone(&hosts.blobs));

        Ok(Self {
            manager,
            dispatcher,
            blobs: hosts.blobs,
            config,
            rendered: Mutex::new(None),
        })
    }

    /// 视图首次激活时自动请求一次。
    pub async fn activate(&self) -> LoadState {
        log::info!("🚀 视图激活，请求首张图片");
        self.refresh().await
    }

    /// 用户点击刷新。
    pub async fn refresh(&self) -> LoadState {
        let state = self.manager.request_new_image().await;
        self.present(state).await
    }

    /// 把就绪的图片交给视图渲染；渲染失败时切到 `Failed`。
    ///
    /// 完整解码在阻塞线程池中执行，不占用运行时线程。
    async fn present(&self, state: LoadState) -> LoadState {
        let Some(resource) = state.resource() else {
            return state;
        };

        let rendered = match self.blobs.read(&resource.handle) {
            Ok(bytes) => pipeline::decode_off_thread(bytes, self.config.clone()).await,
            Err(err) => Err(err),
        };

        match rendered {
            Ok(image) => {
                self.set_rendered(Some((resource.handle.clone(), image)));
                state
            }
            Err(err) => self.report_display_failure(&resource.handle, &err),
        }
    }

    fn set_rendered(&self, value: Option<(String, RenderedImage)>) {
        match self.rendered.lock() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    /// 视图报告渲染失败。
    pub fn report_display_failure(&self, handle: &str, error: &ImageError) -> LoadState {
        self.manager.report_display_failure(handle, error)
    }

    /// 保存当前图片。
    pub fn save(&self) {
        self.dispatcher.save(&self.manager.current_state());
    }

    /// 分享当前图片。
    pub async fn share(&self) {
        let state = self.manager.current_state();
        self.dispatcher.share(&state).await;
    }

    /// 视图永久关闭。
    pub fn teardown(&self) {
        self.manager.teardown();
        self.set_rendered(None);
    }

    pub fn state(&self) -> LoadState {
        self.manager.current_state()
    }

    /// 视图渲染快照。
    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.manager.current_state();
        let handle = state.resource().map(|resource| resource.handle.clone());

        let rendered = match self.rendered.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
        .filter(|(rendered_handle, _)| Some(rendered_handle) == handle.as_ref())
        .map(|(_, image)| image);

        let status = match &state {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Ready(_) => "ready",
            LoadState::Failed(_) => "failed",
        };

        ViewSnapshot {
            status,
            loading: state.is_loading(),
            error_message: state.error_message().map(str::to_string),
            can_refresh: !state.is_loading(),
            can_save: state.is_ready(),
            can_share: state.is_ready(),
            handle,
            dimensions: rendered.as_ref().map(|image| (image.width, image.height)),
            format: rendered.map(|image| image.format),
        }
    }
}

impl Drop for QuoteViewState {
    fn drop(&mut self) {
        self.manager.teardown();
    }
}
