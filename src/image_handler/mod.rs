//! # 图片获取与分发模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“远端获取 → 本地句柄 → 渲染校验 → 保存/分享 → 命令暴露”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `commands`：用户输入解析与转发（薄封装）
//! - `service`：视图控制器状态（`QuoteViewState`）
//! - `handler`：资源生命周期管理（序号丢弃 + 句柄释放）
//! - `dispatcher`：保存与分享调度
//! - `share`：分享兜底链
//! - `loader`：HTTP 获取
//! - `pipeline`：签名校验与渲染解码
//! - `blob`：内存句柄存储
//! - `desktop`：桌面宿主实现（保存 / 打开链接 / 无原生分享）
//! - `host`：宿主原语 trait
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 用户输入
//!    ↓
//! commands.rs（解析命令）
//!    ↓
//! service.rs（QuoteViewState，显式状态对象）
//!    ├─ handler.rs（request_new_image / teardown）
//!    │    ├─ loader.rs（GET endpoint?t=令牌）
//!    │    ├─ pipeline.rs（签名校验）
//!    │    └─ blob.rs（分配 / 释放句柄）
//!    ├─ pipeline.rs（渲染解码，失败 → Failed("Image failed to load")）
//!    └─ dispatcher.rs（save / share）
//!         └─ share.rs（原生分享 → 消息应用兜底）
//!    ↓
//! ViewSnapshot 交给视图展示
//! ```

mod blob;
pub mod commands;
mod config;
mod desktop;
mod dispatcher;
mod error;
mod handler;
mod host;
mod loader;
mod pipeline;
mod service;
mod share;
mod source;
#[cfg(test)]
mod testing;

pub use blob::MemoryBlobStore;
pub use commands::{ViewCommand, run_command};
pub use config::{DEFAULT_ENDPOINT, DEFAULT_PAGE_URL, ImageConfig};
pub use desktop::{DownloadSaver, SystemOpener, UnsupportedShare};
pub use dispatcher::DistributionDispatcher;
pub use error::{DISPLAY_FAILED_MESSAGE, FETCH_FAILED_MESSAGE, ImageError};
pub use handler::ResourceLifecycleManager;
pub use host::{BlobHost, ExternalOpener, HostBundle, ImageFetcher, SaveHost, SharePayload, ShareHost};
pub use loader::HttpImageFetcher;
pub use pipeline::RenderedImage;
pub use service::{QuoteViewState, ViewSnapshot, desktop_hosts};
pub use share::{MessagingDeepLink, NativeFileShare, ShareChain, ShareRequest, ShareStrategy};
pub use source::{
    FetchAttempt, ImageResource, JPEG_MIME, LoadState, MonotonicClock, SHARE_FILE_NAME, SaveRequest,
    ShareFile, download_file_name,
};
