//! # 宿主原语（端口定义）
//!
//! ## 设计思路
//!
//! 获取、句柄、保存、分享、外部打开这几类能力由宿主平台提供，核心逻辑只负责编排。
//! 每类能力定义为一个 trait，桌面实现位于 `desktop`/`loader`/`blob`，测试使用替身实现。
//!
//! 所有端口要求 `Send + Sync`，以便以 `Arc<dyn ...>` 在管理器与分发器之间共享。

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use super::ImageError;
use super::source::{SaveRequest, ShareFile};

/// 远端图片获取。
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// 以防缓存令牌发起一次请求，返回响应体字节。
    ///
    /// 网络错误、非 2xx 状态、响应体读取失败统一返回 `ImageError::Fetch`。
    async fn fetch(&self, token: i64) -> Result<Bytes, ImageError>;
}

/// 本地句柄的分配、读取与释放。
pub trait BlobHost: Send + Sync {
    /// 为负载分配新句柄。
    fn create(&self, payload: Bytes, mime_type: &'static str) -> Result<String, ImageError>;

    /// 通过句柄重新读取负载。句柄已释放时返回 `ImageError::Blob`。
    fn read(&self, handle: &str) -> Result<Bytes, ImageError>;

    /// 释放句柄，返回句柄在释放前是否存在。
    fn revoke(&self, handle: &str) -> bool;
}

/// “另存为”原语。宿主不回报用户取消。
pub trait SaveHost: Send + Sync {
    fn save_as(&self, request: SaveRequest) -> Result<(), ImageError>;
}

/// 原生分享负载。
#[derive(Debug, Clone)]
pub struct SharePayload {
    pub files: Vec<ShareFile>,
    pub title: String,
    pub text: String,
}

/// 原生分享面板。
#[async_trait]
pub trait ShareHost: Send + Sync {
    /// 宿主是否具备文件分享能力。
    fn supports_file_share(&self) -> bool;

    /// 宿主是否认为该负载可分享。
    fn can_share(&self, payload: &SharePayload) -> bool;

    /// 调起分享；用户取消或宿主拒绝时返回错误。
    async fn share(&self, payload: SharePayload) -> Result<(), ImageError>;
}

/// 在新的浏览上下文中打开外部 URI（应用深链）。
pub trait ExternalOpener: Send + Sync {
    fn open_in_new_context(&self, uri: &str) -> Result<(), ImageError>;
}

/// 宿主能力集合。
#[derive(Clone)]
pub struct HostBundle {
    pub fetcher: Arc<dyn ImageFetcher>,
    pub blobs: Arc<dyn BlobHost>,
    pub saver: Arc<dyn SaveHost>,
    pub sharer: Arc<dyn ShareHost>,
    pub opener: Arc<dyn ExternalOpener>,
}
