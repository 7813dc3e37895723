//! # 分享兜底链
//!
//! ## 设计思路
//!
//! 同一个“分享”意图有多种实现方式，按顺序逐个尝试，只有当前方式失败时才进入下一层，
//! 任一层成功即结束。每一层实现 `ShareStrategy`，各自包在独立的失败边界中，
//! 增删层级只需调整 `ShareChain` 中的列表。
//!
//! 默认链：
//! 1. `NativeFileShare`：宿主支持文件分享且认为文件可分享时调起原生分享
//! 2. `MessagingDeepLink`：在新上下文打开消息应用深链（终端兜底）
//!
//! 文件对象在进入链之前由分发器生成；生成失败时 `file` 为 `None`，
//! 原生分享层直接失败，等价于跳到消息应用兜底。

use std::sync::Arc;

use async_trait::async_trait;

use super::host::{ExternalOpener, SharePayload, ShareHost};
use super::source::ShareFile;
use super::{ImageConfig, ImageError};

/// 一次分享请求的上下文。
#[derive(Debug, Clone)]
pub struct ShareRequest {
    /// 由本地句柄重新读取生成的文件；读取失败时为 `None`。
    pub file: Option<ShareFile>,
    /// 当前页面地址。
    pub page_url: String,
}

/// 兜底链中的一层。
#[async_trait]
pub trait ShareStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// 尝试分享；返回错误即进入下一层。
    async fn attempt(&self, request: &ShareRequest) -> Result<(), ImageError>;
}

/// 有序分享兜底链。
pub struct ShareChain {
    tiers: Vec<Box<dyn ShareStrategy>>,
}

impl ShareChain {
    pub fn new(tiers: Vec<Box<dyn ShareStrategy>>) -> Self {
        Self { tiers }
    }

    /// 默认链：原生文件分享 → 消息应用深链。
    pub fn standard(
        sharer: Arc<dyn ShareHost>,
        opener: Arc<dyn ExternalOpener>,
        config: &ImageConfig,
    ) -> Self {
        Self::new(vec![
            Box::new(NativeFileShare {
                host: sharer,
                title: config.share_title.clone(),
                text: config.share_text.clone(),
            }),
            Box::new(MessagingDeepLink {
                opener,
                base_uri: config.messaging_base_uri.clone(),
                text: config.share_text.clone(),
            }),
        ])
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|tier| tier.name()).collect()
    }

    /// 依次尝试各层，返回成功的层名；全部失败返回 `None`。
    pub async fn run(&self, request: &ShareRequest) -> Option<&'static str> {
        for (idx, tier) in self.tiers.iter().enumerate() {
            match tier.attempt(request).await {
                Ok(()) => {
                    log::info!("📤 分享完成 - 第 {} 层（{}）", idx + 1, tier.name());
                    return Some(tier.name());
                }
                Err(err) => {
                    log::warn!(
                        "⚠️ 分享第 {} 层（{}）失败，尝试下一层：{}",
                        idx + 1,
                        tier.name(),
                        err
                    );
                }
            }
        }

        log::error!("❌ 所有分享方式均失败");
        None
    }
}

/// 原生文件分享。
pub struct NativeFileShare {
    host: Arc<dyn ShareHost>,
    title: String,
    text: String,
}

#[async_trait]
impl ShareStrategy for NativeFileShare {
    fn name(&self) -> &'static str {
        "native-file-share"
    }

    async fn attempt(&self, request: &ShareRequest) -> Result<(), ImageError> {
        let file = request
            .file
            .as_ref()
            .ok_or_else(|| ImageError::ShareTier("没有可分享的文件".to_string()))?;

        if !self.host.supports_file_share() {
            return Err(ImageError::ShareTier("宿主不支持原生文件分享".to_string()));
        }

        let payload = SharePayload {
            files: vec![file.clone()],
            title: self.title.clone(),
            text: self.text.clone(),
        };
        if !self.host.can_share(&payload) {
            return Err(ImageError::ShareTier(format!("宿主拒绝分享该文件：{}", file.name)));
        }

        self.host.share(payload).await.map_err(|err| match err {
            ImageError::ShareTier(_) => err,
            other => ImageError::ShareTier(other.to_string()),
        })
    }
}

/// 消息应用深链兜底。
pub struct MessagingDeepLink {
    opener: Arc<dyn ExternalOpener>,
    base_uri: String,
    text: String,
}

impl MessagingDeepLink {
    /// 拼接 `<base>?text=<推广文案> <页面地址>`，空格编码为 `%20`。
    ///
    /// 表单编码会把空格写成 `+`，部分消息客户端会原样显示。
    /// 表单编码中字面量 `+` 已转义为 `%2B`，所以剩余的 `+` 都是空格。
    pub(crate) fn build_uri(base_uri: &str, text: &str, page_url: &str) -> Result<String, ImageError> {
        let message = format!("{} {}", text, page_url);
        let mut url = reqwest::Url::parse_with_params(base_uri, &[("text", message.as_str())])
            .map_err(|e| ImageError::ShareTier(format!("消息应用链接格式错误：{}", e)))?;

        let query = url.query().map(|query| query.replace('+', "%20"));
        url.set_query(query.as_deref());
        Ok(url.to_string())
    }
}

#[async_trait]
impl ShareStrategy for MessagingDeepLink {
    fn name(&self) -> &'static str {
        "messaging-deep-link"
    }

    async fn attempt(&self, request: &ShareRequest) -> Result<(), ImageError> {
        let uri = Self::build_uri(&self.base_uri, &self.text, &request.page_url)?;
        log::info!("💬 打开消息应用兜底分享");
        self.opener.open_in_new_context(&uri)
    }
}
