//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ImageConfig`，保证运行时行为可观测、可调整、可测试。
//! 配置在服务创建时确定，单次请求内不会漂移。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置（远端接口地址、超时、体积与像素上限、分享文案）。
//! - `validate` 对数值区间做校验，超出范围返回 `ImageError::InvalidConfig`。

use serde::{Deserialize, Serialize};

use super::ImageError;

/// 默认图片接口地址。
pub const DEFAULT_ENDPOINT: &str =
    "https://myproxy1.netlify.app/.netlify/functions/zenquotes-proxy";
/// 默认页面地址（消息应用兜底分享时附带）。
pub const DEFAULT_PAGE_URL: &str = "https://myproxy1.netlify.app/";

/// 图片获取与分发配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// 图片接口地址，请求时追加 `?t=<毫秒时间戳>`。
    pub endpoint: String,
    /// 当前页面地址。
    pub page_url: String,
    /// 建立连接（TCP/TLS）超时时间（秒）。
    pub connect_timeout: u64,
    /// 单次请求总超时时间（秒）。
    pub request_timeout: u64,
    /// 响应体允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 展示解码时的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 原生分享标题。
    pub share_title: String,
    /// 原生分享正文，同时作为消息应用兜底的推广文案。
    pub share_text: String,
    /// 消息应用深链前缀。
    pub messaging_base_uri: String,
    /// 下载目录（为空时使用系统下载目录）。
    pub download_dir: Option<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_url: DEFAULT_PAGE_URL.to_string(),
            connect_timeout: 8,
            request_timeout: 30,
            max_file_size: 20 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            share_title: "Inspirational Quote".to_string(),
            share_text: "Check out this inspirational quote!".to_string(),
            messaging_base_uri: "whatsapp://send".to_string(),
            download_dir: None,
        }
    }
}

impl ImageConfig {
    /// 校验配置区间。
    pub fn validate(&self) -> Result<(), ImageError> {
        let endpoint = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ImageError::InvalidConfig(format!("endpoint 格式错误：{}", e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ImageError::InvalidConfig(format!(
                "endpoint 仅支持 http/https：{}",
                endpoint.scheme()
            )));
        }
        if !(1..=120).contains(&self.connect_timeout) {
            return Err(ImageError::InvalidConfig("connect_timeout 必须在 1~120 秒之间".to_string()));
        }
        if !(1..=600).contains(&self.request_timeout) {
            return Err(ImageError::InvalidConfig("request_timeout 必须在 1~600 秒之间".to_string()));
        }
        if self.connect_timeout > self.request_timeout {
            return Err(ImageError::InvalidConfig(
                "connect_timeout 不能大于 request_timeout".to_string(),
            ));
        }
        if self.max_file_size < 1024 {
            return Err(ImageError::InvalidConfig("max_file_size 不能小于 1KB".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(ImageError::InvalidConfig("max_decoded_pixels 不能为 0".to_string()));
        }
        if self.messaging_base_uri.trim().is_empty() {
            return Err(ImageError::InvalidConfig("messaging_base_uri 不能为空".to_string()));
        }
        Ok(())
    }
}
