//! # 远端获取模块
//!
//! ## 设计思路
//!
//! 负责从图片接口拉取原始字节，是 `ImageFetcher` 的桌面实现。
//! 每次请求在查询串追加 `t=<令牌>`，保证服务端与中间缓存都视为不同请求；客户端不做任何缓存。
//!
//! ## 实现思路
//!
//! - 复用单个 `reqwest::Client`，连接/总超时取自配置。
//! - 非 2xx 状态、网络错误、响应体读取失败统一映射为 `ImageError::Fetch`，不解析错误响应体。
//! - 流式读取响应体并按 `max_file_size` 截断，避免一次性读入导致内存峰值过高。
//! - 日志中的 URL 去掉查询串与片段。

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

use super::host::ImageFetcher;
use super::{ImageConfig, ImageError};

const BUFFER_INITIAL_CAPACITY: usize = 64 * 1024;

/// 基于 reqwest 的图片接口客户端。
pub struct HttpImageFetcher {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    max_file_size: u64,
    request_timeout: u64,
}

impl HttpImageFetcher {
    /// 根据配置创建客户端。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use quote_viewer::image_handler::{HttpImageFetcher, ImageConfig};
    ///
    /// let fetcher = HttpImageFetcher::new(&ImageConfig::default())?;
    /// # Ok::<(), quote_viewer::image_handler::ImageError>(())
    /// ```
    pub fn new(config: &ImageConfig) -> Result<Self, ImageError> {
        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| ImageError::InvalidConfig(format!("endpoint 格式错误：{}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .build()
            .map_err(|e| ImageError::Fetch(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self {
            client,
            endpoint,
            max_file_size: config.max_file_size,
            request_timeout: config.request_timeout,
        })
    }

    /// 拼接带防缓存令牌的请求地址。
    pub(crate) fn request_url(&self, token: i64) -> reqwest::Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("t", &token.to_string());
        url
    }

    async fn read_body_with_limit(
        &self,
        mut response: reqwest::Response,
        url: &str,
    ) -> Result<Bytes, ImageError> {
        let capacity = response
            .content_length()
            .map(|len| len.min(self.max_file_size) as usize)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = BytesMut::with_capacity(capacity);

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?
        {
            if (buffer.len() + chunk.len()) as u64 > self.max_file_size {
                return Err(ImageError::ResourceLimit(format!(
                    "响应体超过上限：{:.2} MB",
                    self.max_file_size as f64 / 1024.0 / 1024.0
                )));
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(buffer.freeze())
    }

    /// 统一映射 reqwest 错误到业务错误。
    fn map_reqwest_error(&self, e: reqwest::Error, url: &str) -> ImageError {
        let err_msg = e.to_string().replace(url, &Self::redact_url_for_log(url));

        if e.is_timeout() {
            ImageError::Fetch(format!("请求超时（{}秒）", self.request_timeout))
        } else if e.is_connect() {
            ImageError::Fetch(format!("无法连接：{}", err_msg))
        } else {
            ImageError::Fetch(format!("请求失败：{}", err_msg))
        }
    }

    fn redact_url_for_log(url: &str) -> String {
        let Ok(parsed) = reqwest::Url::parse(url) else {
            return "<invalid-url>".to_string();
        };

        let host = parsed.host_str().unwrap_or("<unknown-host>");
        let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

        format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
    }

    fn status_message(code: u16) -> &'static str {
        match code {
            404 => "未找到",
            403 => "访问被拒绝",
            429 => "请求过于频繁",
            500..=599 => "服务器错误",
            _ => "请求失败",
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, token: i64) -> Result<Bytes, ImageError> {
        let url = self.request_url(token);
        let url_text = url.to_string();
        log::info!("🌐 请求新图片 - URL: {} t={}", Self::redact_url_for_log(&url_text), token);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "image/*,*/*;q=0.8")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, &url_text))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Fetch(format!(
                "HTTP {} {}",
                status.as_u16(),
                Self::status_message(status.as_u16())
            )));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_file_size {
                return Err(ImageError::ResourceLimit(format!(
                    "响应体过大：{:.2} MB（限制：{:.2} MB）",
                    len as f64 / 1024.0 / 1024.0,
                    self.max_file_size as f64 / 1024.0 / 1024.0
                )));
            }
        }

        let bytes = self.read_body_with_limit(response, &url_text).await?;
        log::debug!("📦 响应体读取完成：{} 字节", bytes.len());
        Ok(bytes)
    }
}
