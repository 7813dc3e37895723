//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图片链路（获取 → 句柄 → 展示 → 分发）中的所有错误来源，
//! 避免字符串拼接式错误处理。通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! ## 用户可见文案
//!
//! 内部错误信息只进日志；视图上只展示 [`ImageError::user_message`] 给出的固定文案。
//! `Fetch` / `Decode` / `ResourceLimit` 对用户而言没有区别，统一为获取失败。

/// 获取失败时展示给用户的文案。
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch image";
/// 图片交给视图后渲染失败时展示给用户的文案。
pub const DISPLAY_FAILED_MESSAGE: &str = "Image failed to load";

/// 图片处理统一错误类型。
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImageError {
    #[error("网络错误：{0}")]
    Fetch(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("展示错误：{0}")]
    Display(String),

    #[error("分享层级失败：{0}")]
    ShareTier(String),

    #[error("保存失败：{0}")]
    Save(String),

    #[error("本地句柄错误：{0}")]
    Blob(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("配置错误：{0}")]
    InvalidConfig(String),
}

impl ImageError {
    /// 稳定错误码，供视图快照与日志检索使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "E_FETCH",
            Self::Decode(_) => "E_DECODE",
            Self::Display(_) => "E_DISPLAY",
            Self::ShareTier(_) => "E_SHARE_TIER",
            Self::Save(_) => "E_SAVE",
            Self::Blob(_) => "E_BLOB",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::InvalidConfig(_) => "E_CONFIG",
        }
    }

    /// 出错阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::Display(_) => "display",
            Self::ShareTier(_) => "share",
            Self::Save(_) => "save",
            Self::Blob(_) => "blob",
            Self::InvalidConfig(_) => "config",
        }
    }

    /// 写入 `LoadState::Failed` 的用户可见文案。
    pub fn user_message(&self) -> String {
        match self {
            Self::Display(_) => DISPLAY_FAILED_MESSAGE.to_string(),
            _ => FETCH_FAILED_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_and_decode_share_the_same_user_message() {
        let fetch = ImageError::Fetch("HTTP 500".into());
        let decode = ImageError::Decode("not an image".into());
        let limit = ImageError::ResourceLimit("too large".into());

        assert_eq!(fetch.user_message(), FETCH_FAILED_MESSAGE);
        assert_eq!(decode.user_message(), FETCH_FAILED_MESSAGE);
        assert_eq!(limit.user_message(), FETCH_FAILED_MESSAGE);
    }

    #[test]
    fn display_error_has_its_own_message_and_stage() {
        let err = ImageError::Display("bad jpeg".into());
        assert_eq!(err.user_message(), DISPLAY_FAILED_MESSAGE);
        assert_eq!(err.stage(), "display");
        assert_eq!(err.code(), "E_DISPLAY");
    }
}
