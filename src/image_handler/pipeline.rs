//! # 校验与展示解码模块
//!
//! ## 设计思路
//!
//! 图片字节在两个节点被检查：
//! 1. 获取成功后：通过文件签名（magic bytes）确认响应体确实是图片，否则视为解码失败
//! 2. 交给视图后：完整解码以确认可以渲染，失败即展示错误
//!
//! 完整解码前先读 header 尺寸并按像素上限快速拒绝，降低异常输入触发高内存开销的风险。

use std::io::Cursor;

use bytes::Bytes;
use image::GenericImageView;

use super::{ImageConfig, ImageError};

/// 视图渲染结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub format: String,
}

/// 通过文件签名校验响应体是图片，返回识别出的 MIME。
pub(crate) fn validate_image_signature(bytes: &[u8]) -> Result<&'static str, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Decode("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| ImageError::Decode("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(ImageError::Decode(format!(
            "响应内容不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(kind.mime_type())
}

/// 完整解码图片，确认可以渲染。
pub(crate) fn decode_for_display(
    bytes: &[u8],
    config: &ImageConfig,
) -> Result<RenderedImage, ImageError> {
    let format = image::guess_format(bytes)
        .map_err(|e| ImageError::Display(format!("不支持的图片格式：{}", e)))?;

    let (header_width, header_height) = inspect_dimensions_from_memory(bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ImageError::Display(format!("图片解码失败：{}", e)))?;
    let (width, height) = decoded.dimensions();
    validate_pixel_limits(config, width, height)?;

    log::info!("🖼️ 图片渲染成功 - 格式: {:?} 尺寸: {}x{}", format, width, height);

    Ok(RenderedImage {
        width,
        height,
        format: format!("{:?}", format),
    })
}

/// 在阻塞线程池中执行 [`decode_for_display`]。
pub(crate) async fn decode_off_thread(
    bytes: Bytes,
    config: ImageConfig,
) -> Result<RenderedImage, ImageError> {
    tokio::task::spawn_blocking(move || decode_for_display(&bytes, &config))
        .await
        .map_err(|e| ImageError::Display(format!("解码线程执行失败：{}", e)))?
}

fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Display(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| ImageError::Display(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(config: &ImageConfig, width: u32, height: u32) -> Result<(), ImageError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(ImageError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}
