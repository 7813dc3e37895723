//! 下载目录管理模块
//!
//! # 设计思路
//!
//! 统一管理“下载图片”功能的保存路径，支持用户自定义目录，
//! 并在目录不存在时自动创建。
//!
//! # 实现思路
//!
//! - 优先使用设置中的自定义目录。
//! - 未设置时回退到系统下载目录，再回退到当前目录下的 `downloads`。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::error::AppError;

/// 下载文件名前缀。
const QUOTE_FILE_PREFIX: &str = "inspirational-quote-";

/// 下载目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 获取下载目录
///
/// # 参数
/// * `custom_dir` - 用户自定义目录（可选）
///
/// # 返回
/// - `Ok(PathBuf)` — 可用的下载目录
/// - `Err(AppError::Storage)` — 无法获取或创建目录
pub fn get_download_dir(custom_dir: Option<String>) -> Result<PathBuf, AppError> {
    if let Some(dir) = custom_dir {
        if !dir.trim().is_empty() {
            let path = PathBuf::from(&dir);
            if !path.exists() {
                fs::create_dir_all(&path).map_err(|e| {
                    AppError::Storage(format!("创建自定义目录 '{}' 失败: {}", dir, e))
                })?;
            }
            return Ok(path);
        }
    }

    if let Some(download_dir) = dirs::download_dir() {
        if download_dir.exists() {
            return Ok(download_dir);
        }
    }

    let fallback = std::env::current_dir()
        .map_err(|e| AppError::Storage(format!("获取当前目录失败: {}", e)))?
        .join("downloads");
    if !fallback.exists() {
        fs::create_dir_all(&fallback)
            .map_err(|e| AppError::Storage(format!("创建下载目录失败: {}", e)))?;
    }
    Ok(fallback)
}

/// 统计下载目录中已保存的名言图片（路径 + 占用大小 + 文件数）
pub fn download_dir_info(dir: &PathBuf) -> StorageInfo {
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let is_quote = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(QUOTE_FILE_PREFIX));
            if !is_quote {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total_size += metadata.len();
                    file_count += 1;
                }
            }
        }
    }

    StorageInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    }
}
