//! 应用设置模块
//!
//! 设置文件位于 `<config_dir>/quote-viewer/settings.json`，内容即 `ImageConfig` 的 JSON 形式。
//! 文件不存在时使用默认值，并把默认值写入该文件供用户修改；只写部分字段时其余字段取默认值。
//! 环境变量 `QUOTE_VIEWER_ENDPOINT` / `QUOTE_VIEWER_PAGE_URL` / `QUOTE_VIEWER_DOWNLOAD_DIR`
//! 覆盖文件中的同名设置。最终配置在返回前统一校验。

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::image_handler::ImageConfig;

const APP_DIR_NAME: &str = "quote-viewer";
const SETTINGS_FILE_NAME: &str = "settings.json";

pub const ENV_ENDPOINT: &str = "QUOTE_VIEWER_ENDPOINT";
pub const ENV_PAGE_URL: &str = "QUOTE_VIEWER_PAGE_URL";
pub const ENV_DOWNLOAD_DIR: &str = "QUOTE_VIEWER_DOWNLOAD_DIR";

/// 默认设置文件路径。
pub fn settings_file_path() -> Result<PathBuf, AppError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::Settings("无法获取系统配置目录".to_string()))?;
    Ok(config_dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// 读取设置文件；文件不存在时返回 `None`。
pub fn read_settings_file(path: &Path) -> Result<Option<ImageConfig>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<ImageConfig>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

    Ok(Some(parsed))
}

/// 写入设置文件（自动创建父目录）。
pub fn write_settings_file(path: &Path, config: &ImageConfig) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Settings(format!("创建设置目录失败: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}

/// 用环境变量覆盖设置。`lookup` 便于测试注入。
pub fn apply_env_overrides<F>(config: &mut ImageConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
        log::info!("⚙️ 使用环境变量中的图片接口地址");
        config.endpoint = endpoint;
    }
    if let Some(page_url) = non_empty(ENV_PAGE_URL) {
        config.page_url = page_url;
    }
    if let Some(download_dir) = non_empty(ENV_DOWNLOAD_DIR) {
        config.download_dir = Some(download_dir);
    }
}

/// 加载最终生效的设置。
///
/// `path` 为空时使用默认设置文件路径。
pub fn load_settings(path: Option<PathBuf>) -> Result<ImageConfig, AppError> {
    let path = match path {
        Some(path) => path,
        None => settings_file_path()?,
    };

    let mut config = match read_settings_file(&path)? {
        Some(config) => {
            log::info!("⚙️ 已加载设置文件：{}", path.display());
            config
        }
        None => {
            log::info!("⚙️ 未找到设置文件，使用默认设置：{}", path.display());
            let defaults = ImageConfig::default();
            if let Err(err) = write_settings_file(&path, &defaults) {
                log::warn!("⚠️ 写入默认设置文件失败，继续使用默认设置：{}", err);
            }
            defaults
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
