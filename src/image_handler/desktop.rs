//! # 桌面宿主实现
//!
//! - `DownloadSaver`：把负载写入下载目录，同名文件不覆盖，追加 ` (n)` 后缀
//! - `SystemOpener`：用系统默认程序打开应用深链（`xdg-open` / `open` / `cmd /C start`）
//! - `UnsupportedShare`：桌面端没有原生分享面板，能力探测恒为 `false`

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::ImageError;
use super::host::{ExternalOpener, SaveHost, SharePayload, ShareHost};
use super::source::SaveRequest;

const MAX_NAME_SUFFIX: u32 = 999;

/// 下载目录保存器。
pub struct DownloadSaver {
    dir: PathBuf,
}

impl DownloadSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 找到目录中不冲突的文件路径。
    fn available_path(&self, file_name: &str) -> Result<PathBuf, ImageError> {
        let candidate = self.dir.join(file_name);
        if !candidate.exists() {
            return Ok(candidate);
        }

        let path = Path::new(file_name);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("download");
        let ext = path.extension().and_then(|s| s.to_str());

        for n in 1..=MAX_NAME_SUFFIX {
            let name = match ext {
                Some(ext) => format!("{} ({}).{}", stem, n, ext),
                None => format!("{} ({})", stem, n),
            };
            let candidate = self.dir.join(name);
            if !candidate.exists() {
                return Ok(candidate);
            }
        }

        Err(ImageError::Save(format!("同名文件过多：{}", file_name)))
    }
}

impl SaveHost for DownloadSaver {
    fn save_as(&self, request: SaveRequest) -> Result<(), ImageError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ImageError::Save(format!("创建下载目录失败：{}", e)))?;

        let target = self.available_path(&request.file_name)?;
        fs::write(&target, &request.bytes)
            .map_err(|e| ImageError::Save(format!("写入文件失败：{}", e)))?;

        log::info!(
            "💾 已保存 {} -> {}（{} 字节）",
            request.handle,
            target.display(),
            request.bytes.len()
        );
        Ok(())
    }
}

/// 系统默认程序打开器。
#[derive(Debug, Default)]
pub struct SystemOpener;

impl ExternalOpener for SystemOpener {
    #[cfg(target_os = "windows")]
    fn open_in_new_context(&self, uri: &str) -> Result<(), ImageError> {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", uri])
            .spawn()
            .map_err(|e| ImageError::ShareTier(format!("打开链接失败：{}", e)))?;
        Ok(())
    }

    #[cfg(target_os = "macos")]
    fn open_in_new_context(&self, uri: &str) -> Result<(), ImageError> {
        std::process::Command::new("open")
            .arg(uri)
            .spawn()
            .map_err(|e| ImageError::ShareTier(format!("打开链接失败：{}", e)))?;
        Ok(())
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    fn open_in_new_context(&self, uri: &str) -> Result<(), ImageError> {
        std::process::Command::new("xdg-open")
            .arg(uri)
            .spawn()
            .map_err(|e| ImageError::ShareTier(format!("打开链接失败：{}", e)))?;
        Ok(())
    }
}

/// 不支持原生分享的宿主。
#[derive(Debug, Default)]
pub struct UnsupportedShare;

#[async_trait]
impl ShareHost for UnsupportedShare {
    fn supports_file_share(&self) -> bool {
        false
    }

    fn can_share(&self, _payload: &SharePayload) -> bool {
        false
    }

    async fn share(&self, _payload: SharePayload) -> Result<(), ImageError> {
        Err(ImageError::ShareTier("当前平台不支持原生分享".to_string()))
    }
}
