//! 终端视图
//!
//! 把 `ViewSnapshot` 渲染为纯文本界面。界面文案保持英文，与分享文案一致。

use crate::image_handler::ViewSnapshot;
use crate::storage::StorageInfo;

pub const TITLE: &str = "Inspirational Quotes";
pub const LOADING_TEXT: &str = "Loading your inspiration...";

const REFRESH_LABEL: &str = "New Quote";
const SAVE_LABEL: &str = "Download Image";
const SHARE_LABEL: &str = "Share";

fn button(label: &str, key: &str, enabled: bool) -> String {
    if enabled {
        format!("[{}] {}", key, label)
    } else {
        format!("[-] {} (disabled)", label)
    }
}

/// 渲染快照。
pub fn render(snapshot: &ViewSnapshot) -> String {
    let mut lines = vec![TITLE.to_string(), "=".repeat(TITLE.len())];

    if snapshot.loading {
        lines.push(LOADING_TEXT.to_string());
    } else if let Some(message) = &snapshot.error_message {
        lines.push(format!("Error: {}", message));
    } else if let Some(handle) = &snapshot.handle {
        match (snapshot.dimensions, &snapshot.format) {
            (Some((width, height)), Some(format)) => {
                lines.push(format!("Quote image {}x{} {} ({})", width, height, format, handle))
            }
            (Some((width, height)), None) => lines.push(format!("Quote image {}x{} ({})", width, height, handle)),
            _ => lines.push(format!("Quote image ({})", handle)),
        }
    }

    lines.push(String::new());
    lines.push(
        [
            button(REFRESH_LABEL, "r", snapshot.can_refresh),
            button(SAVE_LABEL, "d", snapshot.can_save),
            button(SHARE_LABEL, "h", snapshot.can_share),
        ]
        .join("  "),
    );
    lines.push("[q] Quit".to_string());

    lines.join("\n")
}

/// 渲染下载目录信息。
pub fn render_storage(info: &StorageInfo) -> String {
    format!(
        "Downloads: {} ({} saved, {} bytes)",
        info.path, info.file_count, info.total_size
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ViewSnapshot {
        ViewSnapshot {
            status: "idle",
            loading: false,
            error_message: None,
            handle: None,
            dimensions: None,
            format: None,
            can_refresh: true,
            can_save: false,
            can_share: false,
        }
    }

    #[test]
    fn loading_shows_loading_text_only() {
        let view = render(&ViewSnapshot {
            status: "loading",
            loading: true,
            can_refresh: false,
            ..snapshot()
        });

        assert!(view.starts_with(TITLE));
        assert!(view.contains(LOADING_TEXT));
        assert!(view.contains("[-] New Quote (disabled)"));
    }

    #[test]
    fn failure_shows_error_and_disables_distribution() {
        let view = render(&ViewSnapshot {
            status: "failed",
            error_message: Some("Failed to fetch image".to_string()),
            ..snapshot()
        });

        assert!(view.contains("Error: Failed to fetch image"));
        assert!(view.contains("[r] New Quote"));
        assert!(view.contains("[-] Download Image (disabled)"));
        assert!(view.contains("[-] Share (disabled)"));
    }

    #[test]
    fn ready_shows_dimensions_and_enabled_buttons() {
        let view = render(&ViewSnapshot {
            status: "ready",
            handle: Some("blob:quote-viewer/1".to_string()),
            dimensions: Some((640, 480)),
            format: Some("Jpeg".to_string()),
            can_save: true,
            can_share: true,
            ..snapshot()
        });

        assert!(view.contains("Quote image 640x480 Jpeg (blob:quote-viewer/1)"));
        assert!(view.contains("[d] Download Image"));
        assert!(view.contains("[h] Share"));
    }
}
