//! # 命令层
//!
//! ## 设计思路
//!
//! 命令层只负责把用户输入解析为 `ViewCommand` 并转发给 `QuoteViewState`，不承载业务逻辑。
//! 每条命令执行后返回最新的 `ViewSnapshot`，由视图负责展示。

use super::service::{QuoteViewState, ViewSnapshot};
use crate::error::AppError;

/// 用户可触发的视图命令。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    Refresh,
    Save,
    Share,
    Status,
    Quit,
}

impl ViewCommand {
    /// 解析用户输入（大小写不敏感，支持单字母简写）。
    ///
    /// # 示例
    /// ```rust
    /// use quote_viewer::image_handler::ViewCommand;
    ///
    /// assert_eq!(ViewCommand::parse(" R ")?, ViewCommand::Refresh);
    /// assert_eq!(ViewCommand::parse("download")?, ViewCommand::Save);
    /// # Ok::<(), quote_viewer::error::AppError>(())
    /// ```
    pub fn parse(input: &str) -> Result<Self, AppError> {
        match input.trim().to_lowercase().as_str() {
            "r" | "refresh" | "new" => Ok(Self::Refresh),
            "d" | "s" | "save" | "download" => Ok(Self::Save),
            "h" | "share" => Ok(Self::Share),
            "" | "status" => Ok(Self::Status),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(AppError::Command(format!(
                "{}（可选：refresh / save / share / status / quit）",
                other
            ))),
        }
    }
}

/// 执行命令并返回最新快照。`Quit` 由调用方处理，这里不做任何操作。
pub async fn run_command(state: &QuoteViewState, command: ViewCommand) -> ViewSnapshot {
    match command {
        ViewCommand::Refresh => {
            state.refresh().await;
        }
        ViewCommand::Save => state.save(),
        ViewCommand::Share => state.share().await,
        ViewCommand::Status | ViewCommand::Quit => {}
    }
    state.snapshot()
}
