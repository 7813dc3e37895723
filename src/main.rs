//! # 每日名言图片查看器 — 应用入口
//!
//! 本文件仅负责初始化日志、加载设置并驱动命令循环。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。
//!
//! 用法：`quote-viewer [settings.json 路径]`

use std::path::PathBuf;

use quote_viewer::error::AppError;
use quote_viewer::image_handler::{QuoteViewState, ViewCommand, run_command};
use quote_viewer::{settings, storage, view};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("❌ 应用启动失败: {err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let config = settings::load_settings(settings_path)?;
    let download_dir = storage::get_download_dir(config.download_dir.clone())?;
    log::info!("📁 下载目录：{}", download_dir.display());

    let state = QuoteViewState::new(config, download_dir.clone())?;
    state.activate().await;
    println!("{}\n", view::render(&state.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match ViewCommand::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}\n");
                continue;
            }
        };

        if command == ViewCommand::Quit {
            break;
        }

        let snapshot = run_command(&state, command).await;
        println!("{}", view::render(&snapshot));
        if command == ViewCommand::Status {
            println!("{}", view::render_storage(&storage::download_dir_info(&download_dir)));
        }
        println!();
    }

    state.teardown();
    log::info!("👋 已退出");
    Ok(())
}
