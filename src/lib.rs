//! # 每日名言图片查看器 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  终端视图 (main.rs + view)                │
//! │                                                          │
//! │  stdin 命令 ── ViewCommand ── run_command ── render      │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ ViewSnapshot
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ image_handler  获取·句柄·渲染·保存·分享               │
//! │  │   ├─ handler     序号丢弃 + ResourceGuard (RAII)      │
//! │  │   └─ share       原生分享 → 消息应用兜底链             │
//! │  │                                                       │
//! │  ├─ settings       settings.json + 环境变量覆盖           │
//! │  └─ storage        下载目录 (返回 Result)                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`image_handler`] | 获取名言图片、管理本地句柄、保存与分享 |
//! | [`settings`] | 设置文件读写与环境变量覆盖 |
//! | [`storage`] | 下载目录的获取与自动创建 |
//! | [`view`] | 快照的文本渲染 |

pub mod error;
pub mod image_handler;
pub mod settings;
pub mod storage;
pub mod view;
