//! # 照片签名合成工具：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  入口 (CLI: photo-sign)                   │
//! │                                                          │
//! │  photo 路径 ── signature 路径 ── --placement ── --out-dir │
//! │       │  (参数解析 + 日志初始化 + tokio 运行时)          │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ CompositeSession / ActionOutcome
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            库 (Rust)                             │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ compositor ─ 加载·解码·布局·渲染·JPEG 编码           │
//! │  │   ├─ layout         纯几何计算                        │
//! │  │   └─ render         描边 / 照片 / 分隔条 / 签名       │
//! │  │                                                       │
//! │  └─ export            导出目标 (ArtifactSink)            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，入口层与导出层的返回类型 |
//! | [`compositor`] | 照片 + 签名合成：会话、加载、解码、布局、渲染、编码 |
//! | [`export`] | 导出目标抽象与目录写出 |

pub mod compositor;
pub mod error;
pub mod export;
