//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级 `AppError` 枚举，承载合成链路之外的错误（导出目录、配置文件、I/O）。
//! 合成链路内部使用 `CompositeError`，在入口层统一上转。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `CompositeError` / `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - `user_message` 把任意错误收敛为面向用户的一条提示。

use crate::compositor::{CompositeError, PROCESSING_FAILED_NOTICE};

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片合成流水线错误（加载 / 解码 / 布局 / 编码）
    #[error("{0}")]
    Composite(#[from] CompositeError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 导出目录不可用
    #[error("导出目录不可用: {0}")]
    Storage(String),

    /// 配置文件无效
    #[error("配置错误: {0}")]
    Config(String),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Composite(err) => err.user_message(),
            _ => PROCESSING_FAILED_NOTICE,
        }
    }
}
