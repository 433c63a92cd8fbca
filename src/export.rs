//! 导出目标管理模块
//!
//! # 设计思路
//!
//! 浏览器版本通过临时下载链接触发“另存为”；这里抽象为 `ArtifactSink`，
//! 合成链路只产出字节与文件名，落盘方式由导出目标决定。
//!
//! # 实现思路
//!
//! - `DirectorySink` 把导出物写入指定目录，目录不存在时自动 `create_dir_all`。
//! - 未指定目录时回退到当前工作目录。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::compositor::OutputArtifact;
use crate::error::AppError;

/// 导出目标（下载 / 另存为）。
pub trait ArtifactSink {
    /// 交付导出物，返回最终落盘位置。
    fn deliver(&mut self, artifact: &OutputArtifact) -> Result<PathBuf, AppError>;
}

/// 写入本地目录的导出目标。
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&mut self, artifact: &OutputArtifact) -> Result<PathBuf, AppError> {
        // 导出文件只能落在目标目录本身
        let mut components = Path::new(&artifact.file_name).components();
        let single_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_name || artifact.file_name.contains(['/', '\\']) {
            return Err(AppError::Storage(format!(
                "导出文件名不合法：{}",
                artifact.file_name
            )));
        }

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                AppError::Storage(format!("创建导出目录 '{}' 失败: {}", self.dir.display(), e))
            })?;
        }

        let path = self.dir.join(&artifact.file_name);
        fs::write(&path, &artifact.bytes)?;

        log::info!("💾 已导出合成图片：{}（{} bytes）", path.display(), artifact.bytes.len());
        Ok(path)
    }
}

/// 解析导出目录
///
/// # 参数
/// * `custom_dir` - 用户指定目录（可选）
///
/// # 返回
/// - `Ok(PathBuf)`：可用的导出目录（尚未存在时由 `DirectorySink` 创建）
/// - `Err(AppError::Storage)`：无法获取当前工作目录
pub fn resolve_output_dir(custom_dir: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(dir) = custom_dir {
        if !dir.as_os_str().is_empty() {
            return Ok(dir);
        }
    }

    std::env::current_dir()
        .map_err(|e| AppError::Storage(format!("获取当前工作目录失败: {}", e)))
}
