//! # 服务层
//!
//! ## 设计思路
//!
//! 使用 `CompositeService` 作为入口层持有的服务实例，替代脚本里的全局状态与事件回调。
//! 好处：
//! 1. 生命周期清晰（由 `main.rs` 统一创建）
//! 2. 测试可创建独立实例，减少共享状态副作用
//! 3. 导出目标通过 `ArtifactSink` 注入，测试时可替换为内存实现
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `load_slot_from_path` / `load_slot_from_base64`：文件选择 → 输入槽
//! - `process`：执行完整合成链路
//! - `run_action`：合成 + 导出 + 把所有失败收敛为一条用户提示
//! - `set_placement` / `get_placement`：按字符串切换或读取摆放策略
//! - `use_placement`：切换到已解析的 `Placement`

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::export::ArtifactSink;

use super::source::{InputSlot, OutputArtifact};
use super::{
    CompositeError, CompositeHandler, CompositeSession, ExportConfig, LayoutOverrides,
    LayoutParameters, Placement,
};

/// 单次用户操作的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// 合成并导出成功。
    Exported { path: PathBuf, file_name: String },
    /// 操作被拒绝或失败，附带唯一一条用户提示。
    Notice(&'static str),
}

/// 图片合成服务。
pub struct CompositeService {
    handler: CompositeHandler,
}

impl CompositeService {
    /// 使用默认布局（`stacked-with-border`）与默认导出配置创建服务。
    pub fn new() -> Self {
        Self::with_config(LayoutParameters::default(), ExportConfig::default())
    }

    /// 使用自定义配置创建服务。
    ///
    /// 主要用于测试或按场景注入不同策略。
    pub fn with_config(layout: LayoutParameters, export: ExportConfig) -> Self {
        Self {
            handler: CompositeHandler::new(layout, export),
        }
    }

    /// 从本地路径读取一个输入槽（文件名取路径最后一段）。
    pub fn load_slot_from_path(&self, path: &Path) -> Result<InputSlot, CompositeError> {
        let file_name = InputSlot::file_name_of(path)?;
        let raw = self.handler.load_from_file(path, self.handler.export_config())?;
        Ok(InputSlot::from_raw(file_name, raw))
    }

    /// 从 Base64 / Data URL 读取一个输入槽。
    pub fn load_slot_from_base64(
        &self,
        file_name: &str,
        data: &str,
    ) -> Result<InputSlot, CompositeError> {
        let raw = self.handler.load_from_base64(data, self.handler.export_config())?;
        Ok(InputSlot::from_raw(file_name, raw))
    }

    /// 执行完整合成流程：解码 → 布局 → 渲染 → 编码。
    pub async fn process(&self, session: &CompositeSession) -> Result<OutputArtifact, CompositeError> {
        self.handler.compose(session).await
    }

    /// 合成后交给导出目标。
    pub async fn process_and_export(
        &self,
        session: &CompositeSession,
        sink: &mut dyn ArtifactSink,
    ) -> Result<(PathBuf, OutputArtifact), AppError> {
        let artifact = self.process(session).await?;
        let path = sink.deliver(&artifact)?;
        Ok((path, artifact))
    }

    /// 顶层操作入口：所有失败都在这里记录详细日志，并收敛为一条用户提示。
    ///
    /// 缺少输入时不会触碰导出目标。
    pub async fn run_action(
        &self,
        session: &CompositeSession,
        sink: &mut dyn ArtifactSink,
    ) -> ActionOutcome {
        match self.process_and_export(session, sink).await {
            Ok((path, artifact)) => ActionOutcome::Exported {
                path,
                file_name: artifact.file_name,
            },
            Err(err) => {
                match &err {
                    AppError::Composite(CompositeError::MissingInput(reason)) => {
                        log::warn!("⚠️ 合成请求被拒绝：{}", reason);
                    }
                    AppError::Composite(inner) => {
                        log::error!(
                            "❌ 合成失败 [{}@{}]：{}",
                            inner.code(),
                            inner.stage(),
                            inner
                        );
                    }
                    other => log::error!("❌ 合成失败：{}", other),
                }
                ActionOutcome::Notice(err.user_message())
            }
        }
    }

    /// 按字符串切换摆放策略。
    ///
    /// # 示例
    /// ```rust
    /// use photo_signature_merge::compositor::CompositeService;
    ///
    /// let service = CompositeService::new();
    /// service.set_placement("overlay-bottom-of-photo")?;
    /// assert_eq!(service.get_placement()?, "overlay-bottom-of-photo");
    /// # Ok::<(), photo_signature_merge::compositor::CompositeError>(())
    /// ```
    pub fn set_placement(&self, placement: &str) -> Result<(), CompositeError> {
        self.use_placement(Placement::from_str(placement)?)
    }

    /// 切换到已解析的摆放策略（CLI 由 clap 完成解析）。
    pub fn use_placement(&self, placement: Placement) -> Result<(), CompositeError> {
        self.handler.set_placement(placement)
    }

    /// 获取当前生效摆放策略（字符串）。
    pub fn get_placement(&self) -> Result<String, CompositeError> {
        Ok(self.handler.get_placement()?.as_str().to_string())
    }

    /// 应用 JSON 布局覆盖项。
    pub fn apply_layout_json(&self, content: &str) -> Result<(), CompositeError> {
        let overrides = LayoutOverrides::from_json(content)?;
        self.handler.apply_overrides(&overrides)
    }

    pub fn layout(&self) -> Result<LayoutParameters, CompositeError> {
        self.handler.layout_snapshot()
    }
}

impl Default for CompositeService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn service_set_and_get_placement_roundtrip() {
        let service = CompositeService::new();

        for placement in Placement::ALL {
            service
                .set_placement(placement.as_str())
                .expect("set placement should succeed");
            assert_eq!(service.get_placement().expect("get placement"), placement.as_str());
        }
    }

    #[test]
    fn use_placement_applies_parsed_value() {
        let service = CompositeService::new();
        service
            .use_placement(Placement::StackedNoBorder)
            .expect("use placement should succeed");

        assert_eq!(service.get_placement().expect("get placement"), "stacked-no-border");
        assert_eq!(service.layout().expect("layout").border_width_px, 0);
    }

    #[test]
    fn service_rejects_invalid_placement() {
        let service = CompositeService::new();

        let result = service.set_placement("side-by-side");
        assert!(matches!(result, Err(CompositeError::InvalidFormat(_))));
        assert_eq!(service.get_placement().expect("get placement"), "stacked-with-border");
    }

    #[test]
    fn service_placement_concurrent_access_stress() {
        let service = Arc::new(CompositeService::new());

        let workers = 8;
        let iterations = 200;

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let service = Arc::clone(&service);
            handles.push(thread::spawn(move || {
                for i in 0..iterations {
                    let placement = Placement::ALL[(worker_id + i) % Placement::ALL.len()];
                    service
                        .set_placement(placement.as_str())
                        .expect("set placement should succeed");

                    let current = service.get_placement().expect("get placement should succeed");
                    assert!(Placement::from_str(&current).is_ok());
                }
            }));
        }

        for handle in handles {
            handle.join().expect("worker thread should not panic");
        }
    }

    #[test]
    fn apply_layout_json_updates_parameters() {
        let service = CompositeService::new();
        service
            .apply_layout_json(r##"{ "border_width_px": 5, "separator_color": "#fff" }"##)
            .expect("layout json should apply");

        let params = service.layout().expect("layout snapshot");
        assert_eq!(params.border_width_px, 5);
        assert_eq!(params.separator_color, crate::compositor::Rgb::WHITE);
    }

    #[test]
    fn load_slot_from_base64_rejects_malformed_payload() {
        let service = CompositeService::new();
        let result = service.load_slot_from_base64("sig.png", "not base64 !!");
        assert!(matches!(result, Err(CompositeError::Decode(_))));
    }

    #[test]
    fn load_slot_from_base64_keeps_given_name() {
        use base64::{Engine as _, engine::general_purpose};

        let service = CompositeService::new();
        let encoded = general_purpose::STANDARD.encode(crate::compositor::test_support::png_bytes(3, 3));
        let slot = service
            .load_slot_from_base64("sig.png", &encoded)
            .expect("png payload should load");

        assert_eq!(slot.file_name, "sig.png");
        assert_eq!(slot.raw.source_hint, "base64");
    }
}
