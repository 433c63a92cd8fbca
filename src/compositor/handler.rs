//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `CompositeHandler` 只负责流程编排与配置管理，不直接与 CLI 或文件导出绑定。
//! 处理链路固定为：
//! 1. 校验两路输入都已选择
//! 2. 读取布局参数快照
//! 3. 并发解码照片与签名
//! 4. 计算布局 → 渲染 → 压平 → JPEG 编码
//!
//! ## 实现思路
//!
//! - 布局参数通过 `Arc<RwLock<LayoutParameters>>` 支持运行时切换摆放策略。
//! - 单次请求内使用“同一参数快照”，避免处理中途参数漂移。
//! - 画布只在解码全部成功后才创建，任何失败都不会产生半成品。
//! - 记录 `load/layout/render/encode/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::layout::compute_layout;
use super::naming::output_file_name;
use super::render::{encode_jpeg, flatten, render_canvas};
use super::source::{OutputArtifact, SourceImage};
use super::{
    CompositeError, CompositeSession, ExportConfig, LayoutOverrides, LayoutParameters, Placement,
};

/// 合成处理器。
pub struct CompositeHandler {
    pub(super) layout: Arc<RwLock<LayoutParameters>>,
    pub(super) export: ExportConfig,
}

impl CompositeHandler {
    /// 根据初始布局参数与导出配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use photo_signature_merge::compositor::{CompositeHandler, ExportConfig, LayoutParameters};
    ///
    /// let handler = CompositeHandler::new(LayoutParameters::default(), ExportConfig::default());
    /// assert_eq!(handler.get_placement()?.as_str(), "stacked-with-border");
    /// # Ok::<(), photo_signature_merge::compositor::CompositeError>(())
    /// ```
    pub fn new(layout: LayoutParameters, export: ExportConfig) -> Self {
        Self {
            layout: Arc::new(RwLock::new(layout)),
            export,
        }
    }

    /// 获取布局参数快照。
    pub fn layout_snapshot(&self) -> Result<LayoutParameters, CompositeError> {
        self.layout
            .read()
            .map(|params| params.clone())
            .map_err(|_| CompositeError::ResourceLimit("布局参数读取锁已中毒".to_string()))
    }

    pub fn export_config(&self) -> &ExportConfig {
        &self.export
    }

    /// 切换摆放策略（整体替换为该策略的预设参数）。
    pub fn set_placement(&self, placement: Placement) -> Result<(), CompositeError> {
        let mut params = self
            .layout
            .write()
            .map_err(|_| CompositeError::ResourceLimit("布局参数写入锁已中毒".to_string()))?;
        *params = LayoutParameters::preset(placement);

        log::info!(
            "⚙️ 已切换摆放策略：{}（border={}px, separator={}px, ratio={}）",
            placement.as_str(),
            params.border_width_px,
            params.separator_height_px,
            params.signature_width_ratio
        );

        Ok(())
    }

    pub fn get_placement(&self) -> Result<Placement, CompositeError> {
        let params = self
            .layout
            .read()
            .map_err(|_| CompositeError::ResourceLimit("布局参数读取锁已中毒".to_string()))?;
        Ok(params.placement)
    }

    /// 在当前参数上应用覆盖项；校验失败时保持原参数不变。
    pub fn apply_overrides(&self, overrides: &LayoutOverrides) -> Result<(), CompositeError> {
        let mut params = self
            .layout
            .write()
            .map_err(|_| CompositeError::ResourceLimit("布局参数写入锁已中毒".to_string()))?;
        *params = params.with_overrides(overrides)?;
        Ok(())
    }

    /// 处理主入口：解码会话中的两路输入并生成导出物。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use photo_signature_merge::compositor::{
    ///     CompositeHandler, CompositeSession, ExportConfig, InputSlot, LayoutParameters,
    /// };
    ///
    /// # async fn demo(photo: Vec<u8>, signature: Vec<u8>) -> Result<(), photo_signature_merge::compositor::CompositeError> {
    /// let handler = CompositeHandler::new(LayoutParameters::default(), ExportConfig::default());
    /// let mut session = CompositeSession::new();
    /// session.select_photo(Some(InputSlot::new("id_card.jpeg", photo)));
    /// session.select_signature(Some(InputSlot::new("sign.png", signature)));
    ///
    /// let artifact = handler.compose(&session).await?;
    /// assert_eq!(artifact.file_name, "id_cardvacancyhai-online.jpg");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn compose(&self, session: &CompositeSession) -> Result<OutputArtifact, CompositeError> {
        let (photo_slot, signature_slot) = session.require_inputs()?;
        let params = self.layout_snapshot()?;
        params.validate()?;

        let total_start = Instant::now();

        let load_start = Instant::now();
        let (photo, signature) = Self::load_pair(
            photo_slot.raw.clone(),
            signature_slot.raw.clone(),
            &self.export,
        )
        .await?;
        let load_elapsed = load_start.elapsed();

        let artifact =
            self.compose_decoded(&photo, &signature, &params, session.photo_base_name())?;

        log::info!(
            "✅ 合成完成 - {} -> {} ({}x{}, {} bytes) load={}ms total={}ms",
            session.photo_display_name(),
            artifact.file_name,
            artifact.dimensions.width,
            artifact.dimensions.height,
            artifact.bytes.len(),
            load_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(artifact)
    }

    /// 对已解码的两张图片执行布局、渲染与编码。
    pub fn compose_decoded(
        &self,
        photo: &SourceImage,
        signature: &SourceImage,
        params: &LayoutParameters,
        photo_base_name: &str,
    ) -> Result<OutputArtifact, CompositeError> {
        let layout_start = Instant::now();
        let layout = compute_layout(photo.dimensions(), signature.dimensions(), params)?;
        if layout.canvas.pixel_count() > self.export.max_canvas_pixels {
            return Err(CompositeError::ResourceLimit(format!(
                "画布像素过大：{}x{}（限制：{} 像素）",
                layout.canvas.width, layout.canvas.height, self.export.max_canvas_pixels
            )));
        }
        // 叠加模式下签名缩放缓冲可能远大于画布
        let signature_pixels = layout.signature.width as u64 * layout.signature.height as u64;
        if signature_pixels > self.export.max_canvas_pixels {
            return Err(CompositeError::ResourceLimit(format!(
                "签名缩放尺寸过大：{}x{}（限制：{} 像素）",
                layout.signature.width, layout.signature.height, self.export.max_canvas_pixels
            )));
        }
        let layout_elapsed = layout_start.elapsed();

        let render_start = Instant::now();
        let canvas = render_canvas(photo, signature, &layout, self.export.resize_filter)?;
        let flattened = flatten(&canvas, params.background_color);
        let render_elapsed = render_start.elapsed();

        let encode_start = Instant::now();
        let bytes = encode_jpeg(&flattened, self.export.jpeg_quality)?;
        let encode_elapsed = encode_start.elapsed();

        log::debug!(
            "⏱️ 合成阶段耗时 - layout={}ms render={}ms encode={}ms",
            layout_elapsed.as_millis(),
            render_elapsed.as_millis(),
            encode_elapsed.as_millis()
        );

        Ok(OutputArtifact {
            file_name: output_file_name(photo_base_name, &self.export.output_suffix),
            bytes,
            dimensions: layout.canvas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::test_support::png_bytes;
    use crate::compositor::{Dimensions, InputSlot};

    fn handler(placement: Placement) -> CompositeHandler {
        CompositeHandler::new(LayoutParameters::preset(placement), ExportConfig::default())
    }

    fn ready_session(photo: (u32, u32), signature: (u32, u32)) -> CompositeSession {
        let mut session = CompositeSession::new();
        session.select_photo(Some(InputSlot::new("id_card.jpeg", png_bytes(photo.0, photo.1))));
        session.select_signature(Some(InputSlot::new(
            "sign.png",
            png_bytes(signature.0, signature.1),
        )));
        session
    }

    #[tokio::test]
    async fn compose_produces_bordered_jpeg() {
        let artifact = handler(Placement::StackedWithBorder)
            .compose(&ready_session((600, 800), (1200, 300)))
            .await
            .expect("compose should succeed");

        assert_eq!(artifact.file_name, "id_cardvacancyhai-online.jpg");
        assert_eq!(artifact.dimensions, Dimensions::new(606, 958));

        let decoded = image::load_from_memory(&artifact.bytes).expect("output should decode");
        assert_eq!((decoded.width(), decoded.height()), (606, 958));
    }

    #[tokio::test]
    async fn compose_is_byte_identical_for_identical_input() {
        let handler = handler(Placement::StackedTight);
        let session = ready_session((64, 48), (90, 30));

        let first = handler.compose(&session).await.expect("first compose");
        let second = handler.compose(&session).await.expect("second compose");

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn compose_refuses_missing_signature() {
        let mut session = CompositeSession::new();
        session.select_photo(Some(InputSlot::new("a.png", png_bytes(10, 10))));

        let result = handler(Placement::StackedWithBorder).compose(&session).await;
        assert!(matches!(result, Err(CompositeError::MissingInput(_))));
    }

    #[tokio::test]
    async fn compose_enforces_canvas_budget() {
        let handler = CompositeHandler::new(
            LayoutParameters::preset(Placement::StackedTight),
            ExportConfig {
                max_canvas_pixels: 100,
                ..ExportConfig::default()
            },
        );

        let result = handler.compose(&ready_session((20, 20), (20, 20))).await;
        assert!(matches!(result, Err(CompositeError::ResourceLimit(_))));
    }

    #[test]
    fn overlay_rejects_oversized_signature_before_scaling() {
        let handler = handler(Placement::OverlayBottomOfPhoto);
        let photo = SourceImage::from_rgba(image::RgbaImage::new(1000, 10)).expect("photo");
        let signature = SourceImage::from_rgba(image::RgbaImage::new(1, 100_000)).expect("signature");
        let params = handler.layout_snapshot().expect("snapshot");

        let result = handler.compose_decoded(&photo, &signature, &params, "tall");

        assert!(matches!(result, Err(CompositeError::ResourceLimit(_))));
    }

    #[test]
    fn set_placement_replaces_preset() {
        let handler = handler(Placement::StackedWithBorder);
        handler
            .set_placement(Placement::OverlayBottomOfPhoto)
            .expect("set placement should succeed");

        let params = handler.layout_snapshot().expect("snapshot");
        assert_eq!(params.placement, Placement::OverlayBottomOfPhoto);
        assert_eq!(params.border_width_px, 0);
    }

    #[test]
    fn invalid_overrides_keep_previous_parameters() {
        let handler = handler(Placement::StackedWithBorder);
        let overrides = LayoutOverrides {
            signature_width_ratio: Some(0.0),
            ..LayoutOverrides::default()
        };

        assert!(handler.apply_overrides(&overrides).is_err());
        let params = handler.layout_snapshot().expect("snapshot");
        assert_eq!(params, LayoutParameters::preset(Placement::StackedWithBorder));
    }
}
