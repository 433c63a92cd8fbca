//! # 图片合成模块（compositor）
//!
//! ## 设计思路
//!
//! 该模块将“输入选择 → 加载校验 → 解码 → 布局计算 → 渲染编码 → 导出”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：入口层持有的服务实例（含顶层错误收敛）
//! - `handler`：编排整条处理流水线
//! - `session`：单次请求的输入状态（照片 / 签名 / 主文件名）
//! - `loader`：负责文件 / Base64 加载与安全校验
//! - `pipeline`：负责解码、像素限制与并发加载
//! - `layout`：纯几何计算
//! - `render`：绘制、缩放、压平与 JPEG 编码
//! - `naming`：导出文件名
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! main.rs（CLI 参数 → 会话）
//!    ↓
//! service.rs（run_action：唯一用户提示出口）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ pipeline.rs（两路并发解码）
//!    ├─ layout.rs（画布尺寸 + 元素位置）
//!    └─ render.rs（描边 → 照片 → 分隔条 → 签名 → JPEG）
//!    ↓
//! export.rs（ArtifactSink 写出文件）
//! ```
//!
//! ## 分层职责建议
//!
//! - 新增摆放策略优先改 `config.rs` + `layout.rs`
//! - 资源上限与编码参数优先改 `config.rs` 中的 `ExportConfig`
//! - 流程顺序变更优先改 `handler.rs`

mod config;
mod error;
mod handler;
pub mod layout;
mod loader;
pub mod naming;
mod pipeline;
pub mod render;
mod service;
mod session;
mod source;

pub use config::{ExportConfig, LayoutOverrides, LayoutParameters, Placement, Rgb};
pub use error::{CompositeError, MISSING_INPUT_NOTICE, PROCESSING_FAILED_NOTICE};
pub use handler::CompositeHandler;
pub use service::{ActionOutcome, CompositeService};
pub use session::{CompositeSession, PHOTO_PLACEHOLDER, SIGNATURE_PLACEHOLDER};
pub use source::{Dimensions, InputSlot, OutputArtifact, RawImageData, SourceImage};

#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    /// 生成带渐变的 PNG 字节，用于各模块测试。
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x % 255) as u8;
            let g = (y % 255) as u8;
            let b = ((x + y) % 255) as u8;
            Rgba([r, g, b, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }
}
