//! # 解码流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! 解码是整条链路唯一的挂起点：`load_image` 把 CPU 解码放到 blocking 线程池，
//! `load_pair` 并发发起照片与签名两路解码，二者都完成后才进入合成。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素/内存上限快速拒绝
//! 3. 完整解码
//! 4. 转换 RGBA 并包装为 `SourceImage`

use image::{GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

use super::source::{RawImageData, SourceImage};
use super::{CompositeError, CompositeHandler, ExportConfig};

impl CompositeHandler {
    /// 将原始字节解码为可参与合成的 `SourceImage`。
    pub(crate) fn decode_source(
        raw: &RawImageData,
        config: &ExportConfig,
    ) -> Result<SourceImage, CompositeError> {
        let format: ImageFormat = image::guess_format(&raw.bytes)
            .map_err(|e| CompositeError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory_with_format(&raw.bytes, format)
            .map_err(|e| CompositeError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        Self::validate_pixel_limits(config, width, height)?;

        let source = SourceImage::from_rgba(decoded.to_rgba8())?;

        log::info!(
            "✅ 图片解码成功 - 来源: {} 格式: {:?} 尺寸: {}x{}",
            raw.source_hint,
            format,
            width,
            height
        );

        Ok(source)
    }

    /// 异步解码单张图片。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use photo_signature_merge::compositor::{CompositeHandler, ExportConfig, RawImageData};
    ///
    /// # async fn demo(bytes: Vec<u8>) -> Result<(), photo_signature_merge::compositor::CompositeError> {
    /// let raw = RawImageData { bytes, source_hint: "file" };
    /// let image = CompositeHandler::load_image(raw, ExportConfig::default()).await?;
    /// println!("{}x{}", image.width(), image.height());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_image(
        raw: RawImageData,
        config: ExportConfig,
    ) -> Result<SourceImage, CompositeError> {
        tokio::task::spawn_blocking(move || Self::decode_source(&raw, &config))
            .await
            .map_err(|e| CompositeError::Decode(format!("解码任务异常退出：{}", e)))?
    }

    /// 并发解码照片与签名；任一失败即整体失败。
    pub async fn load_pair(
        photo: RawImageData,
        signature: RawImageData,
        config: &ExportConfig,
    ) -> Result<(SourceImage, SourceImage), CompositeError> {
        tokio::try_join!(
            Self::load_image(photo, config.clone()),
            Self::load_image(signature, config.clone()),
        )
    }

    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), CompositeError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CompositeError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| CompositeError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(
        config: &ExportConfig,
        width: u32,
        height: u32,
    ) -> Result<(), CompositeError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| CompositeError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(CompositeError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &ExportConfig,
        width: u32,
        height: u32,
    ) -> Result<(), CompositeError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| CompositeError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(CompositeError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::test_support::png_bytes;

    fn raw(bytes: Vec<u8>) -> RawImageData {
        RawImageData {
            bytes,
            source_hint: "test",
        }
    }

    #[test]
    fn decode_source_reports_dimensions() {
        let image = CompositeHandler::decode_source(&raw(png_bytes(40, 25)), &ExportConfig::default())
            .expect("decode should succeed");

        assert_eq!(image.width(), 40);
        assert_eq!(image.height(), 25);
        assert_eq!(image.pixels().as_raw().len(), 40 * 25 * 4);
    }

    #[test]
    fn decode_source_rejects_non_image_bytes() {
        let result =
            CompositeHandler::decode_source(&raw(b"hello world".to_vec()), &ExportConfig::default());
        assert!(matches!(result, Err(CompositeError::InvalidFormat(_))));
    }

    #[test]
    fn decode_source_rejects_truncated_png() {
        let mut bytes = png_bytes(32, 32);
        bytes.truncate(40);

        let result = CompositeHandler::decode_source(&raw(bytes), &ExportConfig::default());
        assert!(matches!(
            result,
            Err(CompositeError::Decode(_)) | Err(CompositeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn stress_rejects_too_many_pixels() {
        let config = ExportConfig {
            max_decoded_pixels: 1_000,
            ..ExportConfig::default()
        };

        let result = CompositeHandler::decode_source(&raw(png_bytes(100, 100)), &config);
        assert!(matches!(result, Err(CompositeError::ResourceLimit(_))));
    }

    #[tokio::test]
    async fn load_pair_decodes_both_inputs() {
        let (photo, signature) = CompositeHandler::load_pair(
            raw(png_bytes(60, 80)),
            raw(png_bytes(120, 30)),
            &ExportConfig::default(),
        )
        .await
        .expect("both loads should succeed");

        assert_eq!((photo.width(), photo.height()), (60, 80));
        assert_eq!((signature.width(), signature.height()), (120, 30));
    }

    #[tokio::test]
    async fn load_pair_fails_when_signature_is_not_an_image() {
        let result = CompositeHandler::load_pair(
            raw(png_bytes(60, 80)),
            raw(b"%PDF-1.7 definitely not a raster".to_vec()),
            &ExportConfig::default(),
        )
        .await;

        assert!(matches!(result, Err(CompositeError::InvalidFormat(_))));
    }
}
