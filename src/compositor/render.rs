//! # 渲染与编码模块
//!
//! ## 设计思路
//!
//! 按固定顺序把布局落到一块 RGBA 画布上：
//! 1. 外圈描边（可选）
//! 2. 照片
//! 3. 分隔条（可选）
//! 4. 缩放后的签名（按 alpha 混合，允许遮挡照片）
//!
//! 所有绘制都会裁剪到画布范围内，越界部分直接丢弃。
//! JPEG 不支持透明度，编码前先把画布压平到底色上。
//!
//! ## 实现思路
//!
//! - 签名缩放优先使用 `fast_image_resize`，失败时回退 `image::imageops::resize`。
//! - 编码使用 `JpegEncoder::new_with_quality`，质量由 `ExportConfig` 决定。

use fast_image_resize as fr;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb as PixelRgb, RgbImage, Rgba, RgbaImage};

use super::config::Rgb;
use super::layout::{CompositeLayout, PixelRect};
use super::source::SourceImage;
use super::CompositeError;

/// 按布局渲染合成画布。
pub fn render_canvas(
    photo: &SourceImage,
    signature: &SourceImage,
    layout: &CompositeLayout,
    filter: FilterType,
) -> Result<RgbaImage, CompositeError> {
    let mut canvas = RgbaImage::new(layout.canvas.width, layout.canvas.height);

    if let Some(border) = layout.border {
        stroke_border(&mut canvas, border.thickness, border.color);
    }

    imageops::overlay(&mut canvas, photo.pixels(), layout.photo_origin.0, layout.photo_origin.1);

    if let Some((rect, color)) = layout.separator {
        fill_rect(&mut canvas, rect, color);
    }

    let scaled = scale_signature(signature.pixels(), layout.signature, filter)?;
    imageops::overlay(&mut canvas, &scaled, layout.signature.x, layout.signature.y);

    Ok(canvas)
}

/// 将 RGBA 画布压平到不透明底色上。
pub fn flatten(canvas: &RgbaImage, background: Rgb) -> RgbImage {
    let [br, bg, bb] = background.0;
    ImageBuffer::from_fn(canvas.width(), canvas.height(), |x, y| {
        let Rgba([r, g, b, a]) = *canvas.get_pixel(x, y);
        let blend = |fg: u8, bgc: u8| -> u8 {
            let a = a as u32;
            ((fg as u32 * a + bgc as u32 * (255 - a) + 127) / 255) as u8
        };
        PixelRgb([blend(r, br), blend(g, bg), blend(b, bb)])
    })
}

/// 以指定质量编码 JPEG。
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CompositeError> {
    let quality = quality.clamp(1, 100);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(image)
        .map_err(|e| CompositeError::Encode(format!("JPEG 编码失败：{}", e)))?;
    Ok(bytes)
}

/// 在画布四周绘制 `thickness` 像素宽的描边。
fn stroke_border(canvas: &mut RgbaImage, thickness: u32, color: Rgb) {
    let (width, height) = canvas.dimensions();
    let bands = [
        PixelRect { x: 0, y: 0, width, height: thickness },
        PixelRect {
            x: 0,
            y: height as i64 - thickness as i64,
            width,
            height: thickness,
        },
        PixelRect { x: 0, y: 0, width: thickness, height },
        PixelRect {
            x: width as i64 - thickness as i64,
            y: 0,
            width: thickness,
            height,
        },
    ];

    for band in bands {
        fill_rect(canvas, band, color);
    }
}

/// 用不透明颜色填充矩形（裁剪到画布内）。
fn fill_rect(canvas: &mut RgbaImage, rect: PixelRect, color: Rgb) {
    let (width, height) = canvas.dimensions();
    let x0 = rect.x.clamp(0, width as i64) as u32;
    let y0 = rect.y.clamp(0, height as i64) as u32;
    let x1 = (rect.x + rect.width as i64).clamp(0, width as i64) as u32;
    let y1 = (rect.y + rect.height as i64).clamp(0, height as i64) as u32;

    let pixel = color.to_rgba();
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, pixel);
        }
    }
}

fn scale_signature(
    source: &RgbaImage,
    target: PixelRect,
    filter: FilterType,
) -> Result<RgbaImage, CompositeError> {
    if source.dimensions() == (target.width, target.height) {
        return Ok(source.clone());
    }

    match resize_with_fast_image_resize(source, target.width, target.height, filter) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}", err);
            Ok(imageops::resize(source, target.width, target.height, filter))
        }
    }
}

fn resize_with_fast_image_resize(
    source: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, CompositeError> {
    let (src_width, src_height) = source.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        source.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| CompositeError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options =
        fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| CompositeError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| CompositeError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
