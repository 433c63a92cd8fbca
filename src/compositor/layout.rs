//! 合成布局计算模块
//!
//! 该模块实现合成的全部几何算法：签名按照片宽度（或其固定比例）等比缩放，
//! 再按摆放策略决定画布尺寸与各元素位置。
//!
//! # 设计思路
//!
//! - 算法纯函数化：输入为照片尺寸、签名尺寸与布局参数，输出唯一布局，便于测试。
//! - 签名只通过宽度决定缩放，高度由原始宽高比反推，不会单独拉伸某一维。
//! - 零尺寸或非有限宽高比视为输入错误，直接返回 `DegenerateGeometry`。
//! - 画布的小数尺寸向零截断，与浏览器 canvas 设置宽高时的行为一致。

use super::config::{LayoutParameters, Placement, Rgb};
use super::source::Dimensions;
use super::CompositeError;

/// 画布上的像素矩形（左上角可能为负或越界，绘制时裁剪）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// 描边或分隔条。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub thickness: u32,
    pub color: Rgb,
}

/// 单次合成的完整布局。
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLayout {
    pub placement: Placement,
    pub canvas: Dimensions,
    /// 外圈描边；`None` 表示不绘制。
    pub border: Option<Band>,
    /// 照片左上角。
    pub photo_origin: (i64, i64),
    /// 分隔条区域；`None` 表示不绘制。
    pub separator: Option<(PixelRect, Rgb)>,
    /// 签名绘制区域（像素取整后）。
    pub signature: PixelRect,
    /// 签名目标宽度（未取整）。
    pub signature_width: f64,
    /// 签名目标高度（未取整）。
    pub signature_height: f64,
    /// 签名原始宽高比。
    pub signature_aspect_ratio: f64,
}

/// 计算合成布局。
///
/// # 参数
/// * `photo`     - 照片尺寸
/// * `signature` - 签名原始尺寸
/// * `params`    - 布局参数
///
/// # 示例
/// ```rust
/// use photo_signature_merge::compositor::layout::compute_layout;
/// use photo_signature_merge::compositor::{Dimensions, LayoutParameters, Placement};
///
/// let params = LayoutParameters::preset(Placement::StackedWithBorder);
/// let layout = compute_layout(Dimensions::new(600, 800), Dimensions::new(1200, 300), &params)?;
/// assert_eq!(layout.canvas, Dimensions::new(606, 958));
/// # Ok::<(), photo_signature_merge::compositor::CompositeError>(())
/// ```
pub fn compute_layout(
    photo: Dimensions,
    signature: Dimensions,
    params: &LayoutParameters,
) -> Result<CompositeLayout, CompositeError> {
    if photo.width == 0 || photo.height == 0 {
        return Err(CompositeError::DegenerateGeometry(format!(
            "照片尺寸为零：{}x{}",
            photo.width, photo.height
        )));
    }
    if signature.width == 0 || signature.height == 0 {
        return Err(CompositeError::DegenerateGeometry(format!(
            "签名尺寸为零：{}x{}",
            signature.width, signature.height
        )));
    }

    let desired_width = photo.width as f64 * params.signature_width_ratio;
    let aspect_ratio = signature.width as f64 / signature.height as f64;
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return Err(CompositeError::DegenerateGeometry(format!(
            "签名宽高比无效：{}",
            aspect_ratio
        )));
    }

    let calculated_height = desired_width / aspect_ratio;
    if !desired_width.is_finite() || !calculated_height.is_finite() || desired_width <= 0.0 {
        return Err(CompositeError::DegenerateGeometry(format!(
            "签名目标尺寸无效：{}x{}",
            desired_width, calculated_height
        )));
    }

    let signature_width_px = to_pixels(desired_width)?;
    let signature_height_px = to_pixels(calculated_height)?;
    // 比例小于 1 时签名在照片列内水平居中
    let signature_x_in_column = (photo.width as i64 - signature_width_px as i64) / 2;

    let layout = match params.placement {
        Placement::StackedWithBorder => {
            let border = params.border_width_px;
            let separator = params.separator_height_px;

            let canvas_width = photo.width as u64 + 2 * border as u64;
            let canvas_height = (border as f64
                + photo.height as f64
                + separator as f64
                + calculated_height
                + border as f64)
                .trunc();

            // 分隔条整条位于照片下方 [separator_y, separator_y + separator)，
            // 不像居中描边那样压住照片最后一行，也不在签名上方留出空行
            let separator_y = border as i64 + photo.height as i64;

            CompositeLayout {
                placement: params.placement,
                canvas: Dimensions::new(to_dimension(canvas_width as f64)?, to_dimension(canvas_height)?),
                border: (border > 0).then_some(Band {
                    thickness: border,
                    color: params.border_color,
                }),
                photo_origin: (border as i64, border as i64),
                separator: (separator > 0).then_some((
                    PixelRect {
                        x: border as i64,
                        y: separator_y,
                        width: photo.width,
                        height: separator,
                    },
                    params.separator_color,
                )),
                signature: PixelRect {
                    x: border as i64 + signature_x_in_column,
                    y: separator_y + separator as i64,
                    width: signature_width_px,
                    height: signature_height_px,
                },
                signature_width: desired_width,
                signature_height: calculated_height,
                signature_aspect_ratio: aspect_ratio,
            }
        }
        Placement::StackedNoBorder | Placement::StackedTight => {
            let canvas_height = (photo.height as f64 + calculated_height).trunc();

            CompositeLayout {
                placement: params.placement,
                canvas: Dimensions::new(photo.width, to_dimension(canvas_height)?),
                border: None,
                photo_origin: (0, 0),
                separator: None,
                signature: PixelRect {
                    x: signature_x_in_column,
                    y: photo.height as i64,
                    width: signature_width_px,
                    height: signature_height_px,
                },
                signature_width: desired_width,
                signature_height: calculated_height,
                signature_aspect_ratio: aspect_ratio,
            }
        }
        Placement::OverlayBottomOfPhoto => CompositeLayout {
            placement: params.placement,
            canvas: photo,
            border: None,
            photo_origin: (0, 0),
            separator: None,
            signature: PixelRect {
                x: signature_x_in_column,
                y: photo.height as i64 - signature_height_px as i64,
                width: signature_width_px,
                height: signature_height_px,
            },
            signature_width: desired_width,
            signature_height: calculated_height,
            signature_aspect_ratio: aspect_ratio,
        },
    };

    log::debug!(
        "📐 布局计算完成 - placement={} canvas={}x{} signature={}x{}@({}, {})",
        layout.placement.as_str(),
        layout.canvas.width,
        layout.canvas.height,
        layout.signature.width,
        layout.signature.height,
        layout.signature.x,
        layout.signature.y
    );

    Ok(layout)
}

/// 签名绘制尺寸：四舍五入，至少 1 像素。
fn to_pixels(value: f64) -> Result<u32, CompositeError> {
    let rounded = value.round().max(1.0);
    if rounded > u32::MAX as f64 {
        return Err(CompositeError::ResourceLimit(format!("签名尺寸过大：{}", value)));
    }
    Ok(rounded as u32)
}

fn to_dimension(value: f64) -> Result<u32, CompositeError> {
    if value < 1.0 {
        return Err(CompositeError::DegenerateGeometry(format!("画布尺寸无效：{}", value)));
    }
    if value > u32::MAX as f64 {
        return Err(CompositeError::ResourceLimit(format!("画布尺寸过大：{}", value)));
    }
    Ok(value as u32)
}
