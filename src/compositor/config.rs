//! # 配置模块
//!
//! ## 设计思路
//!
//! 历史上六个脚本版本只在“布局常量 + 摆放公式”上有差异，这里把它们收敛成
//! `LayoutParameters` + `Placement` 两个类型：
//! - `Placement` 是四种摆放策略的标签枚举（高层语义）
//! - `LayoutParameters::preset` 给出每种策略对应的编译期常量
//! - `ExportConfig` 承载资源上限与编码参数（与布局无关的“可调策略”）
//!
//! ## 实现思路
//!
//! - `Placement::from_str` / `as_str` 负责策略字符串解析与反向输出（CLI、配置文件共用）。
//! - `Rgb` 支持 `#rgb` / `#rrggbb` 两种写法，并通过 serde 以字符串形式读写。
//! - `LayoutOverrides` 用于从 JSON 文件覆盖预设字段，只读不回写。

use clap::ValueEnum;
use image::imageops::FilterType;
use serde::Deserialize;

use super::CompositeError;

/// 签名摆放策略。
///
/// - `StackedWithBorder`：签名在照片下方，外圈描边，中间有分隔条
/// - `StackedNoBorder`：签名紧贴照片下方，无描边
/// - `OverlayBottomOfPhoto`：签名叠加在照片底部（画布尺寸 = 照片尺寸）
/// - `StackedTight`：与 `StackedNoBorder` 几何一致的紧凑拼接
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    StackedWithBorder,
    StackedNoBorder,
    OverlayBottomOfPhoto,
    StackedTight,
}

impl Placement {
    pub const ALL: [Placement; 4] = [
        Placement::StackedWithBorder,
        Placement::StackedNoBorder,
        Placement::OverlayBottomOfPhoto,
        Placement::StackedTight,
    ];

    /// 从外部字符串解析摆放策略。
    ///
    /// # 示例
    /// ```rust
    /// use photo_signature_merge::compositor::Placement;
    ///
    /// let p = Placement::from_str("overlay-bottom-of-photo")?;
    /// assert_eq!(p.as_str(), "overlay-bottom-of-photo");
    /// # Ok::<(), photo_signature_merge::compositor::CompositeError>(())
    /// ```
    pub fn from_str(placement: &str) -> Result<Self, CompositeError> {
        match placement.trim().to_lowercase().as_str() {
            "stacked-with-border" => Ok(Self::StackedWithBorder),
            "stacked-no-border" => Ok(Self::StackedNoBorder),
            "overlay-bottom-of-photo" => Ok(Self::OverlayBottomOfPhoto),
            "stacked-tight" => Ok(Self::StackedTight),
            other => Err(CompositeError::InvalidFormat(format!(
                "未知摆放策略：{}（可选：stacked-with-border / stacked-no-border / overlay-bottom-of-photo / stacked-tight）",
                other
            ))),
        }
    }

    /// 将策略输出为稳定字符串，供日志与 CLI 展示。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StackedWithBorder => "stacked-with-border",
            Self::StackedNoBorder => "stacked-no-border",
            Self::OverlayBottomOfPhoto => "overlay-bottom-of-photo",
            Self::StackedTight => "stacked-tight",
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::StackedWithBorder
    }
}

/// 不透明 RGB 颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
    pub const LIGHT_GRAY: Rgb = Rgb([0xcc, 0xcc, 0xcc]);

    /// 解析 `#rgb` 或 `#rrggbb`。
    pub fn parse_hex(value: &str) -> Result<Self, CompositeError> {
        let hex = value.trim().trim_start_matches('#');
        let invalid = || CompositeError::InvalidFormat(format!("颜色格式错误：{}", value));

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(invalid()),
        };

        let channel = |idx: usize| {
            u8::from_str_radix(&expanded[idx..idx + 2], 16).map_err(|_| invalid())
        };

        Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        let [r, g, b] = self.0;
        image::Rgba([r, g, b, 255])
    }
}

impl TryFrom<String> for Rgb {
    type Error = CompositeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse_hex(&value)
    }
}

/// 布局参数。
///
/// 每个字段都有对应的预设常量，运行时只允许通过预设切换或配置文件覆盖。
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParameters {
    pub placement: Placement,
    /// 外圈描边宽度（像素）。
    pub border_width_px: u32,
    pub border_color: Rgb,
    /// 照片与签名之间分隔条厚度（像素）。
    pub separator_height_px: u32,
    pub separator_color: Rgb,
    /// 签名渲染宽度占照片宽度的比例（所有预设均为 1.0，可由配置文件调小）。
    pub signature_width_ratio: f64,
    /// 透明区域在 JPEG 导出时的底色。
    pub background_color: Rgb,
}

impl LayoutParameters {
    /// 获取指定摆放策略的预设参数。
    ///
    /// # 示例
    /// ```rust
    /// use photo_signature_merge::compositor::{LayoutParameters, Placement};
    ///
    /// let params = LayoutParameters::preset(Placement::StackedWithBorder);
    /// assert_eq!(params.border_width_px, 3);
    /// assert_eq!(params.separator_height_px, 2);
    /// ```
    pub fn preset(placement: Placement) -> Self {
        match placement {
            Placement::StackedWithBorder => Self {
                placement,
                border_width_px: 3,
                border_color: Rgb::BLACK,
                separator_height_px: 2,
                separator_color: Rgb::LIGHT_GRAY,
                signature_width_ratio: 1.0,
                background_color: Rgb::BLACK,
            },
            Placement::StackedNoBorder | Placement::StackedTight | Placement::OverlayBottomOfPhoto => {
                Self {
                    placement,
                    border_width_px: 0,
                    border_color: Rgb::BLACK,
                    separator_height_px: 0,
                    separator_color: Rgb::LIGHT_GRAY,
                    signature_width_ratio: 1.0,
                    background_color: Rgb::BLACK,
                }
            }
        }
    }

    /// 校验参数取值范围。
    pub fn validate(&self) -> Result<(), CompositeError> {
        if !self.signature_width_ratio.is_finite()
            || self.signature_width_ratio <= 0.0
            || self.signature_width_ratio > 1.0
        {
            return Err(CompositeError::InvalidFormat(format!(
                "signature_width_ratio 必须在 (0, 1] 之间：{}",
                self.signature_width_ratio
            )));
        }
        if self.border_width_px > 512 {
            return Err(CompositeError::InvalidFormat(
                "border_width_px 不能大于 512".to_string(),
            ));
        }
        if self.separator_height_px > 512 {
            return Err(CompositeError::InvalidFormat(
                "separator_height_px 不能大于 512".to_string(),
            ));
        }
        Ok(())
    }

    /// 以当前参数为基础应用覆盖项，返回新参数并完成校验。
    pub fn with_overrides(&self, overrides: &LayoutOverrides) -> Result<Self, CompositeError> {
        let mut params = match overrides.placement {
            Some(placement) if placement != self.placement => Self::preset(placement),
            _ => self.clone(),
        };

        if let Some(v) = overrides.border_width_px {
            params.border_width_px = v;
        }
        if let Some(v) = overrides.border_color {
            params.border_color = v;
        }
        if let Some(v) = overrides.separator_height_px {
            params.separator_height_px = v;
        }
        if let Some(v) = overrides.separator_color {
            params.separator_color = v;
        }
        if let Some(v) = overrides.signature_width_ratio {
            params.signature_width_ratio = v;
        }
        if let Some(v) = overrides.background_color {
            params.background_color = v;
        }

        params.validate()?;
        Ok(params)
    }
}

impl Default for LayoutParameters {
    fn default() -> Self {
        Self::preset(Placement::default())
    }
}

/// 布局覆盖项（JSON 配置文件）。
///
/// 未出现的字段沿用预设值；出现 `placement` 时先切换到该策略的预设再覆盖其余字段。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutOverrides {
    pub placement: Option<Placement>,
    pub border_width_px: Option<u32>,
    pub border_color: Option<Rgb>,
    pub separator_height_px: Option<u32>,
    pub separator_color: Option<Rgb>,
    pub signature_width_ratio: Option<f64>,
    pub background_color: Option<Rgb>,
}

impl LayoutOverrides {
    pub fn from_json(content: &str) -> Result<Self, CompositeError> {
        serde_json::from_str(content)
            .map_err(|e| CompositeError::InvalidFormat(format!("解析布局配置失败：{}", e)))
    }
}

/// 加载、解码与导出配置。
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 输出画布像素上限。
    pub max_canvas_pixels: u64,
    /// JPEG 质量（1~100）。
    pub jpeg_quality: u8,
    /// 签名缩放滤镜。
    pub resize_filter: FilterType,
    /// 输出文件名后缀（紧跟在照片主文件名之后，无分隔符）。
    pub output_suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_canvas_pixels: 60_000_000,
            jpeg_quality: 90,
            resize_filter: FilterType::CatmullRom,
            output_suffix: "vacancyhai-online.jpg".to_string(),
        }
    }
}
