//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `InputSlot` 表示用户选择的一个文件（文件名 + 原始字节）
//! - `RawImageData` 表示已加载但未解码的字节
//! - `SourceImage` 表示已解码、可直接参与合成的 RGBA 图像
//! - `OutputArtifact` 表示最终 JPEG 字节与建议文件名

use std::path::Path;

use image::RgbaImage;

use super::CompositeError;

/// 图片宽高（像素）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// 加载阶段输出：原始字节与来源标识。
#[derive(Debug, Clone)]
pub struct RawImageData {
    /// 原始图片字节。
    pub bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub source_hint: &'static str,
}

/// 用户选择的单个输入文件。
#[derive(Debug, Clone)]
pub struct InputSlot {
    /// 原始文件名（不含目录）。
    pub file_name: String,
    pub raw: RawImageData,
}

impl InputSlot {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: strip_directories(file_name.into()),
            raw: RawImageData {
                bytes,
                source_hint: "memory",
            },
        }
    }

    /// 从已加载的原始字节构造输入槽。
    pub fn from_raw(file_name: impl Into<String>, raw: RawImageData) -> Self {
        Self {
            file_name: strip_directories(file_name.into()),
            raw,
        }
    }

    /// 取路径最后一段作为文件名。
    pub fn file_name_of(path: &Path) -> Result<String, CompositeError> {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                CompositeError::FileSystem(format!("路径缺少文件名：{}", path.display()))
            })
    }
}

/// 只保留最后一段文件名，`/` 与 `\` 都视为目录分隔符。
fn strip_directories(name: String) -> String {
    match name.rsplit(['/', '\\']).next() {
        Some(last) if last.len() != name.len() => last.to_string(),
        _ => name,
    }
}

/// 解码阶段输出：可参与合成的 RGBA 图像。
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// 包装已解码像素，拒绝零尺寸图像。
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, CompositeError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(CompositeError::DegenerateGeometry(format!(
                "图片尺寸为零：{}x{}",
                width, height
            )));
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// 最终导出物。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// 建议下载文件名。
    pub file_name: String,
    /// JPEG 字节流。
    pub bytes: Vec<u8>,
    /// 画布宽高。
    pub dimensions: Dimensions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_image_rejects_zero_dimensions() {
        let result = SourceImage::from_rgba(RgbaImage::new(0, 10));
        assert!(matches!(result, Err(CompositeError::DegenerateGeometry(_))));
    }

    #[test]
    fn file_name_of_takes_last_segment() {
        let name = InputSlot::file_name_of(Path::new("/tmp/uploads/id_card.jpeg"))
            .expect("path has file name");
        assert_eq!(name, "id_card.jpeg");
    }

    #[test]
    fn slot_names_drop_directory_parts() {
        assert_eq!(InputSlot::new("../escaped.png", Vec::new()).file_name, "escaped.png");
        assert_eq!(InputSlot::new("C:\\photos\\me.jpg", Vec::new()).file_name, "me.jpg");
        assert_eq!(InputSlot::new("a/b/", Vec::new()).file_name, "");

        let raw = RawImageData {
            bytes: Vec::new(),
            source_hint: "base64",
        };
        assert_eq!(InputSlot::from_raw("/etc/sign.png", raw).file_name, "sign.png");
        assert_eq!(InputSlot::new("id_card.jpeg", Vec::new()).file_name, "id_card.jpeg");
    }
}
