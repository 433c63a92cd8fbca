//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载合成链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 面向用户的提示只有两种（缺少输入 / 其它失败），详细原因只写日志，
//! 由 `user_message` 统一收敛。

pub const MISSING_INPUT_NOTICE: &str = "Please upload both photo and signature.";
pub const PROCESSING_FAILED_NOTICE: &str =
    "Failed to process images. Please ensure valid image files are uploaded.";

/// 图片合成统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("缺少输入：{0}")]
    MissingInput(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("几何参数异常：{0}")]
    DegenerateGeometry(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl CompositeError {
    /// 稳定错误码，便于日志检索与测试断言。
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "E_MISSING_INPUT",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::DegenerateGeometry(_) => "E_DEGENERATE_GEOMETRY",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::Encode(_) => "E_ENCODE",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
        }
    }

    /// 出错阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "input",
            Self::FileSystem(_) => "io",
            Self::Decode(_) | Self::InvalidFormat(_) => "decode",
            Self::DegenerateGeometry(_) | Self::ResourceLimit(_) => "layout",
            Self::Encode(_) => "encode",
        }
    }

    /// 面向用户的单条提示文案。
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => MISSING_INPUT_NOTICE,
            _ => PROCESSING_FAILED_NOTICE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_has_dedicated_notice() {
        let err = CompositeError::MissingInput("signature".to_string());
        assert_eq!(err.user_message(), MISSING_INPUT_NOTICE);
        assert_eq!(err.code(), "E_MISSING_INPUT");
        assert_eq!(err.stage(), "input");
    }

    #[test]
    fn other_failures_share_generic_notice() {
        let errors = [
            CompositeError::Decode("bad".to_string()),
            CompositeError::InvalidFormat("bad".to_string()),
            CompositeError::Encode("bad".to_string()),
            CompositeError::FileSystem("bad".to_string()),
        ];

        for err in errors {
            assert_eq!(err.user_message(), PROCESSING_FAILED_NOTICE);
        }
    }
}
