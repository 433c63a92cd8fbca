//! # 会话状态
//!
//! ## 设计思路
//!
//! “当前选中的照片 / 签名 / 照片主文件名”不再是模块级全局变量，
//! 而是由单个 `CompositeSession` 持有，并在每次合成时显式传入。
//! 会话只记录用户选择，不持有任何输出状态。

use super::naming::photo_base_name;
use super::source::InputSlot;
use super::CompositeError;

/// 未选择照片时展示的占位文件名。
pub const PHOTO_PLACEHOLDER: &str = "passport_photo.jpg";
/// 未选择签名时展示的占位文件名。
pub const SIGNATURE_PLACEHOLDER: &str = "signature_photo.png";

/// 单次合成请求的输入状态。
#[derive(Debug, Clone, Default)]
pub struct CompositeSession {
    photo: Option<InputSlot>,
    signature: Option<InputSlot>,
    photo_base_name: String,
}

impl CompositeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 选择（或清空）照片；选中时同步推导主文件名。
    pub fn select_photo(&mut self, slot: Option<InputSlot>) {
        if let Some(slot) = &slot {
            self.photo_base_name = photo_base_name(&slot.file_name);
            log::debug!("🖼️ 已选择照片：{}（主文件名：{}）", slot.file_name, self.photo_base_name);
        }
        self.photo = slot;
    }

    /// 选择（或清空）签名。
    pub fn select_signature(&mut self, slot: Option<InputSlot>) {
        if let Some(slot) = &slot {
            log::debug!("✍️ 已选择签名：{}", slot.file_name);
        }
        self.signature = slot;
    }

    pub fn photo_display_name(&self) -> &str {
        self.photo
            .as_ref()
            .map(|slot| slot.file_name.as_str())
            .unwrap_or(PHOTO_PLACEHOLDER)
    }

    pub fn signature_display_name(&self) -> &str {
        self.signature
            .as_ref()
            .map(|slot| slot.file_name.as_str())
            .unwrap_or(SIGNATURE_PLACEHOLDER)
    }

    pub fn photo_base_name(&self) -> &str {
        &self.photo_base_name
    }

    /// 两个输入槽是否都已选择。
    pub fn is_ready(&self) -> bool {
        self.photo.is_some() && self.signature.is_some()
    }

    /// 取出两路输入；缺任何一路都返回 `MissingInput`。
    pub(crate) fn require_inputs(&self) -> Result<(&InputSlot, &InputSlot), CompositeError> {
        match (&self.photo, &self.signature) {
            (Some(photo), Some(signature)) => Ok((photo, signature)),
            (None, None) => Err(CompositeError::MissingInput("未选择照片和签名".to_string())),
            (None, Some(_)) => Err(CompositeError::MissingInput("未选择照片".to_string())),
            (Some(_), None) => Err(CompositeError::MissingInput("未选择签名".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_shows_placeholders() {
        let session = CompositeSession::new();

        assert_eq!(session.photo_display_name(), PHOTO_PLACEHOLDER);
        assert_eq!(session.signature_display_name(), SIGNATURE_PLACEHOLDER);
        assert!(!session.is_ready());
    }

    #[test]
    fn selecting_photo_derives_base_name() {
        let mut session = CompositeSession::new();
        session.select_photo(Some(InputSlot::new("id_card.jpeg", vec![1, 2, 3])));

        assert_eq!(session.photo_display_name(), "id_card.jpeg");
        assert_eq!(session.photo_base_name(), "id_card");
    }

    #[test]
    fn clearing_slot_restores_placeholder() {
        let mut session = CompositeSession::new();
        session.select_signature(Some(InputSlot::new("sig.png", vec![1])));
        session.select_signature(None);

        assert_eq!(session.signature_display_name(), SIGNATURE_PLACEHOLDER);
    }

    #[test]
    fn require_inputs_reports_missing_slot() {
        let mut session = CompositeSession::new();
        session.select_photo(Some(InputSlot::new("a.png", vec![1])));

        let result = session.require_inputs();
        assert!(matches!(result, Err(CompositeError::MissingInput(_))));

        session.select_signature(Some(InputSlot::new("b.png", vec![2])));
        assert!(session.is_ready());
        assert!(session.require_inputs().is_ok());
    }
}
