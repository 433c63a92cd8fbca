//! 输出文件命名。
//!
//! 主文件名规则：按 `.` 切分，丢弃最后一段，再用 `.` 拼回。
//! 没有 `.` 的文件名得到空主文件名。后缀直接拼接，中间不插入分隔符，
//! 下游依赖这个精确格式。

/// 提取照片主文件名。
///
/// # 示例
/// ```rust
/// use photo_signature_merge::compositor::naming::photo_base_name;
///
/// assert_eq!(photo_base_name("id_card.jpeg"), "id_card");
/// assert_eq!(photo_base_name("scan.2024.png"), "scan.2024");
/// ```
pub fn photo_base_name(file_name: &str) -> String {
    let segments: Vec<&str> = file_name.split('.').collect();
    segments[..segments.len() - 1].join(".")
}

/// 由主文件名与后缀得到下载文件名。
pub fn output_file_name(base_name: &str, suffix: &str) -> String {
    format!("{}{}", base_name, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUFFIX: &str = "vacancyhai-online.jpg";

    #[test]
    fn derives_name_without_separator() {
        let base = photo_base_name("id_card.jpeg");
        assert_eq!(output_file_name(&base, SUFFIX), "id_cardvacancyhai-online.jpg");
    }

    #[test]
    fn keeps_inner_dots() {
        assert_eq!(photo_base_name("a.b.c.png"), "a.b.c");
    }

    #[test]
    fn name_without_extension_yields_empty_base() {
        assert_eq!(photo_base_name("photo"), "");
        assert_eq!(output_file_name(&photo_base_name("photo"), SUFFIX), SUFFIX);
    }

    #[test]
    fn hidden_file_and_trailing_dot() {
        assert_eq!(photo_base_name(".jpg"), "");
        assert_eq!(photo_base_name("photo."), "photo");
    }
}
