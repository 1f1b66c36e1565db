//! Document Context - Entities

use super::DocumentError;

/// Section 文件名前缀
pub const SECTION_FILE_PREFIX: &str = "section_";

/// Section - 最小合成单位
///
/// 不变量:
/// - index 从 1 开始，在文档内连续
/// - content 非空且已去除首尾空白
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    index: usize,
    content: String,
}

impl Section {
    pub fn new(index: usize, content: impl Into<String>) -> Result<Self, DocumentError> {
        if index == 0 {
            return Err(DocumentError::InvalidIndex);
        }
        let content = content.into().trim().to_string();
        if content.is_empty() {
            return Err(DocumentError::EmptySection(index));
        }
        Ok(Self { index, content })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// 持久化文件名（不含扩展名），编号补齐 3 位：`section_007`
    pub fn file_stem(&self) -> String {
        format!("{}{:03}", SECTION_FILE_PREFIX, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_is_zero_padded() {
        let section = Section::new(7, "text").unwrap();
        assert_eq!(section.file_stem(), "section_007");
        let section = Section::new(123, "text").unwrap();
        assert_eq!(section.file_stem(), "section_123");
    }

    #[test]
    fn test_content_is_trimmed() {
        let section = Section::new(1, "  hello \n").unwrap();
        assert_eq!(section.content(), "hello");
    }

    #[test]
    fn test_invalid_sections() {
        assert!(matches!(Section::new(0, "x"), Err(DocumentError::InvalidIndex)));
        assert!(matches!(Section::new(2, " \n "), Err(DocumentError::EmptySection(2))));
    }
}
