//! Document Context - Value Objects

use std::path::Path;

use super::DocumentError;

/// 文档名称
///
/// 源文件名去掉扩展名，同时作为 Section 和音频输出子目录的名称
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentName(String);

impl DocumentName {
    pub fn new(name: impl Into<String>) -> Result<Self, DocumentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DocumentError::InvalidName(name));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(DocumentError::InvalidName(name));
        }
        Ok(Self(name))
    }

    /// 从源文件路径派生（`notes/intro.md` → `intro`）
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| DocumentError::InvalidName(path.display().to_string()))?;
        Self::new(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
