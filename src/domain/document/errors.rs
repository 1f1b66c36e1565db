//! Document Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("无效的文档名称: {0}")]
    InvalidName(String),

    #[error("Section 内容不能为空 (index {0})")]
    EmptySection(usize),

    #[error("Section 编号必须从 1 开始")]
    InvalidIndex,
}
