//! Document Context - 文档限界上下文
//!
//! 职责:
//! - 文档名称（由源文件名派生）
//! - Section 实体及其持久化文件名

mod entities;
mod errors;
mod value_objects;

pub use entities::{Section, SECTION_FILE_PREFIX};
pub use errors::DocumentError;
pub use value_objects::DocumentName;
