//! Storage Adapter - 文件系统工作目录

mod file_storage;

pub use file_storage::FileWorkspace;
