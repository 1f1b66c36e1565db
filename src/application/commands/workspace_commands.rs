//! Workspace Commands

/// 删除整个输出目录
#[derive(Debug, Clone, Default)]
pub struct ResetOutput;

/// 重置结果
#[derive(Debug, Clone)]
pub struct ResetOutputResponse {
    /// 输出目录是否存在并已删除
    pub removed: bool,
}
