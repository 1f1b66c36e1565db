//! 应用层 - 命令
//!
//! 流水线的三个阶段（分段、合成、合并）以及输出目录重置

mod combine_commands;
mod segment_commands;
mod synthesis_commands;
mod workspace_commands;

pub mod handlers;

pub use combine_commands::*;
pub use segment_commands::*;
pub use synthesis_commands::*;
pub use workspace_commands::*;
