//! Command Handlers 实现
//!
//! 每个阶段一个 Handler，依赖通过 Port 注入

mod combine_handlers;
mod segment_handlers;
mod synthesis_handlers;
mod workspace_handlers;

pub use combine_handlers::*;
pub use segment_handlers::*;
pub use synthesis_handlers::*;
pub use workspace_handlers::*;
