//! Workspace Command Handlers

use std::sync::Arc;

use crate::application::commands::{ResetOutput, ResetOutputResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::WorkspacePort;

/// ResetOutput Handler - 删除全部中间产物和音频，输入文档保持不变
pub struct ResetOutputHandler {
    workspace: Arc<dyn WorkspacePort>,
}

impl ResetOutputHandler {
    pub fn new(workspace: Arc<dyn WorkspacePort>) -> Self {
        Self { workspace }
    }

    pub async fn handle(&self, _command: ResetOutput) -> Result<ResetOutputResponse, ApplicationError> {
        let removed = self.workspace.reset_output().await?;
        if !removed {
            tracing::info!("Output directory absent, nothing to reset");
        }
        Ok(ResetOutputResponse { removed })
    }
}
