//! Toolbar and preference commands (`TheSkyXAction`).

use crate::request::Request;
use skyx_core::response::expect_undefined;
use skyx_core::{AppResult, ScriptTransport};
use std::sync::Arc;

/// Invokes the subset of host commands listed under
/// Preferences > Toolbars > Customize.
pub struct SkyxAction {
    transport: Arc<dyn ScriptTransport>,
}

impl SkyxAction {
    /// Build a handle; no request is sent.
    pub fn new(transport: Arc<dyn ScriptTransport>) -> Self {
        Self { transport }
    }

    /// Run `action` (e.g. `"TARGETFIND"`, `"MOVE_UP"`).
    pub async fn execute(&self, action: &str) -> AppResult<()> {
        let request = Request::RunAction {
            action: action.to_string(),
        };
        let reply = self.transport.send(&request.render()).await?;
        expect_undefined(&reply, &format!("action {action}"))?;
        tracing::debug!(action, "Action executed");
        Ok(())
    }

    /// Send an arbitrary script and return its output unparsed.
    pub async fn run_script(&self, script: &str) -> AppResult<String> {
        self.transport
            .send(&Request::Raw(script.to_string()).render())
            .await
    }
}
