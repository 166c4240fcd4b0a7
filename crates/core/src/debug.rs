//! Contract of the debug-session launcher

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::selection::SelectionRequest;

/// A running debug session
#[async_trait]
pub trait DebugSession: Send + Sync {
    async fn stop(&self);
}

#[async_trait]
pub trait DebugLauncher: Send + Sync {
    /// Start a debug session that runs the tests selected by `request`.
    async fn start(
        &self,
        request: Arc<SelectionRequest>,
        token: CancellationToken,
    ) -> Result<Box<dyn DebugSession>>;
}
