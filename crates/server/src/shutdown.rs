//! Graceful shutdown built on `CancellationToken`

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns the shutdown token handed to a running server.
#[derive(Clone)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Controller whose token is cancelled on Ctrl+C
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown...");
                    token.cancel();
                }
                Err(e) => {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
            }
        });

        controller
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}
