//! Server lifecycle traits
//!
//! [`Server`] is what the binary drives; [`ServerExt`] adds the spawn and
//! Ctrl+C conveniences on top of it.

use async_trait::async_trait;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

#[async_trait]
pub trait Server: Send + Sync + 'static {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Bound address while running, `None` otherwise
    fn address(&self) -> Option<SocketAddr>;

    fn is_running(&self) -> bool;

    /// Serve until `shutdown` is cancelled, then drain in-flight requests.
    ///
    /// A prediction already running when shutdown starts is allowed to
    /// finish; no new requests are accepted.
    async fn run(&self, shutdown: CancellationToken) -> Result<()>;
}

pub trait ServerExt: Server + Sized {
    /// Run on a background task; cancel the returned token to stop it.
    fn spawn(self) -> (tokio::task::JoinHandle<Result<()>>, CancellationToken) {
        let token = CancellationToken::new();
        let token_clone = token.clone();
        let handle = tokio::spawn(async move { self.run(token_clone).await });
        (handle, token)
    }

    /// Run until Ctrl+C.
    fn run_with_ctrl_c(self) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            let shutdown = crate::shutdown::ShutdownController::with_ctrl_c();
            self.run(shutdown.token()).await
        }
    }
}

impl<T: Server + Sized> ServerExt for T {}
