//! HTTP transport for VolRegime
//!
//! The [`api`] router exposes prediction, feed ingestion and data reads over
//! a shared [`api::AppState`]. [`HttpServer`] runs that router through the
//! [`Server`] trait so the binary gets a uniform lifecycle: bind, serve,
//! and drain on shutdown.
//!
//! Shutdown coordination uses `CancellationToken` from `tokio_util`.
//!
//! ```ignore
//! use server::{api, HttpServer, ServerConfig, ServerExt};
//!
//! let state = api::AppState::new(service, ServiceInfo::new("volregime", "1.0.0"));
//! let config = ServerConfig::new("127.0.0.1", 8000);
//! let server = HttpServer::new(config.clone(), api::create_router(state, config.cors_allow_any_origin));
//! server.run_with_ctrl_c().await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod shutdown;
pub mod traits;

pub use api::{create_router, AppState};
pub use config::{ServerConfig, DEFAULT_HTTP_PORT};
pub use error::{Result, ServerError};
pub use health::{HealthStatus, ServiceInfo};
pub use http::HttpServer;
pub use shutdown::ShutdownController;
pub use traits::{Server, ServerExt};
