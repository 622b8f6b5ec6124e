//! Hermes Gateway - GraphQL front door for the Hermes messaging backend
//!
//! The gateway exposes a small GraphQL API (accounts, sessions, messages and
//! activity history) and relays every operation to the messaging REST
//! backend. It owns no state: authentication is carried by the
//! `X-Session-Id` and `X-User-Id` headers, and every backend failure is
//! reshaped into a GraphQL error with a stable `extensions.code`.
//!
//! # Architecture
//!
//! ```text
//!  client ──POST /graphql──► server ──► schema ──► handlers ──► backend ──► REST API
//!                              │                     │
//!                          AuthContext          transform
//! ```
//!
//! - [`context`]: session and user identity taken from request headers
//! - [`backend`]: the REST client and the [`Backend`] trait it implements
//! - [`transform`]: pure mappings between backend and GraphQL shapes
//! - [`handlers`]: one handler per GraphQL operation
//! - [`schema`]: the `async-graphql` query and mutation roots
//! - [`server`]: the hyper HTTP server around the schema
//!
//! # Example Usage
//!
//! ```bash
//! $ REST_API_BASE_URL=http://messaging:8080 PORT=4000 hermes-gateway
//! $ hermes-gateway --config /etc/hermes/gateway.toml
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-gateway/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod headers;
pub mod health;
pub mod model;
pub mod schema;
pub mod server;
pub mod shutdown;
pub mod transform;

pub use backend::{Backend, BackendClient, BackendResult};
pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use context::AuthContext;
pub use error::{ErrorCode, GatewayError, GatewayResult, ServerError, ServerResult, StructuredError};
pub use handlers::OperationHandlers;
pub use health::HealthChecker;
pub use schema::{build_schema, GatewaySchema};
pub use server::{GatewayServer, GatewayService};
pub use shutdown::ShutdownSignal;

/// Gateway version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
