//! Field transformers between GraphQL shapes and backend shapes.
//!
//! Every function here is pure and deterministic. Anything time-dependent
//! takes the time as an argument.

pub mod activity;
pub mod auth;
pub mod health;
pub mod message;
pub mod pagination;

pub use auth::ClientInfo;
pub use health::Probe;
pub use pagination::Pagination;
