//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers.rs (/match, /health) or admin (/admin/*)
//!     → CampaignCache lookup on the blocking pool
//!     → JSON response
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use handlers::{MatchRequest, MatchResponse};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
