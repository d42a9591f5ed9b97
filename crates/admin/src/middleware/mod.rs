//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main.rs`)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers (no caching, no framing)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is per handler via the [`RequireAdminAuth`] extractor.

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
