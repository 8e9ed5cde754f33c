//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span, see [`make_request_span`])
//! 3. Request ID (fills the span's `request_id`)
//! 4. Security headers (no inline scripts, no framing)
//! 5. HTMX toasts (error responses to toast fragments)
//! 6. Session layer (tower-sessions, in-memory store, `SameSite=Strict`)
//!
//! Authentication is an extractor, [`RequireAdminAuth`], rather than a layer,
//! so the login page and health check stay reachable.

pub mod auth;
pub mod htmx;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AdminSession, RequireAdminAuth};
pub use htmx::{HxRequest, htmx_toast_middleware};
pub use request_id::{make_request_span, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
