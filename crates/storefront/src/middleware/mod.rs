//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span, see [`make_request_span`])
//! 3. Request ID (fills the span's `request_id`)
//! 4. Security headers (reads the nonce off the response)
//! 5. CSP nonce (per-request nonce for the layout's inline script)
//! 6. HTMX toasts (error responses to toast fragments)
//! 7. Session layer (tower-sessions, in-memory store)

pub mod auth;
pub mod csp;
pub mod htmx;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireLogin, login_url};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use htmx::{HxRequest, htmx_toast_middleware, toast_response};
pub use request_id::{make_request_span, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
