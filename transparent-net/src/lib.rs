//! Client-side action dispatch for the transparent site.
//!
//! Reads the CSRF token from the page's cookies, decorates same-origin
//! state-changing requests with it, and sends toggle and vote actions
//! without blocking the caller.

pub mod config;
pub mod csrf;
pub mod dispatcher;
pub mod error;
pub mod form;
pub mod interceptor;
pub mod request;
pub mod transport;

pub use config::Config;
pub use csrf::{get_cookie, is_safe_method, CsrfToken};
pub use dispatcher::{DispatchEvent, Endpoints, RequestDispatcher};
pub use error::{ConfigError, DispatchError};
pub use interceptor::{CsrfInterceptor, Interceptor, Pipeline, RequestedWithInterceptor};
pub use request::{OutgoingRequest, Response};
pub use transport::{HttpTransport, Transport};
