//! Request pipeline.
//!
//! Every outgoing request passes through the dispatcher's `Pipeline` before
//! the transport sees it. Interceptors only ever add headers.

use log::debug;
use url::Url;

use crate::csrf::{is_safe_method, CsrfToken};
use crate::request::OutgoingRequest;

pub const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";

/// A step in the request pipeline.
pub trait Interceptor: Send + Sync {
    fn before_send(&self, request: &mut OutgoingRequest, page: &Url);
}

/// Attaches the CSRF token to same-origin, state-changing requests.
pub struct CsrfInterceptor {
    token: Option<CsrfToken>,
    header_name: String,
}

impl CsrfInterceptor {
    pub fn new(token: Option<CsrfToken>) -> Self {
        Self::with_header(token, DEFAULT_CSRF_HEADER)
    }

    pub fn with_header(token: Option<CsrfToken>, header_name: &str) -> Self {
        Self {
            token,
            header_name: header_name.to_string(),
        }
    }
}

impl Interceptor for CsrfInterceptor {
    fn before_send(&self, request: &mut OutgoingRequest, page: &Url) {
        if is_safe_method(&request.method) || !request.is_same_origin(page) {
            return;
        }
        match &self.token {
            Some(token) => request.set_header(&self.header_name, token.as_str()),
            None => debug!(
                "No CSRF token available for {} {}",
                request.method, request.url
            ),
        }
    }
}

/// Marks same-origin requests as AJAX, the way a browser XHR library does.
pub struct RequestedWithInterceptor;

impl Interceptor for RequestedWithInterceptor {
    fn before_send(&self, request: &mut OutgoingRequest, page: &Url) {
        if request.is_same_origin(page) {
            request.set_header("X-Requested-With", "XMLHttpRequest");
        }
    }
}

/// Ordered list of interceptors bound to the page they run for.
pub struct Pipeline {
    page: Url,
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl Pipeline {
    pub fn new(page: Url) -> Self {
        Self {
            page,
            interceptors: Vec::new(),
        }
    }

    /// The standard pipeline: AJAX marker, then CSRF.
    pub fn standard(page: Url, csrf: CsrfInterceptor) -> Self {
        Self::new(page).with(RequestedWithInterceptor).with(csrf)
    }

    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn page(&self) -> &Url {
        &self.page
    }

    pub fn apply(&self, request: &mut OutgoingRequest) {
        for interceptor in &self.interceptors {
            interceptor.before_send(request, &self.page);
        }
    }
}
