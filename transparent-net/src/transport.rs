//! Sending requests.

use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::Method;

use crate::error::DispatchError;
use crate::request::{OutgoingRequest, Response};

/// Anything that can put a fully decorated request on the wire.
///
/// Called from worker threads, one request per call. Implementations must not
/// retry.
pub trait Transport: Send + Sync {
    fn send(&self, request: &OutgoingRequest) -> Result<Response, DispatchError>;
}

/// HTTP transport backed by a blocking reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        use_proxy: bool,
    ) -> Result<Self, DispatchError> {
        let mut builder = ClientBuilder::new()
            .user_agent(user_agent)
            .pool_max_idle_per_host(4)
            .timeout(timeout);
        if !use_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &OutgoingRequest) -> Result<Response, DispatchError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let res = builder.send()?;
        Ok(Response {
            status: res.status().as_u16(),
        })
    }
}
