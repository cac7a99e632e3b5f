//! HTTP transports

use std::sync::Arc;

use crate::request::{Method, Request};
use crate::{NetError, Response};

/// Sends requests to the application server
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, NetError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response, NetError> {
        (**self).send(request).await
    }
}

/// Transport backed by reqwest's blocking client
///
/// Requests run on smol's blocking pool so the calling task only awaits.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("pushkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    fn execute(client: &reqwest::blocking::Client, req: Request) -> Result<Response, NetError> {
        let method = match req.method {
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = client.request(method, req.url.as_str());
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .map_err(|e| NetError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .map_err(|e| NetError::Network(e.to_string()))?
            .to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, NetError> {
        tracing::info!("HTTP {} {}", request.method.as_str(), request.url);

        let client = self.client.clone();
        let response = smol::unblock(move || Self::execute(&client, request)).await?;
        tracing::debug!("HTTP {} ({} bytes)", response.status, response.body.len());
        Ok(response)
    }
}
