// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-level request and response shapes, plus the [`Transport`] trait the
//! core depends on.
//!
//! The session manager only needs `send(descriptor) -> {status, body}`;
//! it does not assume a particular protocol library. [`HttpTransport`] is
//! the reqwest-backed implementation used in production.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

/// HTTP method for a request descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// An outbound request before authorization and dispatch.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Absolute API path, joined with the transport's base URL.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Set once a request has been redispatched after a renewal. A retried
    /// request that still gets 401 must not trigger another renewal —
    /// this marker is what terminates the loop.
    pub retried: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: Vec::new(), body: None, retried: false }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        let mut descriptor = Self::new(Method::Post, path);
        descriptor.body = Some(body);
        descriptor
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn mark_retried(mut self) -> Self {
        self.retried = true;
        self
    }
}

/// A completed response: status plus raw body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| TransportError(format!("invalid response body: {e}")))
    }
}

/// Transport-level failure. Never an auth signal: the coordinator does not
/// start a renewal for these.
#[derive(Debug, Clone)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransportError {}

/// The dispatch seam. Implementations must not interpret 401s — expiry
/// handling belongs to the renewal coordinator above this layer.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: RequestDescriptor,
    ) -> Pin<Box<dyn Future<Output = Result<Response, TransportError>> + Send + '_>>;
}

/// reqwest-backed transport joining descriptors with a base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(format!("build http client: {e}")))?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_owned() })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: RequestDescriptor,
    ) -> Pin<Box<dyn Future<Output = Result<Response, TransportError>> + Send + '_>> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, request.path);
            debug!(method = request.method.as_str(), path = %request.path, "dispatching");
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Patch => reqwest::Method::PATCH,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, url);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(ref body) = request.body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| TransportError(format!("request failed: {e}")))?;

            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError(format!("read body: {e}")))?;

            Ok(Response { status, body })
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
