//! Recording transport
//!
//! Answers every request with a canned response and keeps a copy of what
//! was sent.

use std::sync::{Mutex, PoisonError};

use crate::request::Request;
use crate::transport::HttpTransport;
use crate::{NetError, Response};

#[derive(Debug)]
enum Reply {
    Respond(Response),
    Fail(String),
}

/// In-memory transport
#[derive(Debug)]
pub struct RecordingTransport {
    reply: Reply,
    requests: Mutex<Vec<Request>>,
}

impl RecordingTransport {
    /// Replies `status` with `body`
    pub fn respond(status: u16, body: &str) -> Self {
        Self {
            reply: Reply::Respond(Response::new(status, body)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies `200 {"status": "ok"}`
    pub fn ok() -> Self {
        Self::respond(200, r#"{"status": "ok"}"#)
    }

    /// Fails every request before a response arrives
    pub fn unreachable(reason: &str) -> Self {
        Self {
            reply: Reply::Fail(reason.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests sent so far, oldest first
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HttpTransport for RecordingTransport {
    async fn send(&self, request: Request) -> Result<Response, NetError> {
        tracing::debug!("Recorded {} {}", request.method.as_str(), request.url);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(reason) => Err(NetError::Network(reason.clone())),
        }
    }
}
