//! Session-bound client for the assistant backend.
//!
//! The backend keeps conversational context server side and hands out a
//! session token with every reply. [`ChatSession`] carries that token into
//! each following request and allows one request in flight at a time.

use crate::api::{ChatReply, ChatRequest, SessionToken};
use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error};

/// Assistant text substituted for any transport failure.
pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug)]
pub enum TransportError {
    /// The request never produced a response (connect, timeout, TLS...).
    Request(reqwest::Error),
    /// The backend answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body did not match the reply schema.
    Decode(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(err) => write!(f, "Request failed: {err}"),
            TransportError::Status { status, body } => {
                if body.trim().is_empty() {
                    write!(f, "Backend returned HTTP {status}")
                } else {
                    write!(f, "Backend returned HTTP {status}: {}", body.trim())
                }
            }
            TransportError::Decode(detail) => write!(f, "Malformed reply: {detail}"),
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Request(err) => Some(err),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError>;
}

/// Posts JSON to `<endpoint>/chat`.
pub struct HttpTransport {
    client: reqwest::Client,
    chat_url: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Request)?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            chat_url: chat_url(endpoint),
        }
    }
}

pub(crate) fn chat_url(endpoint: &str) -> String {
    format!("{}/chat", endpoint.trim_end_matches('/'))
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        let response = self
            .client
            .post(&self.chat_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(TransportError::Request)?;
        serde_json::from_str(&body).map_err(|err| TransportError::Decode(err.to_string()))
    }
}

/// Returned when a send is attempted while another is still awaiting its
/// reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    Busy,
}

impl fmt::Display for SendRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendRejected::Busy => write!(f, "A message is already being sent"),
        }
    }
}

impl StdError for SendRejected {}

/// Assistant text produced by one send, with whether it came from the
/// backend or is the fallback apology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub text: String,
    pub fallback: bool,
}

pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    session_id: Mutex<Option<SessionToken>>,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            session_id: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> Option<SessionToken> {
        self.session_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Forget the backend session; the next send starts a new one.
    pub fn reset(&self) {
        *self
            .session_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Send `message` and wait for the reply. Transport failures are logged
    /// and turned into [`APOLOGY_MESSAGE`] with the session token untouched.
    pub async fn send(&self, message: &str) -> Result<SendOutcome, SendRejected> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(SendRejected::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let request = ChatRequest {
            message: message.to_string(),
            session_id: self.session_id(),
        };
        debug!(
            session = ?request.session_id.as_ref().map(ToString::to_string),
            len = message.len(),
            "Sending chat message"
        );

        match self.transport.send(&request).await {
            Ok(reply) => {
                debug!(session = %reply.session_id, "Received chat reply");
                *self
                    .session_id
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(reply.session_id);
                Ok(SendOutcome {
                    text: reply.message,
                    fallback: false,
                })
            }
            Err(err) => {
                error!(error = %err, "Error sending message to assistant");
                Ok(SendOutcome {
                    text: APOLOGY_MESSAGE.to_string(),
                    fallback: true,
                })
            }
        }
    }
}
