use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use tokio::sync::Mutex;

use super::{McpTransport, TransportError, REQUEST_TIMEOUT};
use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Session header issued by streamable-HTTP servers on `initialize`.
pub(crate) const SESSION_HEADER: &str = "mcp-session-id";

/// HTTP transport: one POST per JSON-RPC message.
///
/// The server may answer a request with `application/json` (the response
/// itself) or `text/event-stream` (a short SSE stream whose `data:` events
/// carry the response). A session id returned by the server is echoed on
/// every later message and released with `DELETE` on shutdown.
pub struct HttpTransport {
    http: Client,
    url: Url,
    session_id: Mutex<Option<String>>,
    next_id: AtomicU64,
    alive: AtomicBool,
}

impl HttpTransport {
    pub fn new(url: Url) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url,
            session_id: Mutex::new(None),
            next_id: AtomicU64::new(1),
            alive: AtomicBool::new(true),
        })
    }

    /// Session id issued by the server, if any.
    pub async fn session_id(&self) -> Option<String> {
        self.session_id.lock().await.clone()
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// POST a JSON-RPC message, attaching the session id when we have one.
    async fn post<T: serde::Serialize + ?Sized>(&self, body: &T) -> Result<Response, TransportError> {
        let mut rb = self
            .http
            .post(self.url.clone())
            .header(ACCEPT, "application/json, text/event-stream")
            .json(body);

        if let Some(ref id) = *self.session_id.lock().await {
            rb = rb.header(SESSION_HEADER, id);
        }

        let resp = rb.send().await.map_err(from_reqwest)?;

        if let Some(id) = resp
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            let mut session = self.session_id.lock().await;
            if session.as_deref() != Some(id) {
                tracing::debug!(session_id = %id, "MCP HTTP session established");
                *session = Some(id.to_owned());
            }
        }

        if !resp.status().is_success() {
            let status = resp.status();
            if status == StatusCode::NOT_FOUND && self.session_id.lock().await.is_some() {
                // The server forgot our session; nothing more will succeed.
                self.alive.store(false, Ordering::SeqCst);
            }
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }

    /// Read the response to request `id` from an SSE body.
    ///
    /// Raw bytes are buffered until an event is complete, so a multibyte
    /// character or a CRLF split across chunks decodes intact.
    async fn read_event_stream(&self, mut resp: Response, id: u64) -> Result<JsonRpcResponse, TransportError> {
        let mut buffer: Vec<u8> = Vec::new();
        loop {
            let chunk = resp.chunk().await.map_err(from_reqwest)?;
            let finished = chunk.is_none();
            match chunk {
                Some(bytes) => buffer.extend_from_slice(&bytes),
                None if !buffer.iter().all(u8::is_ascii_whitespace) => buffer.extend_from_slice(b"\n\n"),
                None => {}
            }

            for data in drain_data_lines(&mut buffer) {
                match serde_json::from_str::<JsonRpcResponse>(&data) {
                    Ok(msg) if msg.id == id => return Ok(msg),
                    Ok(msg) => {
                        tracing::debug!(expected_id = id, got_id = msg.id, "skipping response for different request");
                    }
                    Err(_) => {
                        tracing::debug!(data = %data, "skipping non-response SSE event");
                    }
                }
            }

            if finished {
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "event stream ended before the response arrived",
                )));
            }
        }
    }
}

// An attempt abandoned mid-handshake (e.g. a connect timeout) never reaches
// `shutdown`; release its server-side session in the background.
impl Drop for HttpTransport {
    fn drop(&mut self) {
        let Some(session_id) = self.session_id.get_mut().take() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(session_id = %session_id, "MCP HTTP session dropped outside a runtime, not released");
            return;
        };

        tracing::debug!(session_id = %session_id, url = %self.url, "releasing abandoned MCP HTTP session");
        let request = self
            .http
            .delete(self.url.clone())
            .header(SESSION_HEADER, session_id);
        handle.spawn(async move {
            if let Err(e) = request.send().await {
                tracing::debug!(error = %e, "error releasing abandoned MCP HTTP session");
            }
        });
    }
}

#[async_trait]
impl McpTransport for HttpTransport {
    async fn send_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<JsonRpcResponse, TransportError> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(TransportError::ProcessExited);
        }

        let id = self.next_request_id();
        let req = JsonRpcRequest::new(id, method, params);

        tracing::debug!(id, method, url = %self.url, "sending MCP request");
        let resp = self.post(&req).await?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("text/event-stream") {
            return self.read_event_stream(resp, id).await;
        }
        if !content_type.is_empty() && !content_type.starts_with("application/json") {
            return Err(TransportError::Unsupported(format!(
                "unexpected content type `{content_type}`"
            )));
        }

        let body = resp.text().await.map_err(from_reqwest)?;
        let msg: JsonRpcResponse = serde_json::from_str(&body)?;
        if msg.id != id {
            return Err(TransportError::UnexpectedId {
                expected: id,
                got: msg.id,
            });
        }
        Ok(msg)
    }

    async fn send_notification(&self, method: &str) -> Result<(), TransportError> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(TransportError::ProcessExited);
        }
        tracing::debug!(method, "sending MCP notification");
        self.post(&JsonRpcNotification::new(method)).await?;
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        self.alive.store(false, Ordering::SeqCst);

        let Some(session_id) = self.session_id.lock().await.take() else {
            return Ok(());
        };
        let header = HeaderValue::from_str(&session_id)
            .map_err(|e| TransportError::Unsupported(format!("session id header: {e}")))?;

        let resp = self
            .http
            .delete(self.url.clone())
            .header(SESSION_HEADER, header)
            .send()
            .await
            .map_err(from_reqwest)?;

        // 405: the server does not support client-initiated termination.
        let status = resp.status();
        if status.is_success() || status == StatusCode::METHOD_NOT_ALLOWED {
            tracing::debug!(status = status.as_u16(), "MCP HTTP session closed");
            Ok(())
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            })
        }
    }
}

fn from_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Http(e)
    }
}

/// Extract complete `data:` payloads from an SSE byte buffer.
///
/// SSE events are delimited by a blank line (`\n\n` or `\r\n\r\n`); only
/// `data:` lines matter here. Each complete event is decoded once; a
/// trailing partial event stays in the buffer.
pub(crate) fn drain_data_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut data_lines = Vec::new();

    while let Some((end, delim)) = find_event_end(buffer) {
        let block: Vec<u8> = buffer.drain(..end + delim).collect();
        let block = String::from_utf8_lossy(&block[..end]);

        for line in block.lines() {
            let line = line.trim();
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    data_lines.push(data.to_string());
                }
            }
        }
    }

    data_lines
}

/// Position and length of the first blank-line delimiter.
fn find_event_end(buf: &[u8]) -> Option<(usize, usize)> {
    buf.windows(2).enumerate().find_map(|(i, pair)| match pair {
        b"\n\n" => Some((i, 2)),
        b"\n\r" if buf.get(i + 2) == Some(&b'\n') => Some((i, 3)),
        _ => None,
    })
}
