//! Stdio history server
//!
//! Line-delimited JSON-RPC 2.0: one request per input line, one response per
//! output line. Lets out-of-process collaborators (dialogue engine, editor)
//! record into and play back a single shared `SessionHistory`.

mod handlers;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::history::SessionHistory;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

pub use handlers::{dispatch, HandlerError};

/// Errors that stop the server loop
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON-RPC server bound to a reader/writer pair
pub struct HistoryServer<R, W> {
    history: Arc<SessionHistory>,
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> HistoryServer<R, W> {
    pub fn new(history: Arc<SessionHistory>, reader: R, writer: W) -> Self {
        Self {
            history,
            reader,
            writer,
        }
    }

    /// Serve requests until the reader is exhausted
    pub fn run(&mut self) -> Result<usize, ServerError> {
        let mut line = String::new();
        let mut handled = 0;
        while self.reader.read_line(&mut line)? > 0 {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                self.handle_line(trimmed)?;
                handled += 1;
            }
            line.clear();
        }
        Ok(handled)
    }

    /// Handle a single request line
    fn handle_line(&mut self, request_str: &str) -> Result<(), ServerError> {
        let request: JsonRpcRequest = match serde_json::from_str(request_str) {
            Ok(req) => req,
            Err(e) => return self.send(&JsonRpcError::parse_error(e.to_string())),
        };

        if !request.is_valid() {
            let id = request.id.unwrap_or(Value::Null);
            return self.send(&JsonRpcError::invalid_request(id, "jsonrpc must be '2.0'"));
        }

        let is_notification = request.is_notification();
        let id = request.id.unwrap_or(Value::Null);
        let outcome = dispatch(&self.history, &request.method, request.params);

        if is_notification {
            if let Err(e) = outcome {
                tracing::debug!(method = %request.method, error = %e, "notification failed");
            }
            return Ok(());
        }

        match outcome {
            Ok(result) => self.send(&JsonRpcResponse::new(id, result)),
            Err(HandlerError::MethodNotFound(method)) => {
                self.send(&JsonRpcError::method_not_found(id, &method))
            }
            Err(HandlerError::InvalidParams(details)) => {
                self.send(&JsonRpcError::invalid_params(id, details))
            }
            Err(e @ HandlerError::Encode(_)) => {
                self.send(&JsonRpcError::internal_error(id, e.to_string()))
            }
        }
    }

    fn send<T: Serialize>(&mut self, message: &T) -> Result<(), ServerError> {
        let json = serde_json::to_string(message)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Give back the writer (used by tests to inspect output)
    pub fn into_writer(self) -> W {
        self.writer
    }
}
