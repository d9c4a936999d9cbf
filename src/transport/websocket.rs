//! WebSocket transport binding.
//!
//! A concrete [`Transport`] over a remote-debugging WebSocket endpoint.
//! Text frames are JSON protocol messages; the I/O loop runs on a spawned
//! task and delivers inbound frames through the registered message
//! handler.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::driver::{MessageHandler, Transport};
use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// Message handler slot shared with the event loop.
type SharedHandler = Arc<Mutex<Option<MessageHandler>>>;

/// Stream type produced by the client connector.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// TransportCommand
// ============================================================================

/// Internal commands for the event loop.
enum TransportCommand {
    /// Serialize and send one outbound frame.
    Send {
        frame: Value,
        ack: oneshot::Sender<Result<()>>,
    },
    /// Close the connection.
    Shutdown,
}

// ============================================================================
// WebSocketTransport
// ============================================================================

/// WebSocket connection to a remote-debugging endpoint.
///
/// # Example
///
/// ```no_run
/// use session_recorder::WebSocketTransport;
///
/// # async fn example() -> session_recorder::Result<()> {
/// let transport = WebSocketTransport::connect("ws://127.0.0.1:9222/devtools/browser").await?;
/// # Ok(())
/// # }
/// ```
pub struct WebSocketTransport {
    /// Channel into the event loop.
    command_tx: mpsc::UnboundedSender<TransportCommand>,
    /// Inbound delivery hook (shared with the event loop).
    handler: SharedHandler,
}

impl std::fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketTransport").finish_non_exhaustive()
    }
}

impl WebSocketTransport {
    /// Connects to a WebSocket endpoint and spawns the event loop.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the endpoint is not a valid URL
    /// - [`Error::WebSocket`] if the connection cannot be established
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::connection(format!("Invalid endpoint '{endpoint}': {e}")))?;

        let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        debug!(endpoint = %url, "Transport connected");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let handler: SharedHandler = Arc::new(Mutex::new(None));

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&handler),
        ));

        Ok(Self {
            command_tx,
            handler,
        })
    }

    /// Closes the connection gracefully.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(TransportCommand::Shutdown);
    }

    /// Event loop handling WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<TransportCommand>,
        handler: SharedHandler,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Inbound frames from the remote end
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::deliver(&text, &handler);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Outbound commands from the Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(TransportCommand::Send { frame, ack }) => {
                            let result = match serde_json::to_string(&frame) {
                                Ok(json) => ws_write
                                    .send(Message::Text(json.into()))
                                    .await
                                    .map_err(Error::from),
                                Err(e) => Err(Error::Json(e)),
                            };
                            let _ = ack.send(result);
                        }

                        Some(TransportCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        debug!("Transport event loop terminated");
    }

    /// Parses one inbound text frame and delivers it through the hook.
    fn deliver(text: &str, handler: &SharedHandler) {
        match serde_json::from_str::<Value>(text) {
            Ok(message) => {
                let guard = handler.lock();
                if let Some(handler) = guard.as_ref() {
                    handler(message);
                } else {
                    trace!("Inbound frame before handler registration; dropped");
                }
            }
            Err(e) => {
                warn!(error = %e, "Non-JSON frame dropped");
            }
        }
    }
}

// ============================================================================
// Transport Implementation
// ============================================================================

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&self, message: Value) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();

        self.command_tx
            .send(TransportCommand::Send {
                frame: message,
                ack: ack_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        ack_rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    fn set_message_handler(&self, handler: MessageHandler) {
        *self.handler.lock() = Some(handler);
    }
}

// ============================================================================
// Tests
// ============================================================================
