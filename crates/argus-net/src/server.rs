use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::task::JoinHandle;
use tokio_websockets::{Message, ServerBuilder, WebSocketStream};

use argus_detect::{DetectorService, FrameTensor};

use crate::{FrameReply, NetError};

/// WebSocket detection server.
///
/// Accepts duplex connections, reads binary frame payloads, drives the
/// decode → tensor → inference pipeline, and replies with JSON on the same
/// connection. Each connection is served by its own task and processes one
/// frame at a time in arrival order; connections fail independently.
pub struct DetectServer {
    local_addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    _accept_task: JoinHandle<()>,
}

impl DetectServer {
    /// Bind a TCP listener and start accepting connections.
    ///
    /// The detector handle is shared by every connection; the model itself
    /// is loaded lazily on the first frame.
    pub async fn bind(
        addr: impl ToSocketAddrs,
        service: Arc<DetectorService>,
    ) -> Result<Self, NetError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let connections = Arc::new(AtomicUsize::new(0));
        let accept_connections = connections.clone();

        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        let service = service.clone();
                        let connections = accept_connections.clone();
                        tokio::spawn(async move {
                            match ServerBuilder::new().accept(stream).await {
                                Ok((_request, ws)) => {
                                    connections.fetch_add(1, Ordering::SeqCst);
                                    log::info!("client connected: {peer}");
                                    serve_connection(ws, peer, service).await;
                                    connections.fetch_sub(1, Ordering::SeqCst);
                                    log::info!("client disconnected: {peer}");
                                }
                                Err(e) => {
                                    log::warn!("handshake with {peer} failed: {e}");
                                }
                            }
                        });
                    }
                    Err(e) => {
                        log::warn!("accept error: {e}");
                        // Backoff to prevent CPU spin on persistent errors
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    }
                }
            }
        });

        Ok(Self {
            local_addr,
            connections,
            _accept_task: accept_task,
        })
    }

    /// Return the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connections currently being served.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for DetectServer {
    fn drop(&mut self) {
        self._accept_task.abort();
    }
}

/// Serve one connection until the client disconnects or the transport fails.
///
/// A bad frame produces an error reply and the loop continues; only
/// transport-level failures end the session.
async fn serve_connection(
    mut ws: WebSocketStream<TcpStream>,
    peer: SocketAddr,
    service: Arc<DetectorService>,
) {
    while let Some(item) = ws.next().await {
        let msg = match item {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("connection with {peer} failed: {e}");
                break;
            }
        };

        if msg.is_close() {
            break;
        }
        if !msg.is_binary() {
            // Only binary messages carry frames; ping/pong is handled by
            // the library.
            continue;
        }

        let reply = process_frame(&service, &msg.into_payload()).await;
        let json = match reply.to_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!("reply serialization failed: {e}");
                break;
            }
        };

        if let Err(e) = ws.send(Message::text(json)).await {
            log::warn!("send to {peer} failed: {e}");
            break;
        }
    }
}

/// Run one encoded frame through decode → tensor layout → inference.
///
/// Decode and inference failures are reported as error payloads so the
/// connection stays open.
async fn process_frame(service: &DetectorService, payload: &[u8]) -> FrameReply {
    let raw = match argus_image::decode(payload) {
        Ok(raw) => raw,
        Err(e) => {
            log::debug!("frame decode failed: {e}");
            return FrameReply::error(e.to_string());
        }
    };

    let tensor = match argus_image::detector_tensor(&raw) {
        Ok(tensor) => tensor,
        Err(e) => return FrameReply::error(e.to_string()),
    };
    let frame = match FrameTensor::new(tensor) {
        Ok(frame) => frame,
        Err(e) => return FrameReply::error(e.to_string()),
    };

    match service.detect(frame).await {
        Ok(detections) => {
            log::debug!(
                "{}x{} frame: {} detection(s)",
                raw.width,
                raw.height,
                detections.len()
            );
            FrameReply::Detections(detections)
        }
        Err(e) => {
            log::debug!("inference failed: {e}");
            FrameReply::error(e.to_string())
        }
    }
}
