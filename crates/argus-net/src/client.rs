use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use http::Uri;
use tokio::net::TcpStream;
use tokio_websockets::{ClientBuilder, MaybeTlsStream, Message, WebSocketStream};

use crate::{FrameReply, NetError};

type ClientWs = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Duplex client for the detection server.
///
/// Sends complete encoded frames as binary messages and parses the JSON
/// replies. `split` yields independent send/receive halves so a capture
/// loop and a reply reader can run concurrently on one connection.
pub struct DetectClient {
    ws: ClientWs,
}

impl DetectClient {
    /// Connect to a server by socket address.
    pub async fn connect(addr: SocketAddr) -> Result<Self, NetError> {
        let uri: Uri = format!("ws://{addr}")
            .parse()
            .map_err(|e| NetError::Protocol(format!("invalid server address: {e}")))?;
        Self::connect_uri(uri).await
    }

    /// Connect to a `ws://host:port` URI.
    pub async fn connect_uri(uri: Uri) -> Result<Self, NetError> {
        let (ws, _response) = ClientBuilder::from_uri(uri).connect().await?;
        Ok(Self { ws })
    }

    /// Send one encoded frame as a single binary message.
    pub async fn send_frame(&mut self, frame: Vec<u8>) -> Result<(), NetError> {
        self.ws
            .send(Message::binary(frame))
            .await
            .map_err(NetError::from)
    }

    /// Receive the next downstream reply, skipping non-text traffic.
    ///
    /// # Errors
    ///
    /// `NetError::ConnectionClosed` when the server closes the connection,
    /// `NetError::Protocol` if a text message is not a valid reply.
    pub async fn next_reply(&mut self) -> Result<FrameReply, NetError> {
        while let Some(item) = self.ws.next().await {
            let msg = item?;
            if msg.is_close() {
                return Err(NetError::ConnectionClosed);
            }
            if let Some(text) = msg.as_text() {
                return FrameReply::from_json(text);
            }
        }
        Err(NetError::ConnectionClosed)
    }

    /// Split into independent sending and receiving halves.
    pub fn split(self) -> (FrameSink, ReplyStream) {
        let (sink, stream) = self.ws.split();
        (FrameSink { sink }, ReplyStream { stream })
    }
}

/// Sending half of a split [`DetectClient`].
pub struct FrameSink {
    sink: SplitSink<ClientWs, Message>,
}

impl FrameSink {
    pub async fn send_frame(&mut self, frame: Vec<u8>) -> Result<(), NetError> {
        self.sink
            .send(Message::binary(frame))
            .await
            .map_err(NetError::from)
    }
}

/// Receiving half of a split [`DetectClient`].
pub struct ReplyStream {
    stream: SplitStream<ClientWs>,
}

impl ReplyStream {
    pub async fn next_reply(&mut self) -> Result<FrameReply, NetError> {
        while let Some(item) = self.stream.next().await {
            let msg = item?;
            if msg.is_close() {
                return Err(NetError::ConnectionClosed);
            }
            if let Some(text) = msg.as_text() {
                return FrameReply::from_json(text);
            }
        }
        Err(NetError::ConnectionClosed)
    }
}
