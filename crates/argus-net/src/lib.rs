//! Duplex transport between capture clients and the detection server.
//!
//! Upstream messages are binary WebSocket payloads, each one complete
//! compressed still image. Downstream messages are UTF-8 JSON text: a
//! detection array or `{"error": "..."}`.

pub mod client;
pub mod error;
pub mod server;
pub mod wire;

pub use client::{DetectClient, FrameSink, ReplyStream};
pub use error::NetError;
pub use server::DetectServer;
pub use wire::{ErrorReply, FrameReply};
