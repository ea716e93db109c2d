use std::sync::{Arc, Mutex};

use argus_base::Tensor;

/// Where rendered overlay surfaces are presented.
///
/// Called once per redraw tick with the fully annotated RGB frame.
pub trait DisplaySink: Send {
    fn present(&mut self, surface: &Tensor<u8>) -> std::io::Result<()>;
}

/// Sink that discards every surface.
#[derive(Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn present(&mut self, _surface: &Tensor<u8>) -> std::io::Result<()> {
        Ok(())
    }
}

/// Sink that keeps the most recent surface and a present counter.
///
/// The handle side can be cloned and read from outside the session.
#[derive(Clone, Default)]
pub struct BufferSink {
    state: Arc<Mutex<BufferState>>,
}

#[derive(Default)]
struct BufferState {
    latest: Option<Tensor<u8>>,
    presented: usize,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently presented surface, if any.
    pub fn latest(&self) -> Option<Tensor<u8>> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .latest
            .clone()
    }

    /// Number of surfaces presented so far.
    pub fn presented(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .presented
    }
}

impl DisplaySink for BufferSink {
    fn present(&mut self, surface: &Tensor<u8>) -> std::io::Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.latest = Some(surface.clone());
        state.presented += 1;
        Ok(())
    }
}
