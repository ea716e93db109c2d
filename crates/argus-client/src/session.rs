use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use argus_net::{DetectClient, FrameReply, FrameSink, NetError, ReplyStream};

use crate::{overlay, Camera, DetectionCache, DisplaySink, RgbFrame, SessionConfig};

/// Most recent captured frame, shared between the capture loop and the
/// renderer.
#[derive(Clone, Default)]
struct LatestFrame {
    inner: Arc<RwLock<Option<RgbFrame>>>,
}

impl LatestFrame {
    fn store(&self, frame: RgbFrame) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(frame);
    }

    fn current(&self) -> Option<RgbFrame> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// A running capture-and-overlay session.
///
/// Three tasks on one runtime: the capture timer (camera → JPEG → send,
/// subject to the admission rule), the reply intake (JSON → detection
/// cache), and the redraw timer (latest frame + cache → sink). The timers
/// are independent; neither waits on the other or on the network.
pub struct StreamSession {
    stop: watch::Sender<bool>,
    capture_task: JoinHandle<()>,
    intake_task: JoinHandle<()>,
    render_task: JoinHandle<()>,
    cache: DetectionCache,
    connected: Arc<AtomicBool>,
}

impl StreamSession {
    /// Start streaming from `camera` over `client`, presenting overlays to
    /// `sink`.
    ///
    /// The camera is owned by the capture loop from here on and is released
    /// when the session stops.
    pub fn start<C, D>(
        camera: C,
        client: DetectClient,
        sink: D,
        config: SessionConfig,
    ) -> Self
    where
        C: Camera + Send + 'static,
        D: DisplaySink + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        let cache = DetectionCache::new();
        let latest = LatestFrame::default();
        let connected = Arc::new(AtomicBool::new(true));

        let (frame_sink, reply_stream) = client.split();

        let capture_task = tokio::spawn(capture_loop(
            camera,
            frame_sink,
            latest.clone(),
            connected.clone(),
            config.clone(),
            stop_rx.clone(),
        ));
        let intake_task = tokio::spawn(intake_loop(
            reply_stream,
            cache.clone(),
            connected.clone(),
            stop_rx.clone(),
        ));
        let render_task = tokio::spawn(render_loop(
            sink,
            latest,
            cache.clone(),
            config,
            stop_rx,
        ));

        Self {
            stop: stop_tx,
            capture_task,
            intake_task,
            render_task,
            cache,
            connected,
        }
    }

    /// Handle to the session's detection cache.
    pub fn cache(&self) -> DetectionCache {
        self.cache.clone()
    }

    /// Whether the connection is still accepting frames.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Stop both timers and the reply intake, releasing the camera.
    ///
    /// Returns only after every task has finished, so the camera is
    /// guaranteed released and no further frame is transmitted once this
    /// completes.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.capture_task.await;
        let _ = self.intake_task.await;
        let _ = self.render_task.await;
    }
}

async fn capture_loop<C: Camera + Send>(
    mut camera: C,
    mut sink: FrameSink,
    latest: LatestFrame,
    connected: Arc<AtomicBool>,
    config: SessionConfig,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.capture_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = ticker.tick() => {
                let frame = match camera.recv().await {
                    Ok(frame) => frame,
                    Err(e) => {
                        log::warn!("capture failed: {e}");
                        continue;
                    }
                };
                latest.store(frame.clone());

                // Admission rule: a frame that cannot be sent right now is
                // dropped, never queued.
                if !connected.load(Ordering::SeqCst) {
                    continue;
                }
                let jpeg = match argus_image::encode_jpeg(&frame.pixels, config.jpeg_quality()) {
                    Ok(jpeg) => jpeg,
                    Err(e) => {
                        log::warn!("frame encode failed: {e}");
                        continue;
                    }
                };
                if let Err(e) = sink.send_frame(jpeg).await {
                    log::warn!("frame send failed, dropping: {e}");
                    connected.store(false, Ordering::SeqCst);
                }
            }
        }
    }

    // Capture owns the camera; ending the loop releases the device.
    drop(camera);
}

async fn intake_loop(
    mut replies: ReplyStream,
    cache: DetectionCache,
    connected: Arc<AtomicBool>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = stop.changed() => break,
            reply = replies.next_reply() => match reply {
                Ok(FrameReply::Detections(detections)) => {
                    cache.replace(detections);
                }
                Ok(FrameReply::Error(err)) => {
                    log::warn!("server reported: {}", err.error);
                }
                Err(NetError::ConnectionClosed) => {
                    log::info!("connection closed by server");
                    connected.store(false, Ordering::SeqCst);
                    break;
                }
                Err(e) => {
                    log::warn!("reply intake failed: {e}");
                    connected.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }
}

async fn render_loop<D: DisplaySink>(
    mut sink: D,
    latest: LatestFrame,
    cache: DetectionCache,
    config: SessionConfig,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.redraw_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = ticker.tick() => {
                // Redraw from the latest frame even when no new detections
                // arrived; never request detection work from here.
                let Some(frame) = latest.current() else {
                    continue;
                };
                let surface = overlay::render(&frame, &cache.current());
                if let Err(e) = sink.present(&surface) {
                    log::warn!("present failed: {e}");
                }
            }
        }
    }
}
