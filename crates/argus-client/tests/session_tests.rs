use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use argus_base::Tensor;
use argus_client::overlay::BOX_COLOR;
use argus_client::{
    BufferSink, Camera, CameraError, RgbFrame, SessionConfig, StreamSession,
};
use argus_detect::{BlobModel, DetectorService};
use argus_net::{DetectClient, DetectServer};
use futures_util::StreamExt;
use tokio::time::sleep;

/// Camera serving a fixed bright-square frame, tracking call count and
/// release.
struct FakeCamera {
    frames_served: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl FakeCamera {
    fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let frames_served = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicBool::new(false));
        (
            Self {
                frames_served: frames_served.clone(),
                released: released.clone(),
            },
            frames_served,
            released,
        )
    }

    fn frame() -> RgbFrame {
        let mut data = vec![0u8; 64 * 64 * 3];
        for y in 16..32 {
            for x in 16..32 {
                let idx = (y * 64 + x) * 3;
                data[idx] = 255;
                data[idx + 1] = 255;
                data[idx + 2] = 255;
            }
        }
        RgbFrame::new(Tensor::new(vec![64, 64, 3], data).unwrap()).unwrap()
    }
}

impl Camera for FakeCamera {
    async fn recv(&mut self) -> Result<RgbFrame, CameraError> {
        self.frames_served.fetch_add(1, Ordering::SeqCst);
        Ok(Self::frame())
    }
}

impl Drop for FakeCamera {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig::default()
        .with_capture_interval(Duration::from_millis(20))
        .with_redraw_interval(Duration::from_millis(20))
}

async fn detect_server() -> DetectServer {
    let service = Arc::new(DetectorService::with_model(Arc::new(BlobModel::new())));
    DetectServer::bind("127.0.0.1:0", service)
        .await
        .expect("bind failed")
}

/// Server that completes the handshake and reads frames but never replies.
/// Returns the bind address and a count of binary messages received.
async fn silent_server(close_after: Option<usize>) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(AtomicUsize::new(0));
    let server_received = received.clone();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let received = server_received.clone();
            tokio::spawn(async move {
                let Ok((_request, mut ws)) =
                    tokio_websockets::ServerBuilder::new().accept(stream).await
                else {
                    return;
                };
                let mut seen = 0usize;
                while let Some(Ok(msg)) = ws.next().await {
                    if msg.is_binary() {
                        seen += 1;
                        received.fetch_add(1, Ordering::SeqCst);
                        if close_after.is_some_and(|limit| seen >= limit) {
                            break;
                        }
                    }
                }
                // Dropping the stream closes the connection.
            });
        }
    });

    (addr, received)
}

#[tokio::test]
async fn test_end_to_end_detections_reach_cache_and_overlay() {
    let server = detect_server().await;
    let client = DetectClient::connect(server.local_addr()).await.unwrap();

    let (camera, _frames, released) = FakeCamera::new();
    let sink = BufferSink::new();

    let session = StreamSession::start(camera, client, sink.clone(), fast_config());
    sleep(Duration::from_millis(500)).await;

    let detections = session.cache().current();
    assert_eq!(detections.len(), 1, "expected the bright square detected");
    assert!(sink.presented() >= 2);

    // The rendered surface carries the detection rectangle.
    let surface = sink.latest().expect("no surface presented");
    let has_box_pixel = surface
        .data
        .chunks_exact(3)
        .any(|p| p == BOX_COLOR);
    assert!(has_box_pixel, "overlay box not drawn");

    session.stop().await;
    assert!(released.load(Ordering::SeqCst), "camera not released");
}

#[tokio::test]
async fn test_redraw_continues_while_delivery_is_paused() {
    // Server never replies, so no detection set ever arrives.
    let (addr, _received) = silent_server(None).await;
    let client = DetectClient::connect(addr).await.unwrap();

    let (camera, _frames, _released) = FakeCamera::new();
    let sink = BufferSink::new();

    let session = StreamSession::start(camera, client, sink.clone(), fast_config());
    sleep(Duration::from_millis(300)).await;

    assert!(
        sink.presented() >= 3,
        "redraw must fire independently of message arrival"
    );
    assert!(session.cache().is_empty());

    // Last-known set is empty, so the overlay draws zero boxes.
    let surface = sink.latest().expect("no surface presented");
    assert!(!surface.data.chunks_exact(3).any(|p| p == BOX_COLOR));

    session.stop().await;
}

#[tokio::test]
async fn test_stop_releases_camera_and_halts_transmission() {
    let (addr, received) = silent_server(None).await;
    let client = DetectClient::connect(addr).await.unwrap();

    let (camera, _frames, released) = FakeCamera::new();

    let session = StreamSession::start(camera, client, BufferSink::new(), fast_config());
    sleep(Duration::from_millis(200)).await;
    assert!(received.load(Ordering::SeqCst) > 0);

    session.stop().await;
    assert!(released.load(Ordering::SeqCst), "camera not released");

    // Let any frame already on the wire drain before snapshotting.
    sleep(Duration::from_millis(50)).await;
    let sent_at_stop = received.load(Ordering::SeqCst);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(
        received.load(Ordering::SeqCst),
        sent_at_stop,
        "no frame may be transmitted after stop"
    );
}

#[tokio::test]
async fn test_closed_connection_drops_frames_but_capture_continues() {
    // Server closes the connection after the first frame.
    let (addr, received) = silent_server(Some(1)).await;
    let client = DetectClient::connect(addr).await.unwrap();

    let (camera, frames_served, _released) = FakeCamera::new();

    let session = StreamSession::start(camera, client, BufferSink::new(), fast_config());
    sleep(Duration::from_millis(300)).await;

    assert!(!session.is_connected(), "session should notice the close");

    // Capture keeps running; unsendable frames are dropped, not queued.
    let before = frames_served.load(Ordering::SeqCst);
    sleep(Duration::from_millis(200)).await;
    let after = frames_served.load(Ordering::SeqCst);
    assert!(after > before, "capture loop must keep ticking");
    assert!(received.load(Ordering::SeqCst) <= 2);

    session.stop().await;
}
