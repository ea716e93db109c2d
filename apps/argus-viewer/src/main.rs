use std::path::PathBuf;

use argus_base::log_fatal;
use argus_base::Tensor;
use argus_client::{Camera, DisplaySink, SessionConfig, StreamSession};
use argus_net::DetectClient;

const DEFAULT_SERVER: &str = "127.0.0.1:5000";

/// Sink writing the latest annotated frame as a JPEG file.
struct FileSink {
    path: PathBuf,
}

impl DisplaySink for FileSink {
    fn present(&mut self, surface: &Tensor<u8>) -> std::io::Result<()> {
        let jpeg = argus_image::encode_jpeg(surface, 85)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(&self.path, jpeg)
    }
}

#[tokio::main]
async fn main() {
    argus_base::init_stdout_logger();

    let args: Vec<String> = std::env::args().collect();
    let server = args
        .get(1)
        .cloned()
        .or_else(|| std::env::var("ARGUS_SERVER").ok())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());

    let addr = match tokio::net::lookup_host(&server).await {
        Ok(mut hosts) => match hosts.next() {
            Some(addr) => addr,
            None => log_fatal!("server address {server} did not resolve"),
        },
        Err(e) => log_fatal!("failed to resolve {server}: {e}"),
    };

    let client = match DetectClient::connect(addr).await {
        Ok(client) => client,
        Err(e) => log_fatal!("failed to connect to ws://{addr}: {e}"),
    };
    log::info!("connected to ws://{addr}");

    let output = std::env::var("ARGUS_OUTPUT").unwrap_or_else(|_| "argus-overlay.jpg".to_string());
    let sink = FileSink {
        path: PathBuf::from(&output),
    };
    log::info!("writing annotated frames to {output}");

    run(open_camera(), client, sink).await;
}

#[cfg(feature = "v4l2")]
fn open_camera() -> argus_client::V4l2Camera {
    use argus_client::CameraConfig;

    let device = std::env::var("ARGUS_DEVICE").unwrap_or_else(|_| "/dev/video0".to_string());
    let config = CameraConfig::default().with_device(device.clone());
    match argus_client::V4l2Camera::new(config) {
        Ok(camera) => {
            log::info!("capturing from {device}");
            camera
        }
        Err(e) => log_fatal!("failed to open camera {device}: {e}"),
    }
}

#[cfg(not(feature = "v4l2"))]
fn open_camera() -> argus_client::TestPatternCamera {
    log::info!("no camera backend enabled; using the test pattern");
    argus_client::TestPatternCamera::new(640, 480)
}

async fn run(camera: impl Camera + Send + 'static, client: DetectClient, sink: FileSink) {
    let session = StreamSession::start(camera, client, sink, SessionConfig::default());
    log::info!("streaming; press Ctrl+C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("failed to wait for shutdown signal: {e}");
    }
    session.stop().await;
    log::info!("stopped");
}
