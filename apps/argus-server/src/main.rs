use std::sync::Arc;

use argus_base::log_fatal;
use argus_detect::{BlobModel, DetectorService, FrameTensor};
use argus_net::DetectServer;

const DEFAULT_ADDR: &str = "127.0.0.1:5000";

#[tokio::main]
async fn main() {
    argus_base::init_stdout_logger();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("detect") => {
            let Some(path) = args.get(2) else {
                log_fatal!("usage: argus-server detect <image-path>");
            };
            detect_file(path).await;
        }
        Some("help") | Some("--help") => {
            println!("usage: argus-server [addr]          serve on addr (default {DEFAULT_ADDR})");
            println!("       argus-server detect <image>  run detection once on an image file");
        }
        addr => {
            let addr = addr
                .map(str::to_string)
                .or_else(|| std::env::var("ARGUS_ADDR").ok())
                .unwrap_or_else(|| DEFAULT_ADDR.to_string());
            serve(&addr).await;
        }
    }
}

/// Build the shared detector handle injected into every connection.
fn build_service() -> Arc<DetectorService> {
    #[cfg(feature = "onnx")]
    if let Ok(path) = std::env::var("ARGUS_MODEL") {
        use argus_detect::{Model, ModelSource, OnnxModel};
        let loader: argus_detect::ModelLoader = Arc::new(move || {
            let model = OnnxModel::load(ModelSource::File(path.clone().into()))?;
            Ok(Arc::new(model) as Arc<dyn Model>)
        });
        return Arc::new(DetectorService::new(loader));
    }

    Arc::new(DetectorService::with_model(Arc::new(BlobModel::new())))
}

async fn serve(addr: &str) {
    let service = build_service();
    let server = match DetectServer::bind(addr, service).await {
        Ok(server) => server,
        Err(e) => log_fatal!("failed to bind {addr}: {e}"),
    };

    log::info!("detection server listening on ws://{}", server.local_addr());

    if let Err(e) = tokio::signal::ctrl_c().await {
        log_fatal!("failed to wait for shutdown signal: {e}");
    }
    log::info!("shutting down");
}

/// One-shot detection on a local image file.
async fn detect_file(path: &str) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => log_fatal!("failed to read {path}: {e}"),
    };

    let frame = argus_image::decode(&bytes)
        .and_then(|raw| argus_image::detector_tensor(&raw))
        .map_err(|e| e.to_string())
        .and_then(|tensor| FrameTensor::new(tensor).map_err(|e| e.to_string()));
    let frame = match frame {
        Ok(frame) => frame,
        Err(e) => log_fatal!("failed to prepare {path}: {e}"),
    };

    let service = build_service();
    let detections = match service.detect(frame).await {
        Ok(detections) => detections,
        Err(e) => log_fatal!("detection failed: {e}"),
    };

    match serde_json::to_string_pretty(&detections) {
        Ok(json) => println!("{json}"),
        Err(e) => log_fatal!("failed to serialize detections: {e}"),
    }

    match detections.first() {
        Some(top) => log::info!("top prediction: {} {:.2}%", top.class, top.score * 100.0),
        None => log::info!("no objects detected"),
    }
}
