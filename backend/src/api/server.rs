//! HTTP server for the droparea upload endpoint.
//!
//! # API Endpoints
//!
//! | Method          | Path      | Description                      |
//! |-----------------|-----------|----------------------------------|
//! | GET             | `/health` | Health check                     |
//! | POST/PUT/PATCH  | `/upload` | Multipart upload (one file part) |
//!
//! When a static directory is configured it is served for every other path.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::types::UploadResponse;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::storage::UploadStore;

#[derive(Clone)]
struct AppState {
    store: Arc<UploadStore>,
    max_file_bytes: u64,
}

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let state = AppState {
        store: Arc::new(UploadStore::new(&config.upload_dir)),
        max_file_bytes: config.max_file_bytes(),
    };

    // The widget sends Cache-Control, which makes every upload preflighted.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::CACHE_CONTROL])
        .expose_headers([header::CONTENT_TYPE]);

    let router = Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload).put(upload).patch(upload))
        .layer(DefaultBodyLimit::max(config.max_body_bytes()))
        .layer(cors)
        .with_state(state);

    match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(health)),
    }
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 Droparea server running on http://localhost:{}", config.port);
    println!("   POST /upload  - Upload a file (PUT/PATCH accepted)");
    println!("   GET  /health  - Health check");
    println!("   Uploads: {} (max {} KB)", config.upload_dir.display(), config.max_size_kb);
    if let Some(dir) = &config.static_dir {
        println!("   Static:  {}", dir.display());
    }
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "droparea-server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST|PUT|PATCH /upload"
        }
    }))
}

/// Upload endpoint. The first part with a filename is the file; parts
/// without one are extra form fields.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let mut file: Option<(String, Bytes)> = None;
    let mut fields = BTreeMap::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(original) if file.is_none() => {
                let bytes = field.bytes().await?;
                file = Some((original, bytes));
            }
            Some(original) => {
                println!("   ⚠️  Ignoring extra file part '{}' ({})", name, original);
            }
            None => {
                let value = field.text().await?;
                fields.insert(name, value);
            }
        }
    }

    let (original_name, bytes) =
        file.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

    if bytes.len() as u64 > state.max_file_bytes {
        return Err(ServerError::PayloadTooLarge(format!(
            "{} is {} bytes, limit is {} bytes",
            original_name,
            bytes.len(),
            state.max_file_bytes
        )));
    }

    println!("📄 Upload: {} ({} bytes, {} fields)", original_name, bytes.len(), fields.len());

    let stored = state.store.save(&original_name, &bytes).await?;
    println!("   💾 Stored as {}", stored.file_name);

    Ok(Json(UploadResponse::new(stored, original_name, fields)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::multipart::{Form, Part};
    use reqwest::StatusCode;
    use std::path::Path;
    use tempfile::tempdir;

    async fn spawn_app(upload_dir: &Path, max_size_kb: u64) -> String {
        let config = ServerConfig {
            port: 0,
            upload_dir: upload_dir.to_path_buf(),
            max_size_kb,
            static_dir: None,
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(&config);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn photo_form() -> Form {
        Form::new()
            .text("caption", "Sunset")
            .part("file", Part::bytes(b"fake jpeg".to_vec()).file_name("photo.jpg"))
    }

    #[tokio::test]
    async fn test_upload_stores_file_and_returns_name() {
        let dir = tempdir().unwrap();
        let base = spawn_app(dir.path(), 1024).await;

        let response = reqwest::Client::new()
            .post(format!("{}/upload", base))
            .multipart(photo_form())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await.unwrap();
        let file_name = body["file_name"].as_str().unwrap();
        assert!(file_name.ends_with("-photo.jpg"));
        assert_eq!(body["original_name"], "photo.jpg");
        assert_eq!(body["size"], 9);
        assert_eq!(body["fields"]["caption"], "Sunset");

        let stored = std::fs::read(dir.path().join(file_name)).unwrap();
        assert_eq!(stored, b"fake jpeg");
    }

    #[tokio::test]
    async fn test_put_and_patch_are_accepted() {
        let dir = tempdir().unwrap();
        let base = spawn_app(dir.path(), 1024).await;
        let client = reqwest::Client::new();

        let put = client
            .put(format!("{}/upload", base))
            .multipart(photo_form())
            .send()
            .await
            .unwrap();
        assert_eq!(put.status(), StatusCode::OK);

        let patch = client
            .patch(format!("{}/upload", base))
            .multipart(photo_form())
            .send()
            .await
            .unwrap();
        assert_eq!(patch.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file_is_bad_request() {
        let dir = tempdir().unwrap();
        let base = spawn_app(dir.path(), 1024).await;

        let response = reqwest::Client::new()
            .post(format!("{}/upload", base))
            .multipart(Form::new().text("caption", "no file"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("No file provided"));
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected() {
        let dir = tempdir().unwrap();
        let base = spawn_app(dir.path(), 1).await;

        let form = Form::new().part("file", Part::bytes(vec![0u8; 4096]).file_name("big.png"));
        let response = reqwest::Client::new()
            .post(format!("{}/upload", base))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempdir().unwrap();
        let base = spawn_app(dir.path(), 1024).await;

        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }
}
