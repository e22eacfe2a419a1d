//! HTTP surface of the file store.
//!
//! Handlers stay thin: they decode the request, contain the client path
//! under the storage root, and call into the engine. Materialization,
//! archiving, and introspection are synchronous filesystem work and run on
//! the blocking pool.

use std::io;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use depotfs_engine::{
    introspect, materialize, BlobTable, DirectoryListing, EngineError, MemoryBlob, TreeNode,
};

use crate::archive::TempArchive;
use crate::config::ServerConfig;
use crate::paths::{resolve_under, PathError};

/// Errors surfaced to HTTP clients, carrying their status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was malformed or referenced a precondition that does
    /// not hold (missing source, existing folder, bad path).
    #[error("{0}")]
    BadRequest(String),

    /// The requested file or folder does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation failed on the server side.
    #[error("{0}")]
    Internal(String),
}

impl From<PathError> for ApiError {
    fn from(e: PathError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            EngineError::NotADirectory { .. } | EngineError::DestinationMissing { .. } => {
                ApiError::BadRequest(e.to_string())
            }
            EngineError::Io(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => {
                tracing::error!("request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

fn bad<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError::BadRequest(e.to_string())
}

fn internal<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError::Internal(e.to_string())
}

/// Query parameters for single-file download.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Path of the file, relative to the storage root.
    pub file_name: String,
}

/// Query parameters for folder download and structure queries.
#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    /// Path of the folder, relative to the storage root.
    pub folder_path: String,
}

/// Body of a file-move request.
#[derive(Debug, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Current path of the file, relative to the storage root.
    pub source_path: String,
    /// Directory the file moves into; the base name is kept.
    pub destination_path: String,
}

/// Body of a delete request.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// File or folder to remove, relative to the storage root.
    pub path: String,
}

/// Body of a folder-creation request.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder to create, relative to the storage root.
    pub path: String,
}

/// Shared state behind every handler.
#[derive(Clone)]
pub struct FileApi {
    config: Arc<ServerConfig>,
}

impl FileApi {
    /// Creates the API state from a loaded configuration.
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self { config }
    }

    /// Builds the router with the configured route paths.
    pub fn router(self: Arc<Self>) -> Router {
        let routes = self.config.routes.clone();
        Router::new()
            .route("/health", get(health_handler))
            .route(&routes.upload, post(upload_file_handler))
            .route(&routes.download, get(download_file_handler))
            .route(&routes.file_move, post(move_file_handler))
            .route(&routes.file_delete, post(delete_handler))
            .route(&routes.create_folder, post(create_folder_handler))
            .route(&routes.upload_folder, post(upload_folder_handler))
            .route(&routes.download_folder, get(download_folder_handler))
            .route(&routes.folder_structure, get(folder_structure_handler))
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .with_state(self)
    }

    /// Binds the listener and serves requests until shutdown.
    pub async fn serve(self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.config.storage_root)?;
        std::fs::create_dir_all(&self.config.archive_tmp_dir)?;

        let addr = self.config.bind_addr;
        let router = Arc::new(self).router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("file API listening on {}", addr);

        axum::serve(listener, router.into_make_service()).await?;
        Ok(())
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn upload_file_handler(
    State(state): State<Arc<FileApi>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut dest_dir = String::new();
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("upload_file_path") => dest_dir = field.text().await.map_err(bad)?,
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_owned)
                    .ok_or_else(|| ApiError::BadRequest("file part is missing a filename".into()))?;
                let data = field.bytes().await.map_err(bad)?;
                file = Some((file_name, data));
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| ApiError::BadRequest("missing file part".into()))?;
    let dir = resolve_under(&state.config.storage_root, &dest_dir)?;
    let target = resolve_under(&dir, &file_name)?;

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        std::fs::create_dir_all(&dir)?;
        std::fs::write(&target, &data)
    })
    .await
    .map_err(internal)?
    .map_err(|e| ApiError::Internal(format!("upload file err: {}", e)))?;

    tracing::info!(file = %file_name, dir = %dest_dir, "file uploaded");
    Ok(Json(serde_json::json!({"status": "ok", "file": file_name})))
}

async fn download_file_handler(
    State(state): State<Arc<FileApi>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let path = resolve_under(&state.config.storage_root, &query.file_name)?;

    let meta = tokio::fs::metadata(&path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ApiError::NotFound(format!("file '{}' not found", query.file_name))
        } else {
            internal(e)
        }
    })?;
    if meta.is_dir() {
        return Err(ApiError::BadRequest(format!(
            "'{}' is a directory",
            query.file_name
        )));
    }

    let file = tokio::fs::File::open(&path).await.map_err(internal)?;
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("download"));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                String::from("application/octet-stream"),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", base),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

async fn move_file_handler(
    State(state): State<Arc<FileApi>>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = &state.config.storage_root;
    let source = resolve_under(root, &request.source_path)?;
    let dest_dir = resolve_under(root, &request.destination_path)?;

    if tokio::fs::metadata(&source).await.is_err() {
        return Err(ApiError::BadRequest(format!(
            "source path does not exist: {}",
            request.source_path
        )));
    }
    match tokio::fs::metadata(&dest_dir).await {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            return Err(ApiError::BadRequest(format!(
                "destination path does not exist: {}",
                request.destination_path
            )))
        }
    }

    // The moved entry keeps its base name under the destination directory.
    let base = source
        .file_name()
        .ok_or_else(|| ApiError::BadRequest("source path has no base name".into()))?
        .to_owned();
    let target = dest_dir.join(base);

    tokio::fs::rename(&source, &target)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to move file: {}", e)))?;

    tracing::info!(from = %request.source_path, to = %request.destination_path, "file moved");
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn delete_handler(
    State(state): State<Arc<FileApi>>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let path = resolve_under(&state.config.storage_root, &request.path)?;

    let meta = tokio::fs::metadata(&path).await.map_err(|_| {
        ApiError::BadRequest(format!("path does not exist: {}", request.path))
    })?;

    let result = if meta.is_dir() {
        tokio::fs::remove_dir_all(&path).await
    } else {
        tokio::fs::remove_file(&path).await
    };
    result.map_err(|e| ApiError::Internal(format!("failed to delete file or directory: {}", e)))?;

    tracing::info!(path = %request.path, "deleted");
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn create_folder_handler(
    State(state): State<Arc<FileApi>>,
    Json(request): Json<CreateFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let path = resolve_under(&state.config.storage_root, &request.path)?;

    if tokio::fs::metadata(&path).await.is_ok() {
        return Err(ApiError::BadRequest(format!(
            "path already exists: {}",
            request.path
        )));
    }
    tokio::fs::create_dir_all(&path)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to create folder: {}", e)))?;

    tracing::info!(path = %request.path, "folder created");
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn upload_folder_handler(
    State(state): State<Arc<FileApi>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut dest_dir = String::new();
    let mut tree_json: Option<String> = None;
    let mut blobs = BlobTable::new();

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("dir") => dest_dir = field.text().await.map_err(bad)?,
            Some("tree") => tree_json = Some(field.text().await.map_err(bad)?),
            Some("files") => {
                // The part's filename is the client ref that tree nodes
                // point at; it may differ from the node's on-disk name.
                let client_ref = field.file_name().map(str::to_owned).ok_or_else(|| {
                    ApiError::BadRequest("files part is missing a filename".into())
                })?;
                let data = field.bytes().await.map_err(bad)?;
                blobs.insert(client_ref, Box::new(MemoryBlob::new(data)));
            }
            _ => {}
        }
    }

    let tree_json =
        tree_json.ok_or_else(|| ApiError::BadRequest("missing tree description".into()))?;
    let tree: TreeNode = serde_json::from_str(&tree_json)
        .map_err(|e| ApiError::BadRequest(format!("failed to parse tree description: {}", e)))?;
    tree.validate().map_err(bad)?;

    let dest = resolve_under(&state.config.storage_root, &dest_dir)?;
    match tokio::fs::metadata(&dest).await {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            return Err(ApiError::BadRequest(format!(
                "destination path does not exist: {}",
                dest_dir
            )))
        }
    }

    let report = tokio::task::spawn_blocking(move || materialize(&dest, &tree, &blobs))
        .await
        .map_err(internal)??;

    if report.is_success() {
        Ok((StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response())
    } else {
        tracing::warn!(
            errors = report.errors().len(),
            "folder upload completed partially"
        );
        Ok((
            StatusCode::ALREADY_REPORTED,
            Json(serde_json::json!({
                "status": "partial",
                "errors": report.errors(),
            })),
        )
            .into_response())
    }
}

async fn download_folder_handler(
    State(state): State<Arc<FileApi>>,
    Query(query): Query<FolderQuery>,
) -> Result<Response, ApiError> {
    let folder = resolve_under(&state.config.storage_root, &query.folder_path)?;
    match tokio::fs::metadata(&folder).await {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            return Err(ApiError::BadRequest(format!(
                "folder path does not exist: {}",
                query.folder_path
            )))
        }
    }

    let tmp_dir = state.config.archive_tmp_dir.clone();
    let archive = tokio::task::spawn_blocking(move || TempArchive::pack(&folder, &tmp_dir))
        .await
        .map_err(internal)?
        .map_err(|e| ApiError::Internal(format!("failed to archive folder: {}", e)))?;

    // Read the archive fully so its temp file can be removed before the
    // response goes out; the guard drops at the end of this scope.
    let data = tokio::fs::read(archive.path()).await.map_err(internal)?;

    Ok((
        [
            (header::CONTENT_TYPE, String::from("application/gzip")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", archive.file_name()),
            ),
        ],
        data,
    )
        .into_response())
}

async fn folder_structure_handler(
    State(state): State<Arc<FileApi>>,
    Query(query): Query<FolderQuery>,
) -> Result<Json<DirectoryListing>, ApiError> {
    let folder = resolve_under(&state.config.storage_root, &query.folder_path)?;
    let listing = tokio::task::spawn_blocking(move || introspect(&folder))
        .await
        .map_err(internal)??;
    Ok(Json(listing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "depot-test-boundary";

    fn test_router() -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("storage");
        let tmp = dir.path().join("tmp");
        fs::create_dir_all(&storage).unwrap();
        fs::create_dir_all(&tmp).unwrap();

        let config = ServerConfig {
            storage_root: storage,
            archive_tmp_dir: tmp,
            ..ServerConfig::default()
        };
        let api = Arc::new(FileApi::new(Arc::new(config)));
        (api.router(), dir)
    }

    fn storage(dir: &TempDir) -> std::path::PathBuf {
        dir.path().join("storage")
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match filename {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, f
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (router, _dir) = test_router();

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json.get("version").is_some());
    }

    #[tokio::test]
    async fn test_create_folder_then_conflict() {
        let (router, dir) = test_router();

        let response = router
            .clone()
            .oneshot(json_request("/api/v1/folders/create", r#"{"path":"a/b"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(storage(&dir).join("a/b").is_dir());

        let response = router
            .oneshot(json_request("/api/v1/folders/create", r#"{"path":"a/b"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn test_structure_of_missing_folder_is_404() {
        let (router, _dir) = test_router();

        let request = Request::builder()
            .uri("/api/v1/folders/structure?folder_path=nope")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_structure_lists_one_level() {
        let (router, dir) = test_router();
        fs::create_dir_all(storage(&dir).join("top/inner")).unwrap();
        fs::write(storage(&dir).join("top/file.txt"), b"x").unwrap();

        let request = Request::builder()
            .uri("/api/v1/folders/structure?folder_path=top")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["name"], "top");
        assert_eq!(json["kind"], "directory");
        let children = json["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        // One level only: the nested directory comes back without children.
        for child in children {
            assert!(child.get("children").is_none());
        }
    }

    #[tokio::test]
    async fn test_upload_folder_materializes_tree() {
        let (router, dir) = test_router();

        let tree = r#"{
            "name": "",
            "kind": "directory",
            "children": [
                {"name": "docs", "kind": "directory", "children": [
                    {"name": "a.txt", "kind": "file", "client_ref": "part-0"}
                ]}
            ]
        }"#;
        let body = multipart_body(&[
            ("dir", None, &b""[..]),
            ("tree", None, tree.as_bytes()),
            ("files", Some("part-0"), &b"hello"[..]),
        ]);
        let response = router
            .oneshot(multipart_request("/api/v1/folders/upload", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            fs::read(storage(&dir).join("docs/a.txt")).unwrap(),
            b"hello"
        );
    }

    #[tokio::test]
    async fn test_upload_folder_partial_failure_is_208() {
        let (router, dir) = test_router();
        fs::create_dir(storage(&dir).join("docs")).unwrap();

        let tree = r#"{
            "name": "",
            "kind": "directory",
            "children": [
                {"name": "docs", "kind": "directory", "children": []},
                {"name": "other", "kind": "directory", "children": []}
            ]
        }"#;
        let body = multipart_body(&[("dir", None, &b""[..]), ("tree", None, tree.as_bytes())]);
        let response = router
            .oneshot(multipart_request("/api/v1/folders/upload", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ALREADY_REPORTED);
        let json = body_json(response).await;
        assert_eq!(json["status"], "partial");
        let errors = json["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_str().unwrap().contains("is exist"));
        // The sibling branch was still created.
        assert!(storage(&dir).join("other").is_dir());
    }

    #[tokio::test]
    async fn test_upload_folder_missing_destination_is_400() {
        let (router, _dir) = test_router();

        let tree = r#"{"name": "", "kind": "directory", "children": []}"#;
        let body = multipart_body(&[
            ("dir", None, &b"does/not/exist"[..]),
            ("tree", None, tree.as_bytes()),
        ]);
        let response = router
            .oneshot(multipart_request("/api/v1/folders/upload", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("destination path does not exist"));
    }

    #[tokio::test]
    async fn test_upload_folder_rejects_malformed_tree() {
        let (router, _dir) = test_router();

        // A file node with children is structurally invalid.
        let tree = r#"{
            "name": "",
            "kind": "directory",
            "children": [
                {"name": "x", "kind": "file", "client_ref": "r", "children": [
                    {"name": "y", "kind": "file", "client_ref": "r"}
                ]}
            ]
        }"#;
        let body = multipart_body(&[("dir", None, &b""[..]), ("tree", None, tree.as_bytes())]);
        let response = router
            .oneshot(multipart_request("/api/v1/folders/upload", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_and_download_round_trip() {
        let (router, dir) = test_router();

        let body = multipart_body(&[
            ("upload_file_path", None, &b"inbox"[..]),
            ("file", Some("report.bin"), &b"\x00\x01binary\xff"[..]),
        ]);
        let response = router
            .clone()
            .oneshot(multipart_request("/api/v1/files/upload", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(storage(&dir).join("inbox/report.bin").is_file());

        let request = Request::builder()
            .uri("/api/v1/files/download?file_name=inbox/report.bin")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("report.bin"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"\x00\x01binary\xff");
    }

    #[tokio::test]
    async fn test_download_missing_file_is_404() {
        let (router, _dir) = test_router();

        let request = Request::builder()
            .uri("/api/v1/files/download?file_name=ghost.txt")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_attempt_is_rejected() {
        let (router, _dir) = test_router();

        let request = Request::builder()
            .uri("/api/v1/files/download?file_name=../../etc/passwd")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_move_then_delete_flow() {
        let (router, dir) = test_router();
        fs::create_dir_all(storage(&dir).join("src")).unwrap();
        fs::create_dir_all(storage(&dir).join("dst")).unwrap();
        fs::write(storage(&dir).join("src/doc.txt"), b"contents").unwrap();

        let response = router
            .clone()
            .oneshot(json_request(
                "/api/v1/files/move",
                r#"{"source_path":"src/doc.txt","destination_path":"dst"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!storage(&dir).join("src/doc.txt").exists());
        assert_eq!(
            fs::read(storage(&dir).join("dst/doc.txt")).unwrap(),
            b"contents"
        );

        let response = router
            .clone()
            .oneshot(json_request(
                "/api/v1/files/delete",
                r#"{"path":"dst/doc.txt"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!storage(&dir).join("dst/doc.txt").exists());

        // Deleting it again reports the missing path.
        let response = router
            .oneshot(json_request(
                "/api/v1/files/delete",
                r#"{"path":"dst/doc.txt"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_move_missing_source_is_400() {
        let (router, dir) = test_router();
        fs::create_dir_all(storage(&dir).join("dst")).unwrap();

        let response = router
            .oneshot(json_request(
                "/api/v1/files/move",
                r#"{"source_path":"ghost.txt","destination_path":"dst"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("source path does not exist"));
    }

    #[tokio::test]
    async fn test_download_folder_returns_archive_and_cleans_up() {
        let (router, dir) = test_router();
        fs::create_dir_all(storage(&dir).join("pack")).unwrap();
        fs::write(storage(&dir).join("pack/data.txt"), b"zzz").unwrap();

        let request = Request::builder()
            .uri("/api/v1/folders/download?folder_path=pack")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("pack.tar.gz"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        // Gzip magic bytes.
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

        // The temp archive was removed once the response was built.
        assert_eq!(fs::read_dir(dir.path().join("tmp")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_missing_folder_is_400() {
        let (router, _dir) = test_router();

        let request = Request::builder()
            .uri("/api/v1/folders/download?folder_path=ghost")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_path_containment_helper_used_by_handlers() {
        // Engine paths never see `..`; the handler layer rejects it first.
        let err = resolve_under(Path::new("/srv/depot"), "../../secret").unwrap_err();
        assert!(matches!(err, PathError::Escapes(_)));
    }
}
