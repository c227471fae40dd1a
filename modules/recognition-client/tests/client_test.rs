//! RecognitionClient against an in-process stand-in for the recognition service.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use facefind_common::{CapturedImage, Config};
use recognition_client::{
    ProgressSink, RecognitionClient, RecognitionError, RecognitionRequest, FALLBACK_API_MESSAGE,
    FALLBACK_MESSAGE,
};
use serde_json::json;

const PATH: &str = "/api/v1/recognize-face";

// ---------------------------------------------------------------------------
// Stand-in server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ReceivedPart {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    len: usize,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    parts: Arc<Mutex<Vec<ReceivedPart>>>,
    auth: Arc<Mutex<Option<String>>>,
}

async fn recognize(State(stub): State<Stub>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    *stub.auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(String::from);
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let len = field.bytes().await.unwrap().len();
        stub.parts.lock().unwrap().push(ReceivedPart {
            name,
            file_name,
            content_type,
            len,
        });
    }

    (
        stub.status,
        [("content-type", "application/json")],
        stub.body.clone(),
    )
        .into_response()
}

async fn serve(status: StatusCode, body: impl Into<String>) -> (String, Stub) {
    let stub = Stub {
        status,
        body: body.into(),
        parts: Arc::new(Mutex::new(Vec::new())),
        auth: Arc::new(Mutex::new(None)),
    };
    let app = Router::new()
        .route(PATH, post(recognize))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}{PATH}"), stub)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Recorder(Mutex<Vec<u8>>);

impl Recorder {
    fn values(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl ProgressSink for Recorder {
    fn report(&self, percent: u8) {
        self.0.lock().unwrap().push(percent);
    }
}

fn jpeg_request() -> RecognitionRequest {
    let image = CapturedImage::from_upload(
        PathBuf::from("/tmp/selfie.jpg"),
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9],
        "image/jpeg",
    );
    RecognitionRequest::new(Arc::new(image))
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn matched_response_yields_photos_and_matches() {
    let body = json!({
        "matched": true,
        "image_urls": ["https://cdn/a.jpg", "https://cdn/b.jpg"],
        "matches": [{"similarity": 0.97, "photo_id": "a"}, {"similarity": 0.88}]
    });
    let (url, _stub) = serve(StatusCode::OK, body.to_string()).await;
    let client = RecognitionClient::new(&url);
    let recorder = Arc::new(Recorder::default());

    let result = client.submit(&jpeg_request(), recorder.clone()).await.unwrap();

    assert!(result.matched);
    assert_eq!(result.photo_urls, vec!["https://cdn/a.jpg", "https://cdn/b.jpg"]);
    assert_eq!(result.best_match().unwrap().similarity, 0.97);
    assert_eq!(result.matches[0].metadata["photo_id"], "a");

    let progress = recorder.values();
    assert_eq!(progress.first(), Some(&0));
    assert_eq!(progress.last(), Some(&100));
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn match_records_without_similarity_still_show_photos() {
    let body = json!({
        "matched": true,
        "image_urls": ["https://cdn/a.jpg"],
        "matches": [{"photo_id": "x"}]
    });
    let (url, _stub) = serve(StatusCode::OK, body.to_string()).await;
    let client = RecognitionClient::new(&url);

    let result = client
        .submit(&jpeg_request(), Arc::new(Recorder::default()))
        .await
        .unwrap();

    assert!(result.has_photos());
    assert_eq!(result.best_match().unwrap().similarity, 0.0);
}

#[tokio::test]
async fn null_matched_flag_is_no_match() {
    let (url, _stub) = serve(StatusCode::OK, r#"{"matched":null,"image_urls":[]}"#).await;
    let client = RecognitionClient::new(&url);

    let result = client
        .submit(&jpeg_request(), Arc::new(Recorder::default()))
        .await
        .unwrap();

    assert!(!result.matched);
    assert!(result.photo_urls.is_empty());
}

#[test]
fn from_config_joins_base_url_and_path() {
    let config = Config {
        api_url: "https://faces.example.com/".into(),
        recognize_path: "/api/v1/recognize-face".into(),
        ..Config::default()
    };
    let client = RecognitionClient::from_config(&config);
    assert_eq!(
        client.endpoint(),
        "https://faces.example.com/api/v1/recognize-face"
    );
}

#[tokio::test]
async fn image_is_sent_under_fixed_field_and_filename() {
    let (url, stub) = serve(StatusCode::OK, r#"{"matched":false}"#).await;
    let client = RecognitionClient::new(&url);

    client
        .submit(&jpeg_request(), Arc::new(Recorder::default()))
        .await
        .unwrap();

    let parts = stub.parts.lock().unwrap().clone();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name.as_deref(), Some("file"));
    assert_eq!(parts[0].file_name.as_deref(), Some("capture.jpg"));
    assert_eq!(parts[0].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(parts[0].len, 8);
    assert!(stub.auth.lock().unwrap().is_none());
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let (url, stub) = serve(StatusCode::OK, r#"{"matched":false}"#).await;
    let client = RecognitionClient::new(&url).with_token("s3cret");

    client
        .submit(&jpeg_request(), Arc::new(Recorder::default()))
        .await
        .unwrap();

    assert_eq!(stub.auth.lock().unwrap().as_deref(), Some("Bearer s3cret"));
}

#[tokio::test]
async fn matched_with_empty_urls_is_no_match() {
    let (url, _stub) = serve(
        StatusCode::OK,
        r#"{"matched":true,"image_urls":[],"matches":[]}"#,
    )
    .await;
    let client = RecognitionClient::new(&url);

    let result = client
        .submit(&jpeg_request(), Arc::new(Recorder::default()))
        .await
        .unwrap();

    assert!(!result.matched);
    assert!(!result.has_photos());
}

#[tokio::test]
async fn error_status_surfaces_server_message() {
    let (url, _stub) = serve(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"message":"no face detected"}"#,
    )
    .await;
    let client = RecognitionClient::new(&url);
    let recorder = Arc::new(Recorder::default());

    let err = client
        .submit(&jpeg_request(), recorder.clone())
        .await
        .unwrap_err();

    match &err {
        RecognitionError::Api { status, message } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "no face detected");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.user_message(), "no face detected");
    assert_eq!(recorder.values().last(), Some(&100));
}

#[tokio::test]
async fn error_status_without_message_uses_fallback() {
    let (url, _stub) = serve(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").await;
    let client = RecognitionClient::new(&url);

    let err = client
        .submit(&jpeg_request(), Arc::new(Recorder::default()))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), FALLBACK_API_MESSAGE);
}

#[tokio::test]
async fn malformed_success_body_is_a_parse_failure() {
    let (url, _stub) = serve(StatusCode::OK, "<html>oops</html>").await;
    let client = RecognitionClient::new(&url);

    let err = client
        .submit(&jpeg_request(), Arc::new(Recorder::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, RecognitionError::Parse(_)));
    assert_eq!(err.user_message(), FALLBACK_MESSAGE);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_failure() {
    // Bind to find a free port, then release it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RecognitionClient::new(&format!("http://{addr}{PATH}"));
    let recorder = Arc::new(Recorder::default());

    let err = client
        .submit(&jpeg_request(), recorder.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, RecognitionError::Network(_)));
    assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    assert_eq!(recorder.values().last(), Some(&100));
}
