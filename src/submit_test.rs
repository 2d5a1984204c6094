use super::*;
use crate::test_support::serve;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use canvas::camera::Point;
use serde_json::Value;
use std::sync::Arc;

fn meta() -> CanvasMeta {
    CanvasMeta {
        zoom: 1.0,
        scale: 1.5,
        rotation: 0,
        pages: vec![PageMeta { page: 1, width: 612.0, height: 792.0 }],
    }
}

fn mixed_doc() -> DocStore {
    let mut doc = DocStore::new();
    doc.add_stroke(1, "#000000", 2.0, Signer::Primary, Point::new(1.0, 1.0));
    doc.add_stroke(1, "#0000ff", 2.0, Signer::Secondary, Point::new(5.0, 5.0));
    doc.add_image(1, 10.0, 10.0, 40.0, 20.0, "data:image/png;base64,AAAA", Signer::Primary);
    doc
}

fn timeouts() -> HttpTimeouts {
    HttpTimeouts { request_secs: 5, connect_secs: 2 }
}

// =========================================================================
// SubmissionPayload
// =========================================================================

#[test]
fn build_splits_by_signer() {
    let payload = SubmissionPayload::build(&mixed_doc(), meta());
    assert_eq!(payload.primary.strokes.len(), 1);
    assert_eq!(payload.primary.images.len(), 1);
    assert_eq!(payload.secondary.strokes.len(), 1);
    assert!(payload.secondary.images.is_empty());
    assert_eq!(payload.secondary.strokes[0].color, "#0000ff");
}

#[test]
fn payload_json_shape() {
    let payload = SubmissionPayload::build(&mixed_doc(), meta());
    let json = serde_json::to_value(&payload).unwrap();

    assert!(json["primary"]["strokes"].is_array());
    assert!(json["secondary"]["images"].is_array());
    assert_eq!(json["canvas"]["scale"], 1.5);
    assert_eq!(json["canvas"]["rotation"], 0);
    assert_eq!(json["canvas"]["pages"][0]["page"], 1);
    assert_eq!(json["primary"]["strokes"][0]["signer"], "primary");
    assert_eq!(json["primary"]["strokes"][0]["path"][0]["x"], 1.0);
}

// =========================================================================
// HttpSaveSink
// =========================================================================

type Captured = Arc<std::sync::Mutex<Option<Value>>>;

async fn capture(State(slot): State<Captured>, Json(body): Json<Value>) -> StatusCode {
    *slot.lock().unwrap() = Some(body);
    StatusCode::NO_CONTENT
}

#[tokio::test]
async fn http_sink_posts_json() {
    let slot: Captured = Arc::default();
    let app = Router::new().route("/save", post(capture)).with_state(slot.clone());
    let base = serve(app).await;

    let sink = HttpSaveSink::new(format!("{base}/save"), timeouts()).unwrap();
    let payload = SubmissionPayload::build(&mixed_doc(), meta());
    sink.submit(&payload).await.unwrap();

    let received = slot.lock().unwrap().take().unwrap();
    let decoded: SubmissionPayload = serde_json::from_value(received).unwrap();
    assert_eq!(decoded, payload);
}

#[tokio::test]
async fn http_sink_server_error_is_reported() {
    let app = Router::new().route("/save", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "db down") }));
    let base = serve(app).await;

    let sink = HttpSaveSink::new(format!("{base}/save"), timeouts()).unwrap();
    let err = sink.submit(&SubmissionPayload::build(&DocStore::new(), meta())).await.unwrap_err();
    match err {
        SaveError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "db down");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

// =========================================================================
// CaptureSink
// =========================================================================

#[tokio::test]
async fn capture_sink_keeps_last_payload() {
    let sink = CaptureSink::new();
    assert!(sink.take().is_none());

    let payload = SubmissionPayload::build(&mixed_doc(), meta());
    sink.submit(&payload).await.unwrap();
    assert_eq!(sink.take(), Some(payload));
    assert!(sink.take().is_none());
}
