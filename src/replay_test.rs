#![allow(clippy::float_cmp)]

use super::*;
use crate::submit::{CaptureSink, SaveError};
use serde_json::json;

/// Fetcher that always fails, forcing the direct-URL path of the headless backend.
struct OfflineFetcher;

#[async_trait::async_trait]
impl DocumentFetcher for OfflineFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, LoadError> {
        Err(LoadError::Request("offline".into()))
    }
}

fn script(events: serde_json::Value) -> ReplayScript {
    serde_json::from_value(json!({
        "document_url": "https://example.test/engagement.pdf",
        "pages": [
            {"width": 400.0, "height": 600.0},
            {"width": 400.0, "height": 600.0},
            {"width": 400.0, "height": 600.0}
        ],
        "scale": 1.0,
        "events": events,
    }))
    .unwrap()
}

async fn replay(script: ReplayScript) -> (Result<ReplayOutcome, ReplayError>, Option<SubmissionPayload>) {
    let sink = std::sync::Arc::new(CaptureSink::new());
    let (notifier, _rx) = Notifier::channel();
    let result = run(script, EditorConfig::default(), OfflineFetcher, ArcSink(sink.clone()), notifier).await;
    (result, sink.take())
}

struct ArcSink(std::sync::Arc<CaptureSink>);

#[async_trait::async_trait]
impl SaveSink for ArcSink {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SaveError> {
        self.0.submit(payload).await
    }
}

#[test]
fn events_parse_from_tagged_json() {
    let parsed = script(json!([
        {"type": "tool", "tool": "image_placement"},
        {"type": "signer", "signer": "secondary"},
        {"type": "down", "page": 1, "x": 1.0, "y": 2.0},
        {"type": "up", "t": 5.0},
        {"type": "save"}
    ]));
    assert_eq!(
        parsed.events,
        vec![
            ReplayEvent::Tool { tool: Tool::ImagePlacement },
            ReplayEvent::Signer { signer: Signer::Secondary },
            ReplayEvent::Down { page: 1, x: 1.0, y: 2.0, t: 0.0 },
            ReplayEvent::Up { t: 5.0 },
            ReplayEvent::Save,
        ]
    );
    assert!(!parsed.secondary_required);
}

#[test]
fn unknown_event_type_is_rejected() {
    let raw = json!({
        "document_url": "doc.pdf",
        "pages": [{"width": 1.0, "height": 1.0}],
        "events": [{"type": "teleport"}],
    });
    assert!(serde_json::from_value::<ReplayScript>(raw).is_err());
}

#[tokio::test]
async fn three_page_replay_saves_and_locks() {
    let (result, submitted) = replay(script(json!([
        {"type": "down", "page": 1, "x": 50.0, "y": 50.0, "t": 0.0},
        {"type": "move", "page": 1, "x": 80.0, "y": 60.0, "t": 10.0},
        {"type": "move", "page": 1, "x": 120.0, "y": 90.0, "t": 20.0},
        {"type": "up", "t": 30.0},
        {"type": "pending_image", "image_data": "data:image/png;base64,AAAA", "width": 100.0, "height": 40.0},
        {"type": "down", "page": 2, "x": 200.0, "y": 300.0, "t": 40.0},
        {"type": "up", "t": 41.0},
        {"type": "save"}
    ])))
    .await;

    let outcome = result.unwrap();
    assert!(outcome.locked);
    let payload = submitted.unwrap();
    assert_eq!(payload, outcome.payload);
    assert_eq!(payload.primary.strokes.len(), 1);
    assert_eq!(payload.primary.strokes[0].path.len(), 3);
    assert_eq!(payload.primary.images.len(), 1);
    assert!(payload.secondary.strokes.is_empty() && payload.secondary.images.is_empty());
    assert_eq!(payload.canvas.pages.len(), 3);
}

#[tokio::test]
async fn events_after_save_are_ignored() {
    let (result, _) = replay(script(json!([
        {"type": "down", "page": 1, "x": 5.0, "y": 5.0},
        {"type": "up"},
        {"type": "save"},
        {"type": "down", "page": 1, "x": 50.0, "y": 50.0},
        {"type": "up"},
        {"type": "clear_all"}
    ])))
    .await;

    let outcome = result.unwrap();
    assert!(outcome.locked);
    assert_eq!(outcome.payload.primary.strokes.len(), 1);
}

#[tokio::test]
async fn undo_redo_and_clear_replay() {
    let (result, submitted) = replay(script(json!([
        {"type": "down", "page": 1, "x": 5.0, "y": 5.0},
        {"type": "up"},
        {"type": "down", "page": 2, "x": 5.0, "y": 5.0},
        {"type": "up"},
        {"type": "undo"},
        {"type": "redo"},
        {"type": "clear_page", "page": 1},
        {"type": "zoom", "factor": 2.0}
    ])))
    .await;

    let outcome = result.unwrap();
    assert!(!outcome.locked);
    assert!(submitted.is_none());
    assert_eq!(outcome.payload.primary.strokes.len(), 1);
    assert_eq!(outcome.payload.primary.strokes[0].page, 2);
    assert_eq!(outcome.payload.canvas.zoom, 2.0);
}

#[tokio::test]
async fn gated_save_in_replay_does_not_lock() {
    let mut s = script(json!([
        {"type": "down", "page": 1, "x": 5.0, "y": 5.0},
        {"type": "up"},
        {"type": "save"}
    ]));
    s.secondary_required = true;

    let (result, submitted) = replay(s).await;
    assert!(!result.unwrap().locked);
    assert!(submitted.is_none());
}

#[tokio::test]
async fn secondary_signer_events_pass_gate() {
    let mut s = script(json!([
        {"type": "signer", "signer": "secondary"},
        {"type": "color", "color": "#0000ff"},
        {"type": "width", "width": 3.0},
        {"type": "down", "page": 3, "x": 5.0, "y": 5.0},
        {"type": "up"},
        {"type": "save"}
    ]));
    s.secondary_required = true;

    let (result, submitted) = replay(s).await;
    assert!(result.unwrap().locked);
    let payload = submitted.unwrap();
    let stroke = &payload.secondary.strokes[0];
    assert_eq!((stroke.color.as_str(), stroke.stroke_width, stroke.page), ("#0000ff", 3.0, 3));
}

#[tokio::test]
async fn events_on_unknown_pages_are_skipped() {
    let (result, _) = replay(script(json!([
        {"type": "down", "page": 9, "x": 5.0, "y": 5.0},
        {"type": "up"}
    ])))
    .await;
    assert!(result.unwrap().payload.primary.strokes.is_empty());
}

#[tokio::test]
async fn script_without_pages_errors() {
    let mut s = script(json!([]));
    s.pages.clear();
    let (result, _) = replay(s).await;
    assert!(matches!(result, Err(ReplayError::NoPages)));
}
