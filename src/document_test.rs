use super::*;
use crate::test_support::serve;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(HttpTimeouts { request_secs: 5, connect_secs: 2 }).unwrap()
}

#[tokio::test]
async fn fetch_returns_body_bytes() {
    let app = Router::new().route("/doc.pdf", get(|| async { b"%PDF-1.7 fake".to_vec() }));
    let base = serve(app).await;

    let bytes = fetcher().fetch(&format!("{base}/doc.pdf")).await.unwrap();
    assert_eq!(bytes, b"%PDF-1.7 fake");
}

#[tokio::test]
async fn fetch_non_success_status_errors() {
    let app = Router::new().route("/gone.pdf", get(|| async { (StatusCode::NOT_FOUND, "nope") }));
    let base = serve(app).await;

    let err = fetcher().fetch(&format!("{base}/gone.pdf")).await.unwrap_err();
    assert!(matches!(err, LoadError::Status { status: 404 }));
}

#[tokio::test]
async fn fetch_empty_body_errors() {
    let app = Router::new().route("/empty.pdf", get(|| async { "" }));
    let base = serve(app).await;

    let err = fetcher().fetch(&format!("{base}/empty.pdf")).await.unwrap_err();
    assert!(matches!(err, LoadError::EmptyBody));
}

#[tokio::test]
async fn fetch_unreachable_host_errors() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = fetcher().fetch(&format!("http://{addr}/doc.pdf")).await.unwrap_err();
    assert!(matches!(err, LoadError::Request(_)));
}
