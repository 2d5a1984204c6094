use super::*;
use canvas::cache::RenderCache;

fn letter() -> PageBox {
    PageBox { width: 612.0, height: 792.0 }
}

#[tokio::test]
async fn open_reports_declared_page_count() {
    let mut backend = HeadlessBackend::new(vec![letter(); 3]);
    assert_eq!(backend.open_bytes(b"%PDF".to_vec()).await.unwrap(), 3);
    assert_eq!(backend.open_url("https://example.test/doc.pdf").await.unwrap(), 3);
}

#[tokio::test]
async fn open_without_pages_errors() {
    let mut backend = HeadlessBackend::new(Vec::new());
    assert_eq!(backend.open_url("https://example.test/doc.pdf").await, Err(BackendError::NoPages));
}

#[tokio::test]
async fn open_rejects_empty_input() {
    let mut backend = HeadlessBackend::new(vec![letter()]);
    assert!(matches!(backend.open_bytes(Vec::new()).await, Err(BackendError::Open(_))));
    assert!(matches!(backend.open_url(" ").await, Err(BackendError::Open(_))));
}

#[tokio::test]
async fn rasterize_scales_page_size() {
    let mut backend = HeadlessBackend::new(vec![letter()]);
    backend.open_url("doc.pdf").await.unwrap();

    let page = backend.rasterize(1, 1.5, Rotation::Deg0).await.unwrap();
    assert_eq!((page.width, page.height), (918, 1188));
    assert_eq!(page.bitmap, BlankPage { page: 1, width: 918, height: 1188 });
}

#[tokio::test]
async fn rasterize_swaps_axes_on_quarter_turn() {
    let mut backend = HeadlessBackend::new(vec![letter()]);
    backend.open_url("doc.pdf").await.unwrap();

    let page = backend.rasterize(1, 1.0, Rotation::Deg90).await.unwrap();
    assert_eq!((page.width, page.height), (792, 612));
}

#[tokio::test]
async fn rasterize_out_of_range_page_errors() {
    let mut backend = HeadlessBackend::new(vec![letter()]);
    backend.open_url("doc.pdf").await.unwrap();

    assert!(backend.rasterize(0, 1.0, Rotation::Deg0).await.is_err());
    assert!(backend.rasterize(2, 1.0, Rotation::Deg0).await.is_err());
}

#[tokio::test]
async fn rasterize_before_open_errors() {
    let backend = HeadlessBackend::new(vec![letter()]);
    assert!(backend.rasterize(1, 1.0, Rotation::Deg0).await.is_err());
}

#[tokio::test]
async fn cache_serves_headless_pages() {
    let mut backend = HeadlessBackend::new(vec![letter(); 2]);
    backend.open_url("doc.pdf").await.unwrap();
    let mut cache = RenderCache::new();

    let first = cache.get_or_render(&backend, 2, 1.0, Rotation::Deg0).await.unwrap();
    let again = cache.get_or_render(&backend, 2, 1.0, Rotation::Deg0).await.unwrap();
    assert!(std::sync::Arc::ptr_eq(&first.bitmap, &again.bitmap));
    assert_eq!(cache.len(), 1);
}
