//! The gallery page and the render interceptor chain.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_gallery_page_renders() {
    let app = TestApp::new(&["hello"]).await;

    let response = app.request("GET", "/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("Asset Gallery"));
    assert!(response.text.contains("0 of 1 extensions enabled"));
}

#[tokio::test]
async fn test_banner_interceptor_wraps_and_unwraps() {
    let app = TestApp::new(&["banner"]).await;

    app.request("POST", "/api/extensions/banner/enable").await;
    let response = app.request("GET", "/").await;
    assert!(response.text.contains("Asset Gallery [banner]"));

    app.request("POST", "/api/extensions/banner/disable").await;
    let response = app.request("GET", "/").await;
    assert!(!response.text.contains("[banner]"));
    assert!(response.text.contains("Asset Gallery"));
}

#[tokio::test]
async fn test_setup_broadcast_reaches_earlier_extensions() {
    let app = TestApp::new(&["hello", "banner"]).await;

    // Enabling hello then banner re-broadcasts setup to hello as well;
    // both contributions are live once banner's load completes.
    app.request("POST", "/api/extensions/hello/enable").await;
    app.request("POST", "/api/extensions/banner/enable").await;

    let response = app.request("GET", "/hello").await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/").await;
    assert!(response.text.contains("[banner]"));

    // The re-broadcast did not duplicate hello's route.
    assert_eq!(app.ctx.routes.len().await, 1);
}
