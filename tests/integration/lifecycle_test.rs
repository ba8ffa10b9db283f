//! Enable/disable lifecycle through the operator API.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(&[]).await;

    let response = app.request("GET", "/api/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
}

#[tokio::test]
async fn test_list_extensions_sorted_with_metadata() {
    let app = TestApp::new(&["hello", "banner"]).await;

    let response = app.request("GET", "/api/extensions").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    // Ordered by directory name.
    assert_eq!(list[0]["id"], "banner");
    assert_eq!(list[1]["id"], "hello");
    assert_eq!(list[1]["name"], "hello extension");
    assert_eq!(list[1]["metadata"]["version"], "1.0.0");
    assert_eq!(list[1]["enabled"], false);
}

#[tokio::test]
async fn test_hello_route_appears_and_disappears() {
    let app = TestApp::new(&["hello"]).await;

    // Not loaded yet: the fallback reports not found.
    let response = app.request("GET", "/hello").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("POST", "/api/extensions/hello/enable").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["enabled"], true);

    let response = app.request("GET", "/hello").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Hello from extension!");

    let response = app.request("POST", "/api/extensions/hello/disable").await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/hello").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Durable state records the disable rather than deleting the row.
    let all = app.state_store.get_all().await.unwrap();
    assert_eq!(all.get("hello"), Some(&false));
}

#[tokio::test]
async fn test_enable_unknown_extension_is_404() {
    let app = TestApp::new(&[]).await;

    let response = app.request("POST", "/api/extensions/ghost/enable").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_enable_twice_is_success() {
    let app = TestApp::new(&["hello"]).await;

    app.request("POST", "/api/extensions/hello/enable").await;
    let response = app.request("POST", "/api/extensions/hello/enable").await;
    assert_eq!(response.status, StatusCode::OK);

    assert_eq!(app.ctx.routes.len().await, 1);
}

#[tokio::test]
async fn test_disable_never_loaded_still_persists_false() {
    let app = TestApp::new(&["idle"]).await;

    let response = app.request("POST", "/api/extensions/idle/disable").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["enabled"], false);

    let all = app.state_store.get_all().await.unwrap();
    assert_eq!(all.get("idle"), Some(&false));
}

#[tokio::test]
async fn test_manifest_only_extension_enables_without_loading() {
    let app = TestApp::new(&["assets-only"]).await;

    let response = app
        .request("POST", "/api/extensions/assets-only/enable")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["enabled"], true);

    // Nothing to load is not an error, and nothing is loaded.
    assert!(!app.manager.is_loaded("assets-only").await);
}

#[tokio::test]
async fn test_bootstrap_restores_enabled_extensions() {
    let app = TestApp::new(&["hello", "banner"]).await;

    app.request("POST", "/api/extensions/hello/enable").await;
    app.request("POST", "/api/extensions/banner/disable").await;

    // Simulated restart: durable state {hello: true, banner: false}.
    let app = app.restart().await;

    let response = app.request("GET", "/hello").await;
    assert_eq!(response.status, StatusCode::OK);

    assert!(app.manager.is_loaded("hello").await);
    assert!(!app.manager.is_loaded("banner").await);
    assert_eq!(app.ctx.routes.len().await, 1);
}

#[tokio::test]
async fn test_round_trip_restores_route_table() {
    let app = TestApp::new(&["hello", "banner"]).await;

    app.request("POST", "/api/extensions/banner/enable").await;
    let before = app.ctx.routes.keys().await;

    app.request("POST", "/api/extensions/hello/enable").await;
    app.request("POST", "/api/extensions/hello/disable").await;

    assert_eq!(app.ctx.routes.keys().await, before);
}
