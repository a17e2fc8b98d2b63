//! REST client tests against a local axum backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use dealdesk_categories::SelectionMode;
use dealdesk_client::{
    ApiError, CategoryApi, CategoryTree, CollectingNotifier, ExpandOutcome, RestCategoryApi,
    SelectOutcome, Session,
};

#[derive(Clone, Default)]
struct Backend {
    saved: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Backend {
    fn record(&self, headers: &HeaderMap) -> bool {
        let auth = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let expired = auth.as_deref() == Some("Bearer expired");
        self.auth.lock().unwrap().push(auth);
        !expired
    }

    fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth.lock().unwrap().clone()
    }
}

async fn categories(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !backend.record(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match query.get("parent_id").map(String::as_str) {
        None => Json(json!({
            "categories": [
                { "id": 1, "name": "Electronics", "parent_id": null },
                { "id": "2", "name": "Books", "parent_id": null },
                { "id": 10, "name": "Phones", "parent_id": 1 }
            ]
        }))
        .into_response(),
        Some("1") => Json(json!({
            "categories": [{ "id": 10, "name": "Phones", "parent_id": 1 }]
        }))
        .into_response(),
        Some("2") => (StatusCode::INTERNAL_SERVER_ERROR, "db down").into_response(),
        Some(_) => Json(json!({ "categories": [] })).into_response(),
    }
}

async fn get_saved(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(user): Path<String>,
) -> Response {
    backend.record(&headers);
    let saved = backend.saved.lock().unwrap().get(&user).cloned().unwrap_or_default();
    Json(json!({ "categories": saved })).into_response()
}

async fn put_saved(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(user): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    backend.record(&headers);
    let ids = body["categories"].as_array().cloned().unwrap_or_default();
    backend.saved.lock().unwrap().insert(user, ids);
    Json(json!({ "message": "Categories updated" })).into_response()
}

async fn discounted_products(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    backend.record(&headers);
    if query.get("min_discount").map(String::as_str) != Some("20") {
        return (StatusCode::BAD_REQUEST, "min_discount required").into_response();
    }

    match query.get("category_id").map(String::as_str) {
        Some("10") => Json(json!({
            "products": [{
                "category": "Phones",
                "title": "Pixel",
                "product_url": "https://shop.example.com/pixel",
                "current_price": "399.00",
                "original_price": 599,
                "discount_percent": 33,
                "image_url": "https://shop.example.com/pixel.jpg",
                "QTY": 4
            }]
        }))
        .into_response(),
        _ => (StatusCode::BAD_GATEWAY, "upstream").into_response(),
    }
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/categories", get(categories))
        .route("/api/{user}/mycategories", get(get_saved).put(put_saved))
        .route("/api/discounted-products", get(discounted_products))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn client(base: &str, token: &str) -> RestCategoryApi {
    let session = Session::new(base).unwrap().with_token(token);
    RestCategoryApi::new(session, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_categories_normalizes_ids() {
    let backend = Backend::default();
    let base = spawn_backend(backend.clone()).await;
    let api = client(&base, "secret");

    let all = api.fetch_categories(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, "1");
    assert_eq!(all[2].parent_id.as_deref(), Some("1"));

    let children = api.fetch_categories(Some("1")).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "Phones");

    assert!(api.fetch_categories(Some("10")).await.unwrap().is_empty());

    assert!(backend
        .auth_headers()
        .iter()
        .all(|h| h.as_deref() == Some("Bearer secret")));
}

#[tokio::test]
async fn test_non_2xx_maps_to_http_error() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, "secret");

    let err = api.fetch_categories(Some("2")).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Http {
            status: 500,
            body: "db down".to_string()
        }
    );
}

#[tokio::test]
async fn test_401_maps_to_unauthorized() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, "expired");

    let err = api.fetch_categories(None).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{}/api", addr), "secret");
    let err = api.fetch_categories(None).await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_saved_categories_replace_set() {
    let backend = Backend::default();
    let base = spawn_backend(backend.clone()).await;
    let api = client(&base, "secret");

    assert!(api.fetch_saved_categories("42").await.unwrap().is_empty());

    api.save_categories("42", &["2".to_string(), "10".to_string()])
        .await
        .unwrap();
    api.save_categories("42", &["10".to_string()]).await.unwrap();

    assert_eq!(api.fetch_saved_categories("42").await.unwrap(), vec!["10"]);
    assert_eq!(
        backend.saved.lock().unwrap().get("42").cloned().unwrap(),
        vec![json!("10")]
    );
}

#[tokio::test]
async fn test_discounted_products_query() {
    let base = spawn_backend(Backend::default()).await;
    let api = client(&base, "secret");

    let products = api.fetch_discounted_products("10", 20).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Pixel");
    assert_eq!(products[0].current_price, 399.0);
    assert_eq!(products[0].qty, Some(4.0));

    let err = api.fetch_discounted_products("10", 50).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_community_tree_over_http() {
    let backend = Backend::default();
    backend
        .saved
        .lock()
        .unwrap()
        .insert("42".to_string(), vec![json!("2"), json!(10)]);
    let base = spawn_backend(backend.clone()).await;

    let tree = CategoryTree::new(client(&base, "secret"), SelectionMode::Community)
        .with_notifier(CollectingNotifier::new())
        .with_user("42");

    assert_eq!(tree.load_roots().await.unwrap(), 2);
    assert_eq!(tree.selected_ids(), vec!["2"]);
    assert_eq!(tree.pending_saved(), vec!["10"]);

    assert_eq!(tree.toggle_expand("1").await.unwrap(), ExpandOutcome::Expanded);
    assert_eq!(tree.selected_ids(), vec!["10", "2"]);

    assert!(tree.toggle_expand("2").await.is_err());
    assert!(!tree.node("2").unwrap().children_loaded);

    tree.toggle_selected("2").await.unwrap();
    assert_eq!(tree.save_categories().await.unwrap(), 1);
    assert_eq!(
        backend.saved.lock().unwrap().get("42").cloned().unwrap(),
        vec![json!("10")]
    );

    let notes = tree.notifier().drain();
    assert_eq!(notes.len(), 2);
    assert!(notes[0].message.contains("HTTP 500"));
    assert_eq!(notes[1].message, "Categories saved");
}

#[tokio::test]
async fn test_admin_tree_over_http() {
    let base = spawn_backend(Backend::default()).await;
    let tree = CategoryTree::new(client(&base, "secret"), SelectionMode::Admin)
        .with_notifier(CollectingNotifier::new());

    assert_eq!(tree.load_roots().await.unwrap(), 3);

    assert_eq!(tree.toggle_selected("10").await.unwrap(), SelectOutcome::Selected);
    assert_eq!(tree.discounted_products().unwrap()[0].title, "Pixel");

    assert!(tree.toggle_selected("1").await.is_err());
    assert!(tree.selected_ids().is_empty());
    assert!(tree.discounted_products().is_none());
}
