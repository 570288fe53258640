use std::sync::Arc;
use tokio::task::JoinHandle;
use deppy_registry::{build_router, Entity, ExportRecord, Payload, Registry};
use pretty_assertions::assert_eq;
use serde_json::json;

fn greeting() -> Entity {
    Entity::new("hello")
        .with_data(json!("world"))
        .with_property("isGreeting", json!(true))
}

/// Serve `registry` on an OS-assigned port. Returns the base URL and the
/// server task, which only ends if the server fails.
async fn spawn_test_server(registry: Arc<Registry>) -> (String, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let server = tokio::spawn(async move {
        axum::serve(listener, build_router(registry)).await.unwrap();
    });
    (base, server)
}

async fn fetch_body(url: &str) -> String {
    let resp = reqwest::get(url).await.unwrap();
    assert_eq!(resp.status(), 200);
    resp.text().await.unwrap()
}

#[tokio::test]
async fn hello_world_export_is_exact() {
    let registry = Arc::new(Registry::new());
    registry.must_upsert(greeting());
    let (base, _server) = spawn_test_server(registry).await;

    let body = fetch_body(&base).await;
    assert_eq!(
        body,
        "{\"id\":\"hello\",\"data\":\"world\",\"properties\":[{\"type\":\"isGreeting\",\"value\":true}]}\n"
    );
}

#[tokio::test]
async fn export_content_type_is_json() {
    let (base, _server) = spawn_test_server(Arc::new(Registry::new())).await;
    let resp = reqwest::get(&base).await.unwrap();

    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("application/json"));
}

#[tokio::test]
async fn export_is_sorted_by_id() {
    let registry = Arc::new(Registry::new());
    for id in ["b", "a", "c"] {
        registry.upsert(Entity::new(id)).unwrap();
    }
    let (base, _server) = spawn_test_server(registry).await;

    let body = fetch_body(&base).await;
    assert_eq!(body, "{\"id\":\"a\"}\n{\"id\":\"b\"}\n{\"id\":\"c\"}\n");
}

#[tokio::test]
async fn deleted_entity_is_not_exported() {
    let registry = Arc::new(Registry::new());
    registry.upsert(Entity::new("x")).unwrap();
    registry.delete("x");
    let (base, _server) = spawn_test_server(registry).await;

    assert_eq!(fetch_body(&base).await, "");
}

#[tokio::test]
async fn each_request_sees_current_entities() {
    let registry = Arc::new(Registry::new());
    let (base, _server) = spawn_test_server(Arc::clone(&registry)).await;
    assert_eq!(fetch_body(&base).await, "");

    registry.upsert(Entity::new("late")).unwrap();
    assert_eq!(fetch_body(&base).await, "{\"id\":\"late\"}\n");

    registry.delete("late");
    assert_eq!(fetch_body(&base).await, "");
}

#[tokio::test]
async fn repeated_exports_are_identical() {
    let registry = Arc::new(Registry::new());
    for i in (0..50).rev() {
        registry
            .upsert(Entity::new(format!("bundle-{i:02}")).with_constraint("olm.package.required", json!({"packageName": "etcd"})))
            .unwrap();
    }
    let (base, _server) = spawn_test_server(registry).await;

    let first = fetch_body(&base).await;
    let second = fetch_body(&base).await;
    assert_eq!(first, second);
    assert_eq!(first.lines().count(), 50);
    assert!(first.starts_with("{\"id\":\"bundle-00\""));
}

#[tokio::test]
async fn versioned_route_serves_same_export() {
    let registry = Arc::new(Registry::new());
    registry.must_upsert(greeting());
    let (base, _server) = spawn_test_server(registry).await;

    let root = fetch_body(&base).await;
    let versioned = fetch_body(&format!("{}/api/v1/entities", base)).await;
    assert_eq!(root, versioned);
}

#[tokio::test]
async fn html_characters_are_emitted_literally() {
    let registry = Arc::new(Registry::new());
    registry
        .upsert(Entity::new("a&b").with_property("olm.maxOpenShiftVersion", json!("<=4.8.x")))
        .unwrap();
    let (base, _server) = spawn_test_server(registry).await;

    let body = fetch_body(&base).await;
    assert_eq!(
        body,
        "{\"id\":\"a&b\",\"properties\":[{\"type\":\"olm.maxOpenShiftVersion\",\"value\":\"<=4.8.x\"}]}\n"
    );
}

#[tokio::test]
async fn unencodable_entity_becomes_error_record() {
    let registry = Arc::new(Registry::new());
    registry.upsert(Entity::new("a")).unwrap();
    registry.upsert(Entity::new("b").with_data(Payload::from_raw("{\"truncated\":"))).unwrap();
    registry.upsert(Entity::new("c")).unwrap();
    let (base, _server) = spawn_test_server(registry).await;

    let body = fetch_body(&base).await;
    let records = ExportRecord::parse_lines(&body).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0], ExportRecord::from(Entity::new("a")));
    match &records[1] {
        ExportRecord::Error { error } => {
            assert!(error.starts_with("failed to encode entity \"b\""), "{error}");
        }
        other => panic!("expected error record, got {other:?}"),
    }
    assert_eq!(records[2], ExportRecord::from(Entity::new("c")));
}

#[tokio::test]
async fn client_disconnect_does_not_disturb_later_exports() {
    let registry = Arc::new(Registry::new());
    let blob = "x".repeat(4096);
    for i in 0..2000 {
        registry
            .upsert(Entity::new(format!("e{i:04}")).with_data(json!(blob)))
            .unwrap();
    }
    let (base, server) = spawn_test_server(Arc::clone(&registry)).await;

    let mut resp = reqwest::get(&base).await.unwrap();
    let first = resp.chunk().await.unwrap();
    assert!(first.is_some());
    drop(resp);

    let body = fetch_body(&base).await;
    assert_eq!(body.lines().count(), 2000);
    assert_eq!(registry.len(), 2000);
    assert!(!server.is_finished());
}

#[tokio::test]
async fn post_is_not_allowed() {
    let (base, _server) = spawn_test_server(Arc::new(Registry::new())).await;
    let resp = reqwest::Client::new().post(&base).send().await.unwrap();

    assert_eq!(resp.status(), 405);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (base, _server) = spawn_test_server(Arc::new(Registry::new())).await;
    let resp = reqwest::get(format!("{}/api/v1/nonexistent", base))
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}
