use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use myapp::config::ApplicationConfig;
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

const ENTITIES: [(&str, &str); 4] = [("a", "as"), ("b", "bs"), ("c", "cs"), ("d", "ds")];

fn unique_sqlite_path(prefix: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "myapp-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

async fn build_app(prefix: &str, application: ApplicationConfig) -> (Router, std::path::PathBuf) {
    let temp_path = unique_sqlite_path(prefix);
    let database_url = format!("sqlite:{}", temp_path.display());
    let pool = myapp::db::connect(&database_url, 4)
        .await
        .expect("failed to open test database");

    let state = myapp::AppState::new(pool, application);
    (myapp::app_router(state), temp_path)
}

async fn cleanup(temp_path: std::path::PathBuf) {
    let _ = tokio::fs::remove_file(&temp_path).await;
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body was not json")
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");

    let status = resp.status();
    let headers = resp.headers().clone();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read body")
        .to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> Reply {
    send(app, method, uri, Some("application/json"), Some(body)).await
}

async fn list_len(app: &Router, es: &str) -> usize {
    let reply = send(app, "GET", &format!("/api/{es}"), None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.json().as_array().expect("list is an array").len()
}

#[tokio::test]
async fn crud_lifecycle_for_every_entity() {
    let (app, temp_path) = build_app("crud", ApplicationConfig::default()).await;

    for (name, es) in ENTITIES {
        let collection = format!("/api/{es}");
        assert_eq!(list_len(&app, es).await, 0);

        // create
        let created = send_json(&app, "POST", &collection, json!({})).await;
        assert_eq!(created.status, StatusCode::CREATED, "create {name}");
        let id = created.json()["id"].as_i64().expect("created id");
        assert_eq!(
            created.header("location"),
            Some(format!("{collection}/{id}").as_str())
        );
        assert_eq!(
            created.header("x-myapp-alert"),
            Some(format!("myApp.{name}.created").as_str())
        );
        assert_eq!(created.header("x-myapp-params"), Some(id.to_string().as_str()));

        // create with id is rejected and nothing is written
        let rejected = send_json(&app, "POST", &collection, json!({ "id": 1 })).await;
        assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
        assert_eq!(rejected.header("x-myapp-error"), Some("error.idexists"));
        assert_eq!(rejected.header("x-myapp-params"), Some(name));
        assert_eq!(
            rejected.header("content-type"),
            Some("application/problem+json")
        );
        assert_eq!(rejected.json()["message"], "error.idexists");
        assert_eq!(list_len(&app, es).await, 1);

        // get
        let item = format!("{collection}/{id}");
        let fetched = send(&app, "GET", &item, None, None).await;
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.json()["id"], id);

        let missing = send(&app, "GET", &format!("{collection}/{}", i64::MAX), None, None).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        // update
        let updated = send_json(&app, "PUT", &item, json!({ "id": id })).await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.json()["id"], id);
        assert_eq!(
            updated.header("x-myapp-alert"),
            Some(format!("myApp.{name}.updated").as_str())
        );

        let mismatch = send_json(&app, "PUT", &item, json!({ "id": id + 1 })).await;
        assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);
        assert_eq!(mismatch.header("x-myapp-error"), Some("error.idinvalid"));

        let no_id = send_json(&app, "PUT", &item, json!({})).await;
        assert_eq!(no_id.status, StatusCode::BAD_REQUEST);
        assert_eq!(no_id.header("x-myapp-error"), Some("error.idnull"));

        let ghost = id + 1000;
        let unknown = send_json(
            &app,
            "PUT",
            &format!("{collection}/{ghost}"),
            json!({ "id": ghost }),
        )
        .await;
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);
        assert_eq!(unknown.json()["message"], "error.idnotfound");

        let without_id = send_json(&app, "PUT", &collection, json!({ "id": id })).await;
        assert_eq!(without_id.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(without_id.header("allow"), Some("GET, POST"));

        // partial update
        let patched = send(
            &app,
            "PATCH",
            &item,
            Some("application/merge-patch+json"),
            Some(json!({ "id": id })),
        )
        .await;
        assert_eq!(patched.status, StatusCode::OK);
        assert_eq!(patched.json()["id"], id);

        let patch_without_id = send(
            &app,
            "PATCH",
            &collection,
            Some("application/merge-patch+json"),
            Some(json!({ "id": id })),
        )
        .await;
        assert_eq!(patch_without_id.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(list_len(&app, es).await, 1);

        // delete, twice
        let deleted = send(&app, "DELETE", &item, None, None).await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);
        assert_eq!(
            deleted.header("x-myapp-alert"),
            Some(format!("myApp.{name}.deleted").as_str())
        );
        assert_eq!(list_len(&app, es).await, 0);
        let gone = send(&app, "GET", &item, None, None).await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);

        let again = send(&app, "DELETE", &item, None, None).await;
        assert_eq!(again.status, StatusCode::NO_CONTENT);
        assert_eq!(list_len(&app, es).await, 0);
    }

    cleanup(temp_path).await;
}

#[tokio::test]
async fn b_reference_is_replaced_merged_and_cleared() {
    let (app, temp_path) = build_app("b-ref", ApplicationConfig::default()).await;

    let a_id = send_json(&app, "POST", "/api/as", json!({})).await.json()["id"]
        .as_i64()
        .expect("a id");

    let created = send_json(&app, "POST", "/api/bs", json!({ "a": { "id": a_id } })).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let b_id = created.json()["id"].as_i64().expect("b id");
    assert_eq!(created.json()["a"]["id"], a_id);
    let item = format!("/api/bs/{b_id}");

    // absent field keeps the reference
    let kept = send(
        &app,
        "PATCH",
        &item,
        Some("application/merge-patch+json"),
        Some(json!({ "id": b_id })),
    )
    .await;
    assert_eq!(kept.status, StatusCode::OK);
    assert_eq!(kept.json()["a"]["id"], a_id);

    // explicit null clears it
    let cleared = send(
        &app,
        "PATCH",
        &item,
        Some("application/merge-patch+json"),
        Some(json!({ "id": b_id, "a": null })),
    )
    .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.json()["a"].is_null());

    // an object sets it
    let set = send(
        &app,
        "PATCH",
        &item,
        Some("application/merge-patch+json"),
        Some(json!({ "id": b_id, "a": { "id": a_id } })),
    )
    .await;
    assert_eq!(set.status, StatusCode::OK);
    assert_eq!(set.json()["a"]["id"], a_id);
    send(
        &app,
        "PATCH",
        &item,
        Some("application/merge-patch+json"),
        Some(json!({ "id": b_id, "a": null })),
    )
    .await;

    // full update sets it back
    let replaced = send_json(&app, "PUT", &item, json!({ "id": b_id, "a": { "id": a_id } })).await;
    assert_eq!(replaced.json()["a"]["id"], a_id);

    // a dangling reference is a storage fault and the row is left untouched
    let dangling = send_json(&app, "PUT", &item, json!({ "id": b_id, "a": { "id": a_id + 99 } })).await;
    assert_eq!(dangling.status, StatusCode::INTERNAL_SERVER_ERROR);
    let fetched = send(&app, "GET", &item, None, None).await;
    assert_eq!(fetched.json()["a"]["id"], a_id);

    // full update without the field clears it
    let replaced = send_json(&app, "PUT", &item, json!({ "id": b_id })).await;
    assert!(replaced.json()["a"].is_null());

    // deleting the referenced A nulls the reference
    send_json(&app, "PUT", &item, json!({ "id": b_id, "a": { "id": a_id } })).await;
    let deleted = send(&app, "DELETE", &format!("/api/as/{a_id}"), None, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let fetched = send(&app, "GET", &item, None, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert!(fetched.json()["a"].is_null());

    cleanup(temp_path).await;
}

#[tokio::test]
async fn list_sorting_and_streaming() {
    let (app, temp_path) = build_app("list", ApplicationConfig::default()).await;

    // exactly one element streamed after one insert
    let created = send_json(&app, "POST", "/api/cs", json!({})).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/cs")
                .header(header::ACCEPT, "application/x-ndjson")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/x-ndjson"
    );
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let lines: Vec<Value> = std::str::from_utf8(&body)
        .expect("utf-8 body")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("each line is json"))
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0], created.json());

    // sort=id,desc on both representations
    for _ in 0..3 {
        send_json(&app, "POST", "/api/as", json!({})).await;
    }
    let sorted = send(&app, "GET", "/api/as?sort=id,desc", None, None).await;
    assert_eq!(sorted.status, StatusCode::OK);
    let ids: Vec<i64> = sorted
        .json()
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v["id"].as_i64().expect("id"))
        .collect();
    let mut expected = ids.clone();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids.len(), 3);
    assert_eq!(ids, expected);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/as?sort=id,asc")
                .header(header::ACCEPT, "application/ndjson")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let streamed: Vec<i64> = std::str::from_utf8(&body)
        .expect("utf-8 body")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).expect("json line")["id"].as_i64().expect("id"))
        .collect();
    let mut ascending = ids.clone();
    ascending.sort_unstable();
    assert_eq!(streamed, ascending);

    // B accepts a.id; unknown properties are rejected
    let by_ref = send(&app, "GET", "/api/bs?sort=a.id,desc&sort=id", None, None).await;
    assert_eq!(by_ref.status, StatusCode::OK);

    let bad = send(&app, "GET", "/api/as?sort=name,asc", None, None).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.header("x-myapp-error"), Some("error.sortinvalid"));

    cleanup(temp_path).await;
}

#[tokio::test]
async fn malformed_requests_and_unknown_routes() {
    let (app, temp_path) = build_app("malformed", ApplicationConfig::default()).await;

    let syntax = send(&app, "POST", "/api/as", Some("application/json"), None).await;
    assert_eq!(syntax.status, StatusCode::BAD_REQUEST);
    assert!(syntax.header("x-myapp-error").is_none());

    let wrong_shape = send_json(&app, "POST", "/api/as", json!({ "id": "seven" })).await;
    assert_eq!(wrong_shape.status, StatusCode::BAD_REQUEST);

    let no_content_type = send(&app, "POST", "/api/as", None, Some(json!({}))).await;
    assert_eq!(no_content_type.status, StatusCode::BAD_REQUEST);

    let bad_id = send(&app, "GET", "/api/as/seven", None, None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.json()["message"], "error.http.400");

    let unknown = send(&app, "GET", "/api/zs", None, None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.json()["message"], "error.http.404");

    assert_eq!(list_len(&app, "as").await, 0);

    cleanup(temp_path).await;
}

#[tokio::test]
async fn myapp2_translates_alerts_with_namespaced_entity_names() {
    let application = ApplicationConfig {
        name: "myApp2".to_string(),
        enable_translation: true,
        entity_namespace: "myApp2".to_string(),
    };
    let (app, temp_path) = build_app("myapp2-translated", application).await;

    let created = send_json(&app, "POST", "/api/cs", json!({})).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(
        created.header("x-myapp2-alert"),
        Some("myApp2.myApp2C.created")
    );

    let rejected = send_json(&app, "POST", "/api/cs", json!({ "id": 1 })).await;
    assert_eq!(rejected.header("x-myapp2-error"), Some("error.idexists"));
    assert_eq!(rejected.header("x-myapp2-params"), Some("myApp2C"));
    assert_eq!(rejected.json()["entityName"], "myApp2C");

    cleanup(temp_path).await;
}

#[tokio::test]
async fn untranslated_alerts_use_namespaced_sentences() {
    let application = ApplicationConfig {
        name: "myApp2".to_string(),
        enable_translation: false,
        entity_namespace: "myApp2".to_string(),
    };
    let (app, temp_path) = build_app("myapp2", application).await;

    let created = send_json(&app, "POST", "/api/cs", json!({})).await;
    let id = created.json()["id"].as_i64().expect("id");
    assert_eq!(
        created.header("x-myapp2-alert"),
        Some(format!("A new myApp2C is created with identifier {id}").as_str())
    );

    let rejected = send_json(&app, "POST", "/api/cs", json!({ "id": id })).await;
    assert_eq!(
        rejected.header("x-myapp2-error"),
        Some("A new c cannot already have an ID")
    );
    assert_eq!(rejected.header("x-myapp2-params"), Some("myApp2C"));

    cleanup(temp_path).await;
}

#[tokio::test]
async fn health_and_request_id() {
    let (app, temp_path) = build_app("health", ApplicationConfig::default()).await;

    let health = send(&app, "GET", "/management/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json(), json!({ "status": "UP" }));
    let generated = health.header("x-request-id").expect("generated request id");
    assert_eq!(generated.len(), 16);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/ds")
                .header("x-request-id", "trace-me")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "trace-me");

    cleanup(temp_path).await;
}
