use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::gateway::{HttpGateway, RetrievalError, RetrievalGateway};

#[derive(Clone, Default)]
struct ServerState {
    /// `(method, path, query)` of each request, for shape assertions.
    requests: Arc<Mutex<Vec<(String, String, String)>>>,
    /// Body of the last POSTed exploration.
    saved_body: Arc<Mutex<Option<Value>>>,
    /// When set, every endpoint answers with this status and detail.
    failure: Arc<Mutex<Option<(u16, String)>>>,
}

impl ServerState {
    fn record(&self, method: &str, path: &str, query: &HashMap<String, String>) {
        let mut pairs: Vec<String> = query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        pairs.sort();
        self.requests
            .lock()
            .expect("lock")
            .push((method.to_string(), path.to_string(), pairs.join("&")));
    }

    fn forced_failure(&self) -> Option<(StatusCode, Json<Value>)> {
        self.failure
            .lock()
            .expect("lock")
            .as_ref()
            .map(|(status, detail)| {
                (
                    StatusCode::from_u16(*status).expect("status"),
                    Json(json!({ "detail": detail })),
                )
            })
    }
}

async fn spawn_graph_service() -> (String, ServerState) {
    let state = ServerState::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let app = Router::new()
        .route("/api/search", get(handle_search))
        .route("/api/explore/:title", get(handle_explore))
        .route("/api/explorations", get(handle_list).post(handle_save))
        .route("/api/explorations/:id", delete(handle_delete))
        .with_state(state.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{addr}"), state)
}

async fn handle_search(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.record("GET", "/api/search", &query);
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    let term = query.get("term").cloned().unwrap_or_default();
    if term == "zzz-no-match" {
        // the upstream encyclopedia omits the envelope entirely on no-match
        return (StatusCode::OK, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "query": {
                "search": [
                    { "title": term, "snippet": "a <span class=\"searchmatch\">hit</span>" }
                ]
            }
        })),
    )
}

async fn handle_explore(
    State(state): State<ServerState>,
    Path(title): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.record("GET", &format!("/api/explore/{title}"), &query);
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    (
        StatusCode::OK,
        Json(json!({
            "nodes": [
                { "id": title, "label": title, "summary": "root", "degree_centrality": 1.0 },
                { "id": "Neighbor", "label": "Neighbor" }
            ],
            "edges": [ { "from": title, "to": "Neighbor" } ]
        })),
    )
}

async fn handle_list(State(state): State<ServerState>) -> (StatusCode, Json<Value>) {
    state.record("GET", "/api/explorations", &HashMap::new());
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    (
        StatusCode::OK,
        Json(json!([
            {
                "id": "abc",
                "name": "Cats",
                "nodes": [ { "id": "Cat", "label": "Cat" } ],
                "edges": []
            }
        ])),
    )
}

async fn handle_save(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("POST", "/api/explorations", &HashMap::new());
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    *state.saved_body.lock().expect("lock") = Some(body);
    (StatusCode::CREATED, Json(json!({ "id": "new", "name": "x", "nodes": [], "edges": [] })))
}

async fn handle_delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.record("DELETE", &format!("/api/explorations/{id}"), &HashMap::new());
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    (StatusCode::NO_CONTENT, Json(json!(null)))
}

fn gateway(server_url: &str) -> HttpGateway {
    HttpGateway::new(server_url, Duration::from_secs(5)).expect("gateway")
}

#[tokio::test]
async fn search_unwraps_the_proxied_envelope() {
    let (server_url, state) = spawn_graph_service().await;
    let gateway = gateway(&server_url);

    let results = gateway.search("Cat").await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Cat");

    let requests = state.requests.lock().expect("lock");
    assert_eq!(
        requests[0],
        ("GET".into(), "/api/search".into(), "term=Cat".into())
    );
}

#[tokio::test]
async fn search_without_envelope_yields_empty_results() {
    let (server_url, _state) = spawn_graph_service().await;
    let gateway = gateway(&server_url);

    let results = gateway.search("zzz-no-match").await.expect("search");
    assert!(results.is_empty());
}

#[tokio::test]
async fn explore_requests_one_hop_with_encoded_title() {
    let (server_url, state) = spawn_graph_service().await;
    let gateway = gateway(&server_url);

    let snapshot = gateway.explore("Big Cat").await.expect("explore");
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.nodes[0].centrality, Some(1.0));
    assert_eq!(snapshot.edges[0].key(), ("Big Cat", "Neighbor"));

    // axum decodes the percent-encoded segment back to the raw title
    let requests = state.requests.lock().expect("lock");
    assert_eq!(
        requests[0],
        ("GET".into(), "/api/explore/Big Cat".into(), "depth=1".into())
    );
}

#[tokio::test]
async fn save_posts_the_flattened_record() {
    let (server_url, state) = spawn_graph_service().await;
    let gateway = gateway(&server_url);

    let snapshot = gateway.explore("Cat").await.expect("explore");
    gateway.save("My cats", &snapshot).await.expect("save");

    let body = state
        .saved_body
        .lock()
        .expect("lock")
        .clone()
        .expect("saved body");
    assert_eq!(body["name"], "My cats");
    assert_eq!(body["nodes"].as_array().expect("nodes").len(), 2);
    assert_eq!(body["edges"][0]["from"], "Cat");
    assert!(body.get("graph").is_none());
}

#[tokio::test]
async fn list_saved_deserializes_records() {
    let (server_url, _state) = spawn_graph_service().await;
    let gateway = gateway(&server_url);

    let saved = gateway.list_saved().await.expect("list");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, "abc");
    assert_eq!(saved[0].graph.nodes.len(), 1);
}

#[tokio::test]
async fn delete_hits_the_record_endpoint() {
    let (server_url, state) = spawn_graph_service().await;
    let gateway = gateway(&server_url);

    gateway.delete("abc").await.expect("delete");

    let requests = state.requests.lock().expect("lock");
    assert_eq!(
        requests[0],
        ("DELETE".into(), "/api/explorations/abc".into(), String::new())
    );
}

#[tokio::test]
async fn non_success_maps_to_status_error_with_detail() {
    let (server_url, state) = spawn_graph_service().await;
    *state.failure.lock().expect("lock") = Some((500, "neo4j unavailable".into()));
    let gateway = gateway(&server_url);

    let err = gateway.explore("Cat").await.expect_err("err");
    match err {
        RetrievalError::Status { status, detail } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(detail, "neo4j unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    // nothing listens on this port
    let gateway = gateway("http://127.0.0.1:1");

    let err = gateway.search("Cat").await.expect_err("err");
    assert!(matches!(err, RetrievalError::Transport(_)));
}
