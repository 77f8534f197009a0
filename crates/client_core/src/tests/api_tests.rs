use super::*;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared::{
    domain::{MacroCategory, MacroId},
    protocol::{GenerateMacroRequest, ShareMacroRequest},
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    seen: Arc<Mutex<Vec<String>>>,
}

async fn handle_list(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let public = params.get("public").cloned().unwrap_or_default();
    state.seen.lock().await.push(format!("list public={public}"));
    Json(json!([
        {
            "id": 1,
            "title": "Sum selection",
            "description": "\nSub Total()\nEnd Sub\n",
            "category": "TEMPLATE",
            "created_at": "2024-02-03T04:05:06.789012",
            "is_public": true,
            "latest_version": 1,
            "content": "Sub Total()"
        },
        {
            "id": 2,
            "title": null,
            "description": "Highlight duplicates",
            "category": "FORMATTING",
            "created_at": "2024-02-04T00:00:00+00:00",
            "is_public": false
        },
        {
            "id": 3,
            "title": "Imported",
            "description": "From the old catalogue",
            "category": "LEGACY",
            "created_at": "2023-12-01T08:00:00",
            "is_public": true
        }
    ]))
}

async fn handle_versions(Path(id): Path<i64>) -> impl IntoResponse {
    Json(json!([
        {
            "id": 20,
            "macro_id": id,
            "version_number": 2,
            "content": "Sub V2()",
            "created_at": "2024-02-05T10:00:00"
        }
    ]))
}

async fn handle_share(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(body): Json<ShareMacroRequest>,
) -> impl IntoResponse {
    state
        .seen
        .lock()
        .await
        .push(format!("share {id} is_public={}", body.is_public));
    if id == 1 {
        StatusCode::OK.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "macro not found" })),
        )
            .into_response()
    }
}

async fn handle_generate(
    State(state): State<ServerState>,
    Json(body): Json<GenerateMacroRequest>,
) -> impl IntoResponse {
    state
        .seen
        .lock()
        .await
        .push(serde_json::to_string(&body).unwrap_or_default());
    if body.use_ai && body.description.is_none() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "description required" })),
        )
            .into_response();
    }
    (
        [(
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )],
        b"PK\x03\x04workbook".to_vec(),
    )
        .into_response()
}

async fn spawn_macro_server(prefix: &str) -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let routes = Router::new()
        .route("/macros", get(handle_list))
        .route("/macros/:id/versions", get(handle_versions))
        .route("/macros/:id/share", post(handle_share))
        .route("/generate-macro", post(handle_generate))
        .with_state(state.clone());
    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}{prefix}"), state)
}

#[tokio::test]
async fn lists_macros_with_public_flag_and_naive_timestamps() {
    let (server_url, state) = spawn_macro_server("").await;
    let api = HttpMacroApi::new(&server_url).expect("api");

    let macros = api.list_macros(true).await.expect("list");

    assert_eq!(macros.len(), 3);
    assert_eq!(macros[0].category, MacroCategory::Template);
    assert_eq!(macros[2].category.label(), "LEGACY");
    assert_eq!(macros[1].title, None);
    assert_eq!(macros[0].created_at.to_rfc3339(), "2024-02-03T04:05:06.789012+00:00");
    assert_eq!(state.seen.lock().await.as_slice(), ["list public=true"]);
}

#[tokio::test]
async fn keeps_path_prefix_of_server_url() {
    let (server_url, _state) = spawn_macro_server("/studio").await;
    let api = HttpMacroApi::new(&server_url).expect("api");

    let versions = api.list_versions(MacroId(5)).await.expect("versions");
    assert_eq!(versions[0].macro_id, MacroId(5));
    assert_eq!(versions[0].version_number, 2);
}

#[tokio::test]
async fn share_surfaces_status_and_detail_on_failure() {
    let (server_url, state) = spawn_macro_server("").await;
    let api = HttpMacroApi::new(&server_url).expect("api");

    api.set_share(MacroId(1), false).await.expect("share ok");
    let err = api
        .set_share(MacroId(9), true)
        .await
        .expect_err("missing macro");

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("macro not found"), "{err}");
    assert_eq!(
        state.seen.lock().await.as_slice(),
        ["share 1 is_public=false", "share 9 is_public=true"]
    );
}

#[tokio::test]
async fn generate_returns_raw_workbook_bytes() {
    let (server_url, state) = spawn_macro_server("").await;
    let api = HttpMacroApi::new(&server_url).expect("api");

    let bytes = api
        .generate(&GenerateMacroRequest::from_template(MacroId(1)))
        .await
        .expect("generate");

    assert_eq!(bytes, b"PK\x03\x04workbook".to_vec());
    assert_eq!(
        state.seen.lock().await.as_slice(),
        [r#"{"use_ai":false,"template_id":1}"#]
    );
}

#[tokio::test]
async fn generate_failure_maps_to_status_error() {
    let (server_url, _state) = spawn_macro_server("").await;
    let api = HttpMacroApi::new(&server_url).expect("api");

    let err = api
        .generate(&GenerateMacroRequest {
            description: None,
            use_ai: true,
            template_id: None,
            category: Some(MacroCategory::Custom),
        })
        .await
        .expect_err("server rejects");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = HttpMacroApi::new(&format!("http://{addr}")).expect("api");
    let err = api.list_macros(false).await.expect_err("nothing listening");
    assert!(matches!(err, ClientError::Transport { .. }), "{err:?}");
}

#[test]
fn rejects_unparseable_server_url() {
    assert!(matches!(
        HttpMacroApi::new("not a url"),
        Err(ClientError::InvalidUrl { .. })
    ));
}

#[tokio::test]
async fn execute_saves_generated_artifact_to_directory() {
    let (server_url, _state) = spawn_macro_server("").await;
    let api = HttpMacroApi::new(&server_url).expect("api");
    let dir = tempfile::tempdir().expect("tempdir");
    let sink = DirectoryArtifactSink::new(dir.path());

    let outcome = execute(
        Command::Generate {
            origin: GenerateOrigin::Download(MacroId(1)),
            request: GenerateMacroRequest::from_template(MacroId(1)),
            artifact_name: downloads::DOWNLOAD_ARTIFACT_NAME,
        },
        &api,
        &sink,
    )
    .await;

    let path = match outcome {
        Outcome::Generated { result: Ok(path), .. } => path,
        other => panic!("expected saved artifact, got {other:?}"),
    };
    assert_eq!(path, dir.path().join("macro.xlsx"));
    assert_eq!(std::fs::read(path).expect("read"), b"PK\x03\x04workbook");
}
