#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::{Json, Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use serde_json::{json, Value};

use projecthub::config::Config;
use projecthub::state::AppState;

pub const GOOD_TOKEN: &str = "Bearer good-token";

pub async fn spawn(app: Router) -> SocketAddr {
    let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
        .serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(async move {
        let _ = server.await;
    });
    addr
}

pub async fn spawn_gateway(backend_origin: &str) -> String {
    let state = AppState::new(Config::with_backend("127.0.0.1:0", backend_origin)).unwrap();
    let addr = spawn(projecthub::build_app(state)).await;
    format!("http://{}", addr)
}

/// Gateway in front of a freshly started fake backend.
pub async fn spawn_stack() -> String {
    let backend = spawn(fake_backend()).await;
    spawn_gateway(&format!("http://{}", backend)).await
}

/// An origin nobody listens on.
pub fn unreachable_origin() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn user_json() -> Value {
    json!({
        "id": "u1",
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "createdAt": "2024-01-01T00:00:00.000Z"
    })
}

pub fn tag_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "color": "#3B82F6",
        "createdAt": "2024-01-01T00:00:00.000Z",
        "createdBy": { "id": "u1", "name": "Ada Lovelace", "email": "ada@example.com" }
    })
}

pub fn member_json(id: &str, name: &str, role: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", id),
        "role": role,
        "joinedAt": "2024-01-01T00:00:00.000Z"
    })
}

pub fn task_json(id: &str, project_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": format!("task {}", id),
        "description": "",
        "status": status,
        "projectId": project_id,
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-01T00:00:00.000Z"
    })
}

pub fn project_json(id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Project {}", id),
        "description": "demo",
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-02T00:00:00.000Z",
        "userRole": role,
        "memberCount": 2,
        "tags": [tag_json("t1", "backend")]
    })
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "statusCode": 404, "message": message, "error": "Not Found" })),
    )
        .into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "statusCode": 500, "message": "Internal server error" })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(GOOD_TOKEN)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "statusCode": 401, "message": "Unauthorized" })),
    )
        .into_response()
}

async fn login(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.contains_key(header::AUTHORIZATION) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "unexpected header" })))
            .into_response();
    }
    if body["password"] != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "statusCode": 401,
                "message": "Invalid credentials",
                "error": "Unauthorized"
            })),
        )
            .into_response();
    }
    Json(json!({ "access_token": "good-token", "user": user_json() })).into_response()
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["email"].as_str().map(|e| e.contains('@')) != Some(true) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "statusCode": 400,
                "message": ["email must be an email", "password must be longer"],
                "error": "Bad Request"
            })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User created", "user": user_json() })),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(user_json()).into_response()
}

async fn list_projects(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([project_json("p1", "OWNER"), project_json("p2", "VIEWER")])).into_response()
}

async fn paginated(Query(params): Query<HashMap<String, String>>) -> Response {
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: u32 = params.get("limit").and_then(|p| p.parse().ok()).unwrap_or(10);
    Json(json!({
        "data": [project_json("p1", "OWNER")],
        "meta": {
            "currentPage": page,
            "totalPages": 3,
            "totalItems": 21,
            "itemsPerPage": limit,
            "hasNextPage": page < 3,
            "hasPreviousPage": page > 1
        },
        "echo": params
    }))
    .into_response()
}

async fn get_project(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "missing" => not_found("Project not found"),
        "html" => (
            [(header::CONTENT_TYPE, "text/html")],
            "<html><body>Bad Gateway</body></html>",
        )
            .into_response(),
        _ => Json(project_json(&id, "OWNER")).into_response(),
    }
}

async fn delete_project(Path(id): Path<String>) -> Response {
    if id == "gone" {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(json!({ "message": "Project deleted successfully" })).into_response()
}

async fn invite(Path(_id): Path<String>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let role = body["role"].as_str().unwrap_or("VIEWER").to_string();
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User invited",
            "member": member_json(&email, "Invitee", &role)
        })),
    )
        .into_response()
}

async fn members(Path(id): Path<String>) -> Response {
    if matches!(id.as_str(), "flaky" | "broken") {
        return server_error();
    }
    Json(json!({
        "members": [
            member_json("u1", "Ada", "OWNER"),
            member_json("u2", "Grace", "CONTRIBUTOR"),
            member_json("u1", "Ada", "OWNER")
        ]
    }))
    .into_response()
}

async fn project_tags(Path(id): Path<String>) -> Response {
    if matches!(id.as_str(), "untagged" | "broken") {
        return server_error();
    }
    Json(json!([tag_json("t1", "backend")])).into_response()
}

async fn add_project_tags(Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    let mut project = project_json(&id, "OWNER");
    let tags: Vec<Value> = body["tagIds"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|tag_id| tag_json(tag_id.as_str().unwrap_or_default(), "attached"))
        .collect();
    project["tags"] = Value::Array(tags);
    (StatusCode::CREATED, Json(project)).into_response()
}

async fn remove_project_tag(Path((_id, tag_id)): Path<(String, String)>) -> Response {
    if tag_id == "missing" {
        return not_found("Tag not found");
    }
    Json(json!({ "message": "Tag removed from project" })).into_response()
}

async fn project_tasks(Path(id): Path<String>) -> Response {
    if matches!(id.as_str(), "taskless" | "broken") {
        return server_error();
    }
    Json(json!([task_json("k1", &id, "TODO"), task_json("k2", &id, "DONE")])).into_response()
}

async fn create_task(Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    let mut task = task_json("k3", &id, body["status"].as_str().unwrap_or("TODO"));
    task["title"] = body["title"].clone();
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn list_tags() -> Response {
    Json(json!([tag_json("t1", "backend"), tag_json("t2", "frontend")])).into_response()
}

async fn create_tag(Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    (StatusCode::CREATED, Json(tag_json("t9", &name))).into_response()
}

async fn update_tag(Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    if id == "missing" {
        return not_found("Tag not found");
    }
    let name = body["name"].as_str().unwrap_or("unchanged").to_string();
    Json(tag_json(&id, &name)).into_response()
}

async fn delete_tag(Path(_id): Path<String>) -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn update_task(Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    Json(task_json(&id, "p1", body["status"].as_str().unwrap_or("TODO"))).into_response()
}

async fn delete_task(Path(id): Path<String>) -> Response {
    if id == "gone" {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(json!({ "message": "Task deleted successfully" })).into_response()
}

async fn suggest_tags(Json(body): Json<Value>) -> Response {
    let suggestions: Vec<String> = body["content"]
        .as_str()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    Json(json!({ "suggestions": suggestions, "confidence": 0.87 })).into_response()
}

async fn analyze(Path(_id): Path<String>) -> Response {
    Json(json!({
        "healthScore": 72.5,
        "riskFactors": ["few reviewers"],
        "recommendations": ["add tests"],
        "predictedCompletionDate": "2025-06-01",
        "bottlenecks": []
    }))
    .into_response()
}

async fn summary(Path(_id): Path<String>) -> Response {
    Json(json!({ "summary": "On track", "keyInsights": ["2 tasks open"] })).into_response()
}

pub fn fake_backend() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/users/me", get(me))
        .route("/projects", get(list_projects))
        .route("/projects/paginated", get(paginated))
        .route("/projects/:id", get(get_project).delete(delete_project))
        .route("/projects/:id/invite", post(invite))
        .route("/projects/:id/members", get(members))
        .route(
            "/projects/:id/tags",
            get(project_tags).post(add_project_tags),
        )
        .route("/projects/:id/tags/:tag_id", delete(remove_project_tag))
        .route("/projects/:id/tasks", get(project_tasks).post(create_task))
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/:id", patch(update_tag).delete(delete_tag))
        .route("/tasks/:id", patch(update_task).delete(delete_task))
        .route("/ai/suggest-tags", post(suggest_tags))
        .route("/ai/analyze-project/:id", get(analyze))
        .route("/ai/project-summary/:id", get(summary))
}
