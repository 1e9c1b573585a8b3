use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{Json, OriginalUri, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{on, MethodRouter};
use axum::Router;
use serde_json::json;

use crate::proxy::{self, ProxyRoute, ResponseShape, Verb};
use crate::state::AppState;

pub const PROXY_ROUTES: &[ProxyRoute] = &[
    ProxyRoute::public("auth.login", Verb::Post, "/api/auth/login"),
    ProxyRoute::public("auth.signup", Verb::Post, "/api/auth/signup"),
    ProxyRoute::authenticated("users.me", Verb::Get, "/api/users/me"),
    ProxyRoute::forwarded("projects.list", Verb::Get, "/api/projects"),
    ProxyRoute::forwarded("projects.create", Verb::Post, "/api/projects"),
    ProxyRoute::forwarded("projects.paginated", Verb::Get, "/api/projects/paginated"),
    ProxyRoute::forwarded("projects.get", Verb::Get, "/api/projects/:id"),
    ProxyRoute::forwarded("projects.update", Verb::Patch, "/api/projects/:id"),
    ProxyRoute::forwarded("projects.delete", Verb::Delete, "/api/projects/:id"),
    ProxyRoute::forwarded("projects.invite", Verb::Post, "/api/projects/:id/invite"),
    ProxyRoute::forwarded("projects.members", Verb::Get, "/api/projects/:id/members")
        .with_shape(ResponseShape::UnwrapField("members")),
    ProxyRoute::forwarded("projects.tags", Verb::Get, "/api/projects/:id/tags"),
    ProxyRoute::forwarded("projects.tags.add", Verb::Post, "/api/projects/:id/tags"),
    ProxyRoute::forwarded(
        "projects.tags.remove",
        Verb::Delete,
        "/api/projects/:id/tags/:tag_id",
    )
    .with_shape(ResponseShape::NoContentOnSuccess),
    ProxyRoute::forwarded("projects.tasks", Verb::Get, "/api/projects/:id/tasks"),
    ProxyRoute::forwarded("projects.tasks.create", Verb::Post, "/api/projects/:id/tasks"),
    ProxyRoute::forwarded("tags.list", Verb::Get, "/api/tags"),
    ProxyRoute::forwarded("tags.create", Verb::Post, "/api/tags"),
    ProxyRoute::forwarded("tags.get", Verb::Get, "/api/tags/:id"),
    ProxyRoute::forwarded("tags.update", Verb::Patch, "/api/tags/:id"),
    ProxyRoute::forwarded("tags.delete", Verb::Delete, "/api/tags/:id")
        .with_shape(ResponseShape::NoContentOnSuccess),
    ProxyRoute::forwarded("tasks.update", Verb::Patch, "/api/tasks/:id"),
    ProxyRoute::forwarded("tasks.delete", Verb::Delete, "/api/tasks/:id"),
    ProxyRoute::forwarded("ai.suggest_tags", Verb::Post, "/api/ai/suggest-tags"),
    ProxyRoute::forwarded("ai.analyze_project", Verb::Get, "/api/ai/analyze-project/:id"),
    ProxyRoute::forwarded("ai.project_summary", Verb::Get, "/api/ai/project-summary/:id"),
];

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.metrics.snapshot()))
}

/// Registers every table entry against the shared forwarding handler,
/// merging verbs that share a path into one method router.
pub fn proxy_router(routes: &'static [ProxyRoute]) -> Router<AppState> {
    let mut by_path: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();

    for route in routes {
        let handler = move |State(state): State<AppState>,
                            OriginalUri(uri): OriginalUri,
                            headers: HeaderMap,
                            body: Bytes| async move {
            proxy::forward(&state, route, &uri, &headers, body).await
        };

        let method_router = match by_path.remove(route.path) {
            Some(existing) => existing.on(route.verb.filter(), handler),
            None => on(route.verb.filter(), handler),
        };
        by_path.insert(route.path, method_router);
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| {
            router.route(path, method_router)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_route_lives_under_api() {
        for route in PROXY_ROUTES {
            assert!(route.path.starts_with("/api/"), "{}", route.name);
        }
    }

    #[test]
    fn route_names_and_verb_paths_are_unique() {
        let mut names = HashSet::new();
        let mut pairs = HashSet::new();
        for route in PROXY_ROUTES {
            assert!(names.insert(route.name), "duplicate name {}", route.name);
            assert!(
                pairs.insert((route.path, route.verb.method())),
                "duplicate {:?} {}",
                route.verb,
                route.path
            );
        }
    }

    #[test]
    fn only_profile_lookup_demands_a_token() {
        let required: Vec<_> = PROXY_ROUTES
            .iter()
            .filter(|r| r.auth == proxy::AuthPolicy::Required)
            .map(|r| r.name)
            .collect();
        assert_eq!(required, vec!["users.me"]);
    }
}
