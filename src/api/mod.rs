//! Typed wrappers over the gateway's `/api` surface.

pub mod auth;
pub mod projects;

pub use auth::AuthApi;
pub use projects::ProjectsApi;

/// Percent-encodes one path segment.
pub(crate) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
