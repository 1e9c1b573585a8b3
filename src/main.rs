use projecthub::config::{Config, DEFAULT_BACKEND_URL};
use projecthub::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if !config.backend_url_from_env {
        tracing::warn!(
            "BACKEND_URL is not set; forwarding to {}",
            DEFAULT_BACKEND_URL
        );
    }

    let bind_addr = config.bind.parse().map_err(|_| "invalid PROJECTHUB_BIND")?;
    let state = AppState::new(config)?;
    let backend = state.upstream.origin().to_string();
    let app = projecthub::build_app(state);

    tracing::info!("projecthub gateway listening on {} (backend {})", bind_addr, backend);
    axum::Server::bind(&bind_addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
