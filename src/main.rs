use axum::http::HeaderValue;
use murmur::{AppState, db};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("murmur=info")),
        )
        .init();

    let database_url =
        dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:murmur.db?mode=rwc".to_owned());
    let db_pool = db::connect(&database_url).await?;

    let cors = match dotenv::var("ALLOWED_ORIGINS") {
        Ok(origins) => {
            let origins = origins
                .split(',')
                .map(|origin| origin.trim().parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?;
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        Err(_) => CorsLayer::permissive(),
    };

    let app = murmur::router(AppState { db_pool }).layer(cors);

    let port: u16 = dotenv::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "murmur listening");
    axum::serve(listener, app).await?;

    Ok(())
}
