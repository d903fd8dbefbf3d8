use actix_cors::Cors;
use actix_web::{middleware::Compress, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use forum_api::config::Config;
use forum_api::openapi::ApiDoc;
use forum_api::repo::Repo;
use forum_api::{config, AppState, SecurityHeaders};

async fn build_repo(cfg: &Config) -> anyhow::Result<Arc<dyn Repo>> {
    #[cfg(feature = "postgres-store")]
    if let Some(db_url) = cfg.database_url.as_deref() {
        use sqlx::postgres::PgPoolOptions;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(db_url)
            .context("invalid DATABASE_URL")?;
        let repo = forum_api::repo::pg::PgRepo::new(pool);
        repo.migrate().await.context("running migrations")?;
        info!("Using Postgres repository backend");
        return Ok(Arc::new(repo));
    }

    #[cfg(feature = "inmem-store")]
    let fallback: Option<Arc<dyn Repo>> = {
        if cfg.database_url.is_some() {
            tracing::warn!("DATABASE_URL set but postgres-store is disabled; using in-memory backend");
        }
        info!("Using in-memory repository backend");
        Some(Arc::new(forum_api::repo::inmem::InMemRepo::new()))
    };
    #[cfg(not(feature = "inmem-store"))]
    let fallback: Option<Arc<dyn Repo>> = None;

    fallback.context("no repository backend available: set DATABASE_URL")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds to reduce manual setup overhead.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cfg = Config::from_env().context("loading configuration")?;
    info!("Bootstrapping forum API");

    let repo = build_repo(&cfg).await?;
    let openapi = ApiDoc::openapi();
    let state = actix_web::web::Data::new(AppState { repo });
    let security = SecurityHeaders::from_config(&cfg);
    let frontend_url = cfg.frontend_url.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            // local frontend dev servers
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allow_any_header()
            .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .max_age(3600);
        if let Some(front) = frontend_url.as_deref() {
            cors = cors.allowed_origin(front);
        }

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(security)
            .wrap(cors)
            .app_data(state.clone())
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
            .configure(config)
    })
    .bind((cfg.host.as_str(), cfg.port))
    .with_context(|| format!("binding {}:{}", cfg.host, cfg.port))?;

    info!("Listening on http://{}:{}", cfg.host, cfg.port);

    server.run().await?;
    Ok(())
}
