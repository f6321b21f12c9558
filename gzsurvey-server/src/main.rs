use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use gzsurvey_core::api::{build_router, AppState};
use gzsurvey_core::auth::GoTrueAuthProvider;
use gzsurvey_core::config::{AuthProviderConfig, CorsConfig, RateLimitConfig};
use gzsurvey_core::rate_limit::{InMemoryCounterStore, RateLimits};
use gzsurvey_core::repositories::{
    PostgresAdminAuditLogRepository, PostgresAdminUserRepository,
    PostgresSurveyResponseRepository,
};
use gzsurvey_core::services::{AdminSessionManager, SurveySessionManager};
use gzsurvey_core::tasks::{run_brand_branch_backfill, spawn_rate_limit_purge_task};
use gzsurvey_core::{Database, Error};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Run migrations, then serve HTTP.
    Server,
    /// Run migrations and exit.
    Migrate,
    /// Fill missing brand/branch on survey rows from receipt prefixes.
    Backfill,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "gzsurvey")]
#[command(author, version, about = "Restaurant survey and reward code service")]
struct Args {
    #[arg(long, value_enum, default_value = "server")]
    mode: Mode,

    /// Address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: String,

    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "MAX_DB_CONNECTIONS", default_value_t = 5)]
    max_db_connections: u32,

    /// Base URL of the authentication service.
    #[arg(long, env = "SUPABASE_URL")]
    auth_url: Option<String>,

    /// Service role key used for admin calls to the authentication service.
    #[arg(long, env = "ADMIN_SERVICE_ROLE_KEY", hide_env_values = true)]
    service_key: Option<String>,

    /// Comma-separated browser origins allowed by CORS.
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "https://nipponhasha.ph,https://www.nipponhasha.ph")]
    allowed_origins: String,

    /// Also allow localhost / 127.0.0.1 origins. Development only.
    #[arg(long, env = "ALLOW_LOCALHOST_ORIGINS", default_value_t = false)]
    allow_localhost_origins: bool,

    #[arg(long, env = "RATE_LIMIT_PURGE_INTERVAL_SECS", default_value_t = 300)]
    purge_interval_secs: u64,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("gzsurvey=info".parse().unwrap_or_default());
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("gzsurvey starting. mode={:?}", args.mode);

    let result = match args.mode {
        Mode::Server => run_server(args).await,
        Mode::Migrate => run_migrate(args).await,
        Mode::Backfill => run_backfill(args).await,
    };

    if let Err(e) = result {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
    info!("Main finished. Goodbye!");
}

async fn connect(args: &Args) -> Result<Database, Error> {
    let db = Database::connect(&args.database_url, args.max_db_connections).await?;
    db.apply_schema().await?;
    Ok(db)
}

async fn run_migrate(args: Args) -> Result<(), Error> {
    connect(&args).await?;
    Ok(())
}

async fn run_backfill(args: Args) -> Result<(), Error> {
    let db = connect(&args).await?;
    let repo = PostgresSurveyResponseRepository::new(db.pool().clone());
    let report = run_brand_branch_backfill(&repo).await?;
    info!("Backfill: {} updated, {} skipped", report.updated, report.skipped);
    Ok(())
}

async fn run_server(args: Args) -> Result<(), Error> {
    let addr: SocketAddr = args.bind_addr.parse()?;
    let auth_url = args
        .auth_url
        .clone()
        .ok_or_else(|| Error::InvalidInput("--auth-url / SUPABASE_URL is required".into()))?;
    let service_key = args
        .service_key
        .clone()
        .ok_or_else(|| Error::InvalidInput("--service-key / ADMIN_SERVICE_ROLE_KEY is required".into()))?;

    let db = connect(&args).await?;

    let rate_config = RateLimitConfig {
        purge_interval: Duration::from_secs(args.purge_interval_secs.max(1)),
        ..RateLimitConfig::default()
    };
    let counter_store = Arc::new(InMemoryCounterStore::new());
    let limits = RateLimits::new(&rate_config, counter_store.clone());
    let _purge_handle = spawn_rate_limit_purge_task(counter_store, rate_config.purge_interval);

    let provider = Arc::new(GoTrueAuthProvider::new(&AuthProviderConfig::new(&auth_url, &service_key))?);
    let surveys = Arc::new(SurveySessionManager::new(Arc::new(
        PostgresSurveyResponseRepository::new(db.pool().clone()),
    )));
    let admins = Arc::new(AdminSessionManager::new(
        Arc::new(PostgresAdminUserRepository::new(db.pool().clone())),
        Arc::new(PostgresAdminAuditLogRepository::new(db.pool().clone())),
        provider,
        &limits,
    ));

    let cors = CorsConfig::from_list(&args.allowed_origins, args.allow_localhost_origins);
    if cors.allow_localhost {
        info!("Localhost origins are allowed; do not use this in production");
    }
    let app = build_router(AppState { surveys, admins, limits }, &cors);

    info!("Listening on {}", addr);
    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
