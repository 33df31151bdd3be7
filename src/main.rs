//! # recipe-api 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 명령줄 인자 파싱 (`serve` 또는 `create-superuser`)
//! 4. SQLite 연결 풀 생성 및 마이그레이션
//! 5. 미디어 디렉토리 생성 후 HTTP 서버 시작
//!
//! 라우터 조립과 핸들러는 라이브러리 크레이트(`recipe_api`)에 있습니다.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipe_api::{config::Config, db, routes::AppState, services::accounts};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 레시피 관리 REST API 서버
#[derive(Debug, Parser)]
#[command(name = "recipe-api", version, about)]
struct Cli {
    /// 생략하면 `serve`로 동작합니다.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// HTTP 서버를 시작합니다.
    Serve,
    /// 관리자 계정을 만듭니다.
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_api=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("DATABASE_URL and JWT_SECRET must be set")?;

    let pool = db::connect(&config.database_url, 5).await?;

    tracing::info!("Running database migrations...");
    db::migrate(&pool).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, pool).await,
        Command::CreateSuperuser { email, password } => {
            let user = accounts::create_superuser(&pool, &email, &password).await?;
            tracing::info!("Superuser created: {} (id {})", user.email, user.id);
            Ok(())
        }
    }
}

async fn serve(config: Config, pool: sqlx::SqlitePool) -> Result<()> {
    let media_root = Path::new(&config.media_root);
    if !media_root.exists() {
        // create_dir_all: 중간 디렉토리까지 모두 생성 (mkdir -p와 같음)
        tokio::fs::create_dir_all(media_root).await?;
        tracing::info!("Created media directory: {}", config.media_root);
    }

    let state = AppState {
        pool,
        media_root: config.media_root.clone(),
        jwt_secret: config.jwt_secret.clone(),
    };

    let app = recipe_api::app(state, config.max_upload_bytes);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
