use std::path::PathBuf;

use catquiz::{db::Db, models::QuestionnaireImport, names, router, AppState};
use clap::Parser;
use color_eyre::eyre::WrapErr;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// SQLite database URL.
    #[arg(long, env, default_value = "sqlite://catquiz.db")]
    database_url: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:8000")]
    address: String,

    /// How many times a visitor may take the same questionnaire.
    #[arg(long, env, default_value_t = names::DEFAULT_MAX_ANSWER_COUNT)]
    max_answer_count: i64,

    /// Mark cookies `Secure` (serve over HTTPS).
    #[arg(long, env)]
    secure_cookies: bool,

    /// Questionnaire JSON files to load before serving.
    #[arg(long)]
    import: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "catquiz=debug,axum=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(&args.database_url).await?;

    for path in &args.import {
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("could not read {}", path.display()))?;
        let import: QuestionnaireImport = serde_json::from_str(&json)
            .wrap_err_with(|| format!("could not parse {}", path.display()))?;
        db.load_questionnaire(import).await?;
    }

    let state = AppState::new(db, args.max_answer_count, args.secure_cookies);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&args.address).await?;
    tracing::info!("listening on {}", args.address);
    axum::serve(listener, app).await?;

    Ok(())
}
