mod server_config;
mod error;
mod page;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router
};
use clap::Parser;
use serde::Deserialize;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funds::{ContributionForm, FundsLedger, ProgressState, ProgressView, backend::DocumentStore};
use error::ServerError;
use server_config::AppConfig;

const SERVER_CONFIG: &str = "resources/server.toml";

type SharedLedger = Arc<FundsLedger<Arc<dyn DocumentStore>>>;

#[derive(Clone)]
struct AppState {
    ledger: SharedLedger
}

#[derive(Parser, Debug)]
#[clap(version, about = "Serve the funds tracking page")]
struct Args {
    /// Path to the server configuration
    #[clap(short, long, value_parser, default_value = SERVER_CONFIG)]
    config: PathBuf
}

#[derive(Deserialize)]
struct Contribution {
    #[serde(default)]
    amount: String
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&state.ledger.state().view(), ""))
}

async fn contribute(State(state): State<AppState>, Form(contribution): Form<Contribution>) -> Response {
    let mut form = ContributionForm::with_input(&contribution.amount);
    match form.submit(state.ledger.as_ref()).await {
        Ok(_) => Redirect::to("/").into_response(),
        // nothing is shown for a rejected or failed contribution, the value stays in the field
        Err(_) => Html(page::render(&state.ledger.state().view(), form.input())).into_response()
    }
}

async fn progress(State(state): State<AppState>) -> Json<ProgressView> {
    Json(state.ledger.state().view())
}

async fn add_contribution(
    State(state): State<AppState>,
    Json(contribution): Json<Contribution>
) -> Result<Json<ProgressView>, ServerError> {
    state.ledger.submit_contribution(&contribution.amount).await?;
    Ok(Json(state.ledger.state().view()))
}

fn build_router(state: AppState, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/contribute", post(contribute))
        .route("/api/progress", get(progress))
        .route("/api/contributions", post(add_contribution))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funds=info,funds_srv=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = if args.config.exists() {
        AppConfig::read(&args.config)
            .with_context(|| format!("loading {}", args.config.display()))?
    } else {
        log::warn!("No configuration at {}, using defaults", args.config.display());
        AppConfig::default()
    };

    let ledger: SharedLedger = Arc::new(FundsLedger::new(config.store.open(), ProgressState::new(config.goal)));

    // the page is served straight away and shows 0 until the stored total arrives
    let loader = ledger.clone();
    tokio::spawn(async move {
        loader.initialize().await;
    });

    let address = config.server.address()?;
    let app = build_router(AppState { ledger }, config.server.static_dir.clone());
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    log::info!("Serving funds page on http://{}", address);
    axum::serve(listener, app).await?;
    Ok(())
}
