use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use scorecard_engine::config::AppConfig;
use scorecard_engine::error::AppError;
use scorecard_engine::scoring::{
    catalog, scorecard_router, EvaluationResult, MemoryRepository, RawInputs, ScorecardService,
};
use scorecard_engine::telemetry;
use serde_json::json;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Scorecard Engine",
    about = "Evaluate binned credit-risk scorecards from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate one scenario against ad-hoc inputs and print the result
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Variable/bin table (CSV)
    #[arg(long)]
    variables: PathBuf,
    /// Scenario table (CSV)
    #[arg(long)]
    scenarios: PathBuf,
    /// Scenario name to evaluate
    #[arg(long)]
    scenario: String,
    /// Raw input as NAME=value (repeatable)
    #[arg(long = "input", value_parser = parse_input_pair)]
    inputs: Vec<(String, String)>,
    /// Emit the full result as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Score(args) => run_score(args),
    }
}

fn parse_input_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=value, got '{raw}'")),
    }
}

fn load_repository(
    variables_path: &Path,
    scenarios_path: &Path,
) -> Result<MemoryRepository, AppError> {
    let variables = catalog::load_variables(File::open(variables_path)?)?;
    let scenarios = catalog::load_scenarios(File::open(scenarios_path)?)?;
    Ok(MemoryRepository::with_catalog(variables, scenarios))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let repository = Arc::new(load_repository(
        &config.catalog.variables,
        &config.catalog.scenarios,
    )?);
    let service = Arc::new(ScorecardService::new(repository));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(scorecard_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scorecard engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let repository = Arc::new(load_repository(&args.variables, &args.scenarios)?);
    let service = ScorecardService::new(repository);

    let inputs: RawInputs = args.inputs.into_iter().collect();
    let result = service.evaluate(&args.scenario, &inputs)?;

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => eprintln!("failed to render result: {err}"),
        }
    } else {
        render_summary(&result);
    }

    Ok(())
}

fn render_summary(result: &EvaluationResult) {
    println!("Scenario: {}", result.scenario);
    println!("Final log-odds: {:.6}", result.final_log_odds);
    println!(
        "Probability of default: {:.6}",
        result.probability_of_default
    );
    println!("Module breakdown:");
    for (module, total) in &result.module_breakdown {
        println!("  {module}: {total:.6}");
    }
    println!("Matched bins:");
    for row in result.details.iter().filter(|row| row.active) {
        println!(
            "  {} -> bin {} (woe {:.4}, contribution {:.6})",
            row.variable, row.bin_id, row.woe, row.contribution
        );
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
