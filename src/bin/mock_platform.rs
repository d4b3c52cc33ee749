//! Mock ML platform server for integration testing
//!
//! Implements just enough of the platform's HTTP API for the harness to
//! run end to end, without a real training backend. Prints
//! `listening at: <addr>` once bound.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use serde_json::{json, Value};

/// How the mock platform misbehaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Every endpoint behaves; training completes on the second check
    Healthy,
    /// Training never leaves `running`
    Slow,
    /// Training reports `failed`
    FailJob,
    /// The model catalog omits the `unsupervised` family
    NoUnsupervised,
    /// Uploads succeed without returning a dataset id
    NoDatasetId,
}

#[derive(Parser)]
#[command(name = "mock-platform")]
struct Args {
    #[arg(long, value_enum, default_value = "healthy")]
    mode: Mode,

    /// Address to bind; port 0 picks a free one
    #[arg(long, default_value = "127.0.0.1:0")]
    bind: String,
}

const UPLOAD_FILE_NAME: &str = "test_iris.csv";
const MODEL_BYTES: &[u8] = b"mock-logistic-regression-model";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let listener = match tokio::net::TcpListener::bind(&args.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("mock platform failed to bind {}: {}", args.bind, e);
            std::process::exit(1);
        }
    };
    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| args.bind.clone());

    println!("mock platform listening at: {}", addr);
    std::io::stdout().flush().ok();

    let app = router(AppState::new(args.mode));
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("mock platform stopped: {}", e);
        std::process::exit(1);
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/", get(root))
        .route("/api/models/list", get(models_list))
        .route(
            "/api/models/parameters/{model_type}/{model_name}",
            get(model_parameters),
        )
        .route("/api/dataset/upload", post(upload_dataset))
        .route("/api/dataset/{dataset_id}/columns", get(dataset_columns))
        .route("/api/dataset/clean", post(clean_dataset))
        .route("/api/model/train", post(train_model))
        .route("/api/model/progress/{job_id}", get(job_progress))
        .route("/api/model/download/{job_id}", get(download_model))
        .fallback(|| async { not_found() })
        .with_state(state)
}

#[derive(Clone)]
struct AppState {
    mode: Mode,
    inner: Arc<Mutex<MockState>>,
}

impl AppState {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            inner: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct MockState {
    next_id: u32,
    /// Dataset id to whether it has been cleaned
    datasets: HashMap<String, bool>,
    /// Job id to number of progress checks served
    progress_checks: HashMap<String, u32>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[derive(Deserialize)]
struct CleanBody {
    dataset_id: String,
    target_column: String,
}

#[derive(Deserialize)]
struct TrainBody {
    dataset_id: String,
    model_type: String,
    model_category: String,
    model_name: String,
    parameters: Value,
    target_column: String,
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    reply(StatusCode::NOT_FOUND, json!({"detail": "Not Found"}))
}

fn bad_request(detail: impl Into<String>) -> Response {
    reply(StatusCode::BAD_REQUEST, json!({"detail": detail.into()}))
}

async fn root() -> Response {
    reply(StatusCode::OK, json!({"message": "ML Platform API"}))
}

async fn models_list(State(app): State<AppState>) -> Response {
    let mut catalog = json!({
        "supervised": {
            "classification": ["Logistic Regression", "Random Forest"],
            "regression": ["Linear Regression"]
        },
        "unsupervised": {"clustering": ["K-Means"]}
    });
    if app.mode == Mode::NoUnsupervised {
        if let Some(map) = catalog.as_object_mut() {
            map.remove("unsupervised");
        }
    }
    reply(StatusCode::OK, catalog)
}

async fn model_parameters(Path((model_type, _model_name)): Path<(String, String)>) -> Response {
    match model_type.as_str() {
        "supervised" => reply(
            StatusCode::OK,
            json!({"C": {"type": "float", "default": 1.0}, "max_iter": {"type": "int", "default": 100}}),
        ),
        "unsupervised" => reply(
            StatusCode::OK,
            json!({"n_clusters": {"type": "int", "default": 3}}),
        ),
        _ => not_found(),
    }
}

async fn upload_dataset(State(app): State<AppState>, mut multipart: Multipart) -> Response {
    let mut csv = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("malformed multipart body: {}", e)),
        };
        if field.name() != Some("file") {
            continue;
        }
        if field.file_name() != Some(UPLOAD_FILE_NAME) || field.content_type() != Some("text/csv")
        {
            return bad_request(format!("expected {} as text/csv", UPLOAD_FILE_NAME));
        }
        match field.text().await {
            Ok(text) => csv = Some(text),
            Err(e) => return bad_request(format!("unreadable upload: {}", e)),
        }
    }

    let Some(csv) = csv else {
        return bad_request("missing file field");
    };
    let rows = csv.lines().skip(1).filter(|l| !l.trim().is_empty()).count();
    let header_has_target = csv
        .lines()
        .next()
        .is_some_and(|h| h.split(',').any(|c| c.trim() == "species"));
    if !header_has_target || rows == 0 {
        return bad_request("CSV needs a species column and at least one row");
    }

    tracing::info!(rows, "dataset uploaded");
    if app.mode == Mode::NoDatasetId {
        return reply(StatusCode::OK, json!({"rows": rows}));
    }

    let mut state = app.lock();
    let id = state.next_id("ds");
    state.datasets.insert(id.clone(), false);
    reply(StatusCode::OK, json!({"dataset_id": id, "rows": rows}))
}

async fn dataset_columns(
    State(app): State<AppState>,
    Path(dataset_id): Path<String>,
) -> Response {
    if !app.lock().datasets.contains_key(&dataset_id) {
        return not_found();
    }
    reply(
        StatusCode::OK,
        json!({"columns": ["sepal_length", "sepal_width", "petal_length", "petal_width", "species"]}),
    )
}

async fn clean_dataset(State(app): State<AppState>, Json(body): Json<CleanBody>) -> Response {
    if body.target_column != "species" {
        return reply(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"detail": "unknown target column"}),
        );
    }
    match app.lock().datasets.get_mut(&body.dataset_id) {
        Some(cleaned) => {
            *cleaned = true;
            reply(
                StatusCode::OK,
                json!({"status": "cleaned", "dataset_id": body.dataset_id}),
            )
        }
        None => not_found(),
    }
}

async fn train_model(State(app): State<AppState>, Json(body): Json<TrainBody>) -> Response {
    let mut state = app.lock();
    if !state.datasets.contains_key(&body.dataset_id) {
        return not_found();
    }
    if body.target_column != "species" || !body.parameters.is_object() {
        return reply(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"detail": "bad training request"}),
        );
    }

    let job_id = state.next_id("job");
    state.progress_checks.insert(job_id.clone(), 0);
    tracing::info!(
        %job_id,
        model_type = %body.model_type,
        model_category = %body.model_category,
        model_name = %body.model_name,
        "training started"
    );
    reply(StatusCode::OK, json!({"job_id": job_id, "status": "queued"}))
}

async fn job_progress(State(app): State<AppState>, Path(job_id): Path<String>) -> Response {
    let mut state = app.lock();
    match state.progress_checks.get_mut(&job_id) {
        Some(checks) => {
            *checks += 1;
            reply(StatusCode::OK, job_status(app.mode, *checks))
        }
        None => not_found(),
    }
}

async fn download_model(State(app): State<AppState>, Path(job_id): Path<String>) -> Response {
    let completed = app
        .lock()
        .progress_checks
        .get(&job_id)
        .is_some_and(|checks| job_status(app.mode, *checks)["status"] == "completed");
    if !completed {
        return bad_request("model not ready");
    }
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        MODEL_BYTES,
    )
        .into_response()
}

/// Job status after `checks` progress requests
fn job_status(mode: Mode, checks: u32) -> Value {
    match mode {
        Mode::Slow => json!({"status": "running", "progress": 10}),
        Mode::FailJob => {
            json!({"status": "failed", "progress": 0, "message": "training diverged"})
        }
        _ if checks >= 2 => json!({"status": "completed", "progress": 100}),
        _ => json!({"status": "running", "progress": 50}),
    }
}
