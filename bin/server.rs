// Trivia - Web Server
// REST API over the question store with Axum

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use trivia::{
    init_logging, setup_database, CategoryCatalog, Config, QuestionDraft, QuizOutcome, SelectionStrategy,
    TriviaError, TriviaService,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    quiz_strategy: SelectionStrategy,
}

impl AppState {
    fn new(conn: Connection, quiz_strategy: SelectionStrategy) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            quiz_strategy,
        }
    }

    /// Run one core operation against the shared connection.
    fn with_service<T>(&self, op: impl FnOnce(&TriviaService) -> trivia::Result<T>) -> Result<T, ApiError> {
        let conn = self.db.lock().map_err(|_| {
            error!("database mutex poisoned");
            ApiError::internal()
        })?;
        let service = TriviaService::new(&conn).with_strategy(self.quiz_strategy);
        op(&service).map_err(ApiError::from)
    }
}

// ============================================================================
// Error envelope
// ============================================================================

/// `{ "success": false, "error": <status>, "message": <text> }`
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    detail: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: Some(detail.into()),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        }
    }

    fn message(&self) -> &'static str {
        match self.status {
            StatusCode::NOT_FOUND => "resource not found",
            StatusCode::UNPROCESSABLE_ENTITY => "unprocessable",
            StatusCode::BAD_REQUEST => "bad request",
            StatusCode::METHOD_NOT_ALLOWED => "method not allowed",
            _ => "an internal server error",
        }
    }
}

impl From<TriviaError> for ApiError {
    fn from(err: TriviaError) -> Self {
        if err.is_server_side() {
            // store details stay in the log
            error!(error = %err, "request failed");
            return ApiError::internal();
        }
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ApiError::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.status.as_u16(),
            "message": self.message(),
        });
        if let Some(detail) = self.detail {
            body["detail"] = json!(detail);
        }
        (self.status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(rename = "searchTerm")]
    search_term: String,
}

#[derive(Deserialize)]
struct QuizCategory {
    id: Value,
}

#[derive(Deserialize)]
struct QuizRequest {
    quiz_category: QuizCategory,
    #[serde(default)]
    previous_questions: Vec<i64>,
}

/// Category ids arrive as numbers or numeric strings depending on the client.
fn category_id(value: &Value) -> Result<i64, ApiError> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, format!("invalid quiz_category id: {}", value)))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "success": true, "version": trivia::VERSION }))
}

/// GET /api/categories
async fn get_categories(State(state): State<AppState>) -> ApiResult {
    let categories = state.with_service(|s| s.categories())?;
    Ok(Json(json!({ "success": true, "categories": categories })))
}

/// GET /api/questions?page=N
async fn get_questions(State(state): State<AppState>, query: Result<Query<PageQuery>, QueryRejection>) -> ApiResult {
    let Query(query) = query?;
    let page = query.page.unwrap_or(1);
    let listing = state.with_service(|s| s.list_questions(page))?;

    Ok(Json(json!({
        "success": true,
        "questions": listing.questions,
        "total_questions": listing.total_questions,
        "page": listing.page,
        "total_pages": listing.total_pages,
        "categories": listing.categories,
        "currentCategory": listing.current_category,
    })))
}

/// POST /api/questions
async fn create_question(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let Json(body) = body?;
    let draft = QuestionDraft::from_json(&body)?;
    let created = state.with_service(|s| s.create_question(&draft, query.page.unwrap_or(1)))?;

    Ok(Json(json!({
        "success": true,
        "created": created.created.id,
        "question": created.questions,
        "total_questions": created.total_questions,
        "current_category": created.current_category,
    })))
}

/// DELETE /api/questions/:id
async fn delete_question(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult {
    let deleted = state.with_service(|s| s.delete_question(id)).map_err(|e| {
        // a missing id cannot be processed rather than "not found"
        if e.status == StatusCode::NOT_FOUND {
            ApiError { status: StatusCode::UNPROCESSABLE_ENTITY, ..e }
        } else {
            e
        }
    })?;
    Ok(Json(json!({ "success": true, "deleted_id": deleted })))
}

/// POST /api/search
async fn search_questions(State(state): State<AppState>, body: Result<Json<SearchRequest>, JsonRejection>) -> ApiResult {
    let Json(request) = body?;
    let results = state.with_service(|s| s.search(&request.search_term))?;

    Ok(Json(json!({
        "success": true,
        "questions": results.questions,
        "total_questions": results.total_questions,
        "current_category": null,
    })))
}

/// GET /api/categories/:id/questions
async fn get_questions_by_category(State(state): State<AppState>, Path(category_id): Path<i64>) -> ApiResult {
    let found = state.with_service(|s| s.questions_by_category(category_id))?;
    if found.questions.is_empty() {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("no questions in category {}", category_id),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "questions": found.questions,
        "total_questions": found.total_questions,
        "current_category": found.current_category,
    })))
}

/// POST /api/quizzes
async fn play_quiz(State(state): State<AppState>, body: Result<Json<QuizRequest>, JsonRejection>) -> ApiResult {
    let Json(request) = body?;
    let category = category_id(&request.quiz_category.id)?;
    let previous: HashSet<i64> = request.previous_questions.into_iter().collect();

    let outcome = state.with_service(|s| s.play_quiz(category, &previous))?;
    let response = match outcome {
        QuizOutcome::Found(question) => json!({ "success": true, "question": question, "exhausted": false }),
        QuizOutcome::Exhausted => json!({ "success": true, "question": null, "exhausted": true }),
    };
    Ok(Json(response))
}

async fn fallback() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        detail: None,
    }
}

/// Path exists but not for this verb
async fn method_not_allowed() -> ApiError {
    ApiError {
        status: StatusCode::METHOD_NOT_ALLOWED,
        detail: None,
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/categories", get(get_categories))
        .route("/categories/:id/questions", get(get_questions_by_category))
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/:id", delete(delete_question))
        .route("/search", post(search_questions))
        .route("/quizzes", post(play_quiz))
        // must follow every .route() call, it only covers routes already added
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .fallback(fallback)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load(None).context("Failed to load configuration")?;
    init_logging(&config);

    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?;
    setup_database(&conn).context("Failed to set up schema")?;

    if CategoryCatalog::new(&conn).list_categories()?.is_empty() {
        warn!("no categories stored; run `trivia init` to add the defaults");
    }
    info!(path = %config.database_path.display(), strategy = ?config.quiz_strategy, "database opened");

    let app = router(AppState::new(conn, config.quiz_strategy));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
