//! API routes for the study endpoints

use axum::{
    extract::{FromRequest, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stance_core::{Condition, Message, Position, SessionVariables, ThesisId};
use stance_persist::{SaveReceipt, StudyRecord};
use stance_runtime::ExploratoryTurn;

use crate::error::{ApiError, ApiResult, StudyFailure};
use crate::export::{export_filename, render_csv};
use crate::state::AppState;

/// JSON body whose rejections are rendered as error-role messages
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(StudyFailure))]
pub struct StudyJson<T>(pub T);

type StudyResult = Result<Json<Message>, StudyFailure>;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub database: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.store().backend().is_healthy().await;
    Json(HealthResponse {
        status: if db_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        database: if db_healthy { "healthy" } else { "unhealthy" }.to_string(),
    })
}

/// Session start request
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub thesis_id: ThesisId,
    pub initial_position: i64,
    pub initial_statement: String,
    #[serde(default)]
    pub prolific_pid: Option<String>,
}

impl StartRequest {
    fn variables(self) -> Result<SessionVariables, StudyFailure> {
        Ok(
            SessionVariables::new(self.thesis_id, self.initial_position, self.initial_statement)?
                .with_participant(self.prolific_pid),
        )
    }
}

/// Continuation request: the start fields plus the participant-held transcript
#[derive(Debug, Deserialize)]
pub struct ContinueRequest {
    #[serde(flatten)]
    pub session: StartRequest,
    #[serde(default)]
    pub history: Vec<Message>,
}

async fn start(state: &AppState, condition: Condition, request: StartRequest) -> StudyResult {
    let vars = request.variables()?;
    let reply = state.orchestrator().start(condition, &vars).await?;
    Ok(Json(reply))
}

pub async fn group_a_start(
    State(state): State<AppState>,
    StudyJson(request): StudyJson<StartRequest>,
) -> StudyResult {
    start(&state, Condition::NeutralSingleTurn, request).await
}

pub async fn group_b_start(
    State(state): State<AppState>,
    StudyJson(request): StudyJson<StartRequest>,
) -> StudyResult {
    start(&state, Condition::NeutralMultiTurn, request).await
}

pub async fn group_c_start(
    State(state): State<AppState>,
    StudyJson(request): StudyJson<StartRequest>,
) -> StudyResult {
    start(&state, Condition::Persuasive, request).await
}

pub async fn group_b_continue(
    State(state): State<AppState>,
    StudyJson(request): StudyJson<ContinueRequest>,
) -> StudyResult {
    if request.history.is_empty() {
        return Err(StudyFailure::bad_request(
            Condition::NeutralMultiTurn.error_tag(),
            "No history provided",
        ));
    }
    let vars = request.session.variables()?;
    let reply = state
        .orchestrator()
        .continue_session(Condition::NeutralMultiTurn, &vars, &request.history)
        .await?;
    Ok(Json(reply))
}

/// Exploratory turn with caller-supplied credentials
#[derive(Deserialize)]
pub struct TesterRequest {
    /// Catalog thesis; takes precedence over `thesis_text`
    #[serde(default)]
    pub thesis_id: Option<ThesisId>,
    #[serde(default)]
    pub thesis_text: Option<String>,
    pub api_key: String,
    pub model: String,
    #[serde(alias = "position")]
    pub initial_position: i64,
    #[serde(alias = "user_statement")]
    pub initial_statement: String,
    #[serde(default)]
    pub history: Vec<Message>,
}

pub async fn api_tester_chat(
    State(state): State<AppState>,
    StudyJson(request): StudyJson<TesterRequest>,
) -> StudyResult {
    let component = Condition::Exploratory.error_tag();
    if request.api_key.trim().is_empty() {
        return Err(StudyFailure::bad_request(component, "api_key is required"));
    }
    if request.model.trim().is_empty() {
        return Err(StudyFailure::bad_request(component, "model is required"));
    }

    let thesis_text = match (&request.thesis_id, request.thesis_text) {
        (Some(id), _) => state.orchestrator().catalog().lookup(id)?.text.clone(),
        (None, Some(text)) if !text.trim().is_empty() => text,
        _ => {
            return Err(StudyFailure::bad_request(
                component,
                "thesis_id or thesis_text is required",
            ))
        }
    };

    let turn = ExploratoryTurn {
        thesis_text,
        position: Position::new(request.initial_position)?,
        statement: request.initial_statement,
        history: request.history,
        api_key: request.api_key,
        model: request.model,
    };
    let reply = state.explorer().explore(turn).await?;
    Ok(Json(reply))
}

pub async fn submit(
    State(state): State<AppState>,
    Json(record): Json<StudyRecord>,
) -> ApiResult<Json<SaveReceipt>> {
    let receipt = state.store().save(record).await?;
    state.metrics().record_submission();
    Ok(Json(receipt))
}

pub async fn download(State(state): State<AppState>) -> ApiResult<Response> {
    let records = state.store().fetch_all().await?;
    if records.is_empty() {
        return Err(ApiError::NotFound("No study data found".to_string()));
    }

    let body = render_csv(&records)?;
    let disposition = format!(
        "attachment; filename={}",
        export_filename(chrono::Utc::now())
    );
    tracing::info!(records = records.len(), bytes = body.len(), "CSV export generated");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Study statistics response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_responses: u64,
    pub message: String,
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let total_responses = state.store().count().await?;
    Ok(Json(StatsResponse {
        total_responses,
        message: format!("Total study responses: {}", total_responses),
    }))
}

/// Prometheus metrics handler
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics().snapshot().to_prometheus(),
    )
}

/// Build the API router
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Study conditions
        .route("/study/group-a/start", post(group_a_start))
        .route("/study/group-b/start", post(group_b_start))
        .route("/study/group-b/continue", post(group_b_continue))
        .route("/study/group-c/start", post(group_c_start))
        .route("/study/submit", post(submit))
        // Researcher endpoints
        .route("/api-tester/chat", post(api_tester_chat))
        .route("/download", get(download))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_accepts_numeric_id() {
        let request: StartRequest = serde_json::from_value(serde_json::json!({
            "thesis_id": 4,
            "initial_position": 80,
            "initial_statement": "Safety first"
        }))
        .unwrap();
        assert_eq!(request.thesis_id, ThesisId::from("4"));
        assert_eq!(request.prolific_pid, None);
    }

    #[test]
    fn test_tester_request_aliases() {
        let request: TesterRequest = serde_json::from_value(serde_json::json!({
            "thesis_text": "These",
            "api_key": "k",
            "model": "m",
            "position": 10,
            "user_statement": "s",
            "history": []
        }))
        .unwrap();
        assert_eq!(request.initial_position, 10);
        assert_eq!(request.initial_statement, "s");
    }

    #[test]
    fn test_continue_request_rejects_unknown_role() {
        let result = serde_json::from_value::<ContinueRequest>(serde_json::json!({
            "thesis_id": "1",
            "initial_position": 50,
            "initial_statement": "s",
            "history": [{"role": "tool", "content": "x"}]
        }));
        assert!(result.is_err());
    }
}
