//! Participant input, forwarded by the bot bridge.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use quizroom_core::model::Participant;
use quizroom_engine::{Keyboard, ParticipantInput, Prompt, RecordAnswer, RegisterParticipant};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Chat identity assigned by the bot bridge.
    pub participant_id: String,
    pub name: String,
}

/// Request body for POST /{participant_id}/text.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Request body for POST /{participant_id}/selection.
#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    /// Callback data of the pressed button.
    pub payload: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub participant: Participant,
    /// Prompts for the step the event is currently on.
    pub prompts: Vec<Prompt>,
}

/// Reply to a text or selection, relayed to the participant by the bot.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub accepted: bool,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompts: Vec<Prompt>,
}

/// POST /
#[instrument(skip(state, request), fields(participant_id = %request.participant_id))]
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let command = RegisterParticipant {
        correlation_id: Uuid::new_v4(),
        participant_id: request.participant_id,
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling register_participant command");

    let (participant, prompts) = state.engine.register_participant(&command).await?;

    Ok(Json(RegisterResponse {
        participant,
        prompts,
    }))
}

async fn record(
    state: &AppState,
    participant_id: String,
    input: ParticipantInput,
) -> Result<Json<AnswerResponse>, ApiError> {
    let command = RecordAnswer {
        correlation_id: Uuid::new_v4(),
        participant_id,
        input,
    };

    info!(correlation_id = %command.correlation_id, "handling record_answer command");

    let outcome = state.engine.record_answer(&command).await?;

    Ok(Json(AnswerResponse {
        accepted: outcome.accepted,
        reply: outcome.reply,
        keyboard: outcome.keyboard,
    }))
}

/// POST /{participant_id}/text
#[instrument(skip(state, request))]
async fn submit_text(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
    Json(request): Json<TextRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    record(&state, participant_id, ParticipantInput::Text(request.text)).await
}

/// POST /{participant_id}/selection
#[instrument(skip(state, request), fields(payload = %request.payload))]
async fn submit_selection(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    record(
        &state,
        participant_id,
        ParticipantInput::Selection {
            payload: request.payload,
        },
    )
    .await
}

/// GET /{participant_id}/prompt
#[instrument(skip(state))]
async fn current_prompt(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> Result<Json<PromptResponse>, ApiError> {
    let prompts = state.engine.current_prompt(&participant_id).await?;
    Ok(Json(PromptResponse { prompts }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/{participant_id}/text", post(submit_text))
        .route("/{participant_id}/selection", post(submit_selection))
        .route("/{participant_id}/prompt", get(current_prompt))
}
