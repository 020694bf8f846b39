use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dialogue::controller::{list_modes, ModeSummary, SessionView, SubmitOutcome};
use crate::dialogue::message_log::Message;
use crate::dialogue::session::validate_session_id;
use crate::dialogue::stages::Mode;
use crate::errors::AppError;
use crate::state::AppState;

/// Multipart part carrying the uploaded document. Every other part is a text field.
const FILE_PART: &str = "file";

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
    /// Absent after an exit, since the session no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
}

#[derive(Serialize)]
pub struct AdvanceResponse {
    pub message: Message,
    pub session: SessionView,
}

#[derive(Serialize)]
pub struct DebriefResponse {
    pub tips: String,
}

fn parse_mode(raw: &str) -> Result<Mode, AppError> {
    raw.parse::<Mode>().map_err(AppError::NotFound)
}

fn session_key(mode: &str, id: &str) -> Result<Mode, AppError> {
    let mode = parse_mode(mode)?;
    validate_session_id(id)?;
    Ok(mode)
}

/// GET /api/v1/modes
pub async fn handle_list_modes() -> Json<Vec<ModeSummary>> {
    Json(list_modes())
}

/// POST /api/v1/modes/:mode/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let mode = parse_mode(&mode)?;
    let view = state.controller.create_session(mode).await;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/modes/:mode/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path((mode, id)): Path<(String, String)>,
) -> Result<Json<SessionView>, AppError> {
    let mode = session_key(&mode, &id)?;
    Ok(Json(state.controller.current_view(mode, &id).await))
}

/// DELETE /api/v1/modes/:mode/sessions/:id
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path((mode, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let mode = session_key(&mode, &id)?;
    state.controller.reset(mode, &id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/modes/:mode/sessions/:id/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Path((mode, id)): Path<(String, String)>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let mode = session_key(&mode, &id)?;
    submit_and_view(&state, mode, &id, &req.fields).await.map(Json)
}

/// POST /api/v1/modes/:mode/sessions/:id/advance
pub async fn handle_advance(
    State(state): State<AppState>,
    Path((mode, id)): Path<(String, String)>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let mode = session_key(&mode, &id)?;
    let (message, session) = state.controller.advance_with_view(mode, &id).await?;
    Ok(Json(AdvanceResponse { message, session }))
}

/// POST /api/v1/modes/:mode/sessions/:id/debrief
pub async fn handle_debrief(
    State(state): State<AppState>,
    Path((mode, id)): Path<(String, String)>,
) -> Result<Json<DebriefResponse>, AppError> {
    let mode = session_key(&mode, &id)?;
    let tips = state.controller.debrief(mode, &id).await?;
    Ok(Json(DebriefResponse { tips }))
}

/// POST /api/v1/modes/:mode/sessions/:id/document
///
/// The `file` part is converted to text and submitted as the stage's document
/// field; any other parts are submitted alongside it as plain fields.
pub async fn handle_document(
    State(state): State<AppState>,
    Path((mode, id)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let mode = session_key(&mode, &id)?;
    let target = state.controller.document_field(mode, &id).await?;

    let mut upload: Option<(Bytes, Option<String>)> = None;
    let mut fields = HashMap::new();
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let name = part.name().unwrap_or_default().to_string();
        if name == FILE_PART {
            let filename = part.file_name().map(str::to_string);
            let bytes = part
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;
            upload = Some((bytes, filename));
        } else {
            let value = part
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;
            fields.insert(name, value);
        }
    }

    let (bytes, filename) =
        upload.ok_or_else(|| AppError::Validation(format!("Missing '{FILE_PART}' part")))?;
    let text = state.documents.extract(&bytes, filename.as_deref()).await?;
    info!(%mode, session = %id, chars = text.chars().count(), "Document converted to text");

    fields.insert(target.key.to_string(), text);
    submit_and_view(&state, mode, &id, &fields).await.map(Json)
}

async fn submit_and_view(
    state: &AppState,
    mode: Mode,
    id: &str,
    fields: &HashMap<String, String>,
) -> Result<SubmitResponse, AppError> {
    let outcome = state.controller.submit(mode, id, fields).await?;
    let session = match outcome {
        SubmitOutcome::Accepted { .. } => Some(state.controller.current_view(mode, id).await),
        SubmitOutcome::Exited => None,
    };
    Ok(SubmitResponse { outcome, session })
}
