//! Stage Controller: drives one session through its mode's stages.
//!
//! `submit` validates and logs the user's fields (Collecting → Generating),
//! `advance` performs the model call and logs the reply (Generating → next).
//! Both hold the session mutex for their whole duration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dialogue::assembler::{assemble, assemble_debrief, assemble_synthesis, PromptParts};
use crate::dialogue::message_log::{Message, MessageLog, Role};
use crate::dialogue::prompts::DEBRIEF_INSTRUCTIONS;
use crate::dialogue::session::{Session, SessionStore, StageState};
use crate::dialogue::stages::{FieldSpec, Mode, ModeDefinition, StageDescriptor};
use crate::errors::AppError;
use crate::extraction::{extract_items, ExtractionError};
use crate::llm_client::prompts::GLOBAL_PERSONA;
use crate::llm_client::{LlmError, ModelClient, ModelReply, ModelRequest};

/// Free text that ends the session instead of being treated as stage input.
const EXIT_COMMANDS: &[&str] = &["quit", "exit", "退出", "结束", "返回菜单"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Input logged; the stage now awaits `advance`.
    Accepted { stage: usize },
    /// Exit intent: the session was discarded.
    Exited,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageView {
    pub index: usize,
    pub title: &'static str,
    pub prompt: &'static str,
    pub fields: &'static [FieldSpec],
    pub repeatable: bool,
    pub supports_debrief: bool,
}

impl From<&'static StageDescriptor> for StageView {
    fn from(stage: &'static StageDescriptor) -> Self {
        Self {
            index: stage.index,
            title: stage.title,
            prompt: stage.prompt,
            fields: stage.fields,
            repeatable: stage.repeatable,
            supports_debrief: stage.supports_debrief,
        }
    }
}

/// Everything a front end needs to re-render a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub mode: Mode,
    pub mode_title: &'static str,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub state: StageState,
    pub total_stages: usize,
    pub complete: bool,
    /// `None` once the session is complete.
    pub stage: Option<StageView>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeSummary {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub stage_count: usize,
    pub has_report: bool,
}

pub fn list_modes() -> Vec<ModeSummary> {
    Mode::ALL
        .into_iter()
        .map(|mode| {
            let def = mode.definition();
            ModeSummary {
                key: mode.key(),
                title: def.title,
                description: def.description,
                stage_count: def.stage_count(),
                has_report: def.synthesis.is_some(),
            }
        })
        .collect()
}

pub struct StageController {
    store: Arc<SessionStore>,
    model: Arc<dyn ModelClient>,
    timeout: Duration,
}

impl StageController {
    pub fn new(store: Arc<SessionStore>, model: Arc<dyn ModelClient>, timeout: Duration) -> Self {
        Self {
            store,
            model,
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Mints a fresh session id for `mode`.
    pub async fn create_session(&self, mode: Mode) -> SessionView {
        let id = Uuid::new_v4().to_string();
        let handle = self.store.get_or_create(mode, &id).await;
        let session = handle.lock().await;
        info!(%mode, session = %id, "Session started");
        view_of(&session)
    }

    /// Pure read; creates the session on first access.
    pub async fn current_view(&self, mode: Mode, id: &str) -> SessionView {
        let handle = self.store.get_or_create(mode, id).await;
        let session = handle.lock().await;
        view_of(&session)
    }

    /// "Return to menu": discards the session. Returns whether one existed.
    pub async fn reset(&self, mode: Mode, id: &str) -> bool {
        let existed = self.store.reset(mode, id).await;
        if existed {
            info!(%mode, session = id, "Session reset");
        }
        existed
    }

    pub async fn submit(
        &self,
        mode: Mode,
        id: &str,
        fields: &HashMap<String, String>,
    ) -> Result<SubmitOutcome, AppError> {
        if fields.values().any(|v| is_exit_command(v)) {
            // Wait out any in-flight advance before tearing the session down.
            if let Some(handle) = self.store.get(mode, id).await {
                let _session = handle.lock().await;
                self.store.reset(mode, id).await;
            }
            info!(%mode, session = id, "Exit requested, session discarded");
            return Ok(SubmitOutcome::Exited);
        }

        let handle = self.store.get_or_create(mode, id).await;
        let mut session = handle.lock().await;

        let stage_index = match session.state() {
            StageState::Collecting { stage } => stage,
            StageState::Generating { stage, .. } => {
                return Err(AppError::Conflict(format!(
                    "Stage {stage} is awaiting advance"
                )))
            }
            StageState::Complete => {
                return Err(AppError::Conflict("Session is already complete".to_string()))
            }
        };

        let def = mode.definition();
        let stage = stage_of(def, stage_index)?;

        let mut unknown: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|key| stage.field(key).is_none())
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(AppError::Validation(format!(
                "Unknown fields for stage {stage_index}: {}",
                unknown.join(", ")
            )));
        }

        let missing: Vec<String> = stage
            .fields
            .iter()
            .filter(|f| f.required && present(fields, f.key).is_none())
            .map(|f| f.key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingFields {
                stage: stage_index,
                fields: missing,
            });
        }

        // Dependent stages are blocked until the source list parses.
        stage_items(session.log(), stage)?;

        let text = compose(stage, fields);
        let input = session.log_mut().append(Role::User, stage_index, text);
        session.transition(StageState::Generating {
            stage: stage_index,
            input,
        });
        info!(%mode, session = id, stage = stage_index, "Stage input accepted");

        Ok(SubmitOutcome::Accepted { stage: stage_index })
    }

    /// Runs the model for the pending stage and returns the appended assistant message.
    /// On failure the session is left exactly as it was, so a retry is safe.
    pub async fn advance(&self, mode: Mode, id: &str) -> Result<Message, AppError> {
        self.advance_with_view(mode, id).await.map(|(message, _)| message)
    }

    /// `advance`, plus the view taken under the same lock.
    pub async fn advance_with_view(
        &self,
        mode: Mode,
        id: &str,
    ) -> Result<(Message, SessionView), AppError> {
        let handle = self
            .store
            .get(mode, id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        let mut session = handle.lock().await;

        let (stage_index, input) = match session.state() {
            StageState::Generating { stage, input } => (stage, input),
            StageState::Collecting { stage } => {
                return Err(AppError::Conflict(format!(
                    "Stage {stage} has no submitted input to advance"
                )))
            }
            StageState::Complete => {
                return Err(AppError::Conflict("Session is already complete".to_string()))
            }
        };

        let def = mode.definition();
        let stage = stage_of(def, stage_index)?;
        let is_last = def.is_last(stage_index);

        let request = match def.synthesis.as_ref() {
            Some(synthesis) if is_last && !stage.repeatable => {
                assemble_synthesis(GLOBAL_PERSONA, synthesis, session.log().messages())
            }
            _ => {
                let items = stage_items(session.log(), stage)?;
                let pending = session.log().get(input).ok_or_else(|| {
                    AppError::Internal(anyhow!("pending input {input} missing from log"))
                })?;
                assemble(&PromptParts {
                    persona: GLOBAL_PERSONA,
                    stage,
                    total_stages: def.stage_count(),
                    items: &items,
                    history: session.log().before(input),
                    input: &pending.text,
                })
            }
        };

        let reply = self.generate(&request).await.map_err(|e| {
            warn!(%mode, session = id, stage = stage_index, "Model call failed: {e}");
            AppError::Upstream(e)
        })?;
        log_usage(mode, id, stage_index, &reply);

        let ordinal = session
            .log_mut()
            .append(Role::Assistant, stage_index, reply.text);

        let next = if stage.repeatable {
            StageState::Collecting { stage: stage_index }
        } else if is_last {
            StageState::Complete
        } else {
            StageState::Collecting {
                stage: stage_index + 1,
            }
        };
        session.transition(next);
        info!(%mode, session = id, stage = stage_index, "Stage advanced");

        let message = session
            .log()
            .get(ordinal)
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow!("appended message {ordinal} missing")))?;
        Ok((message, view_of(&session)))
    }

    /// Out-of-role coaching over the conversation so far. Never mutates the session.
    pub async fn debrief(&self, mode: Mode, id: &str) -> Result<String, AppError> {
        let handle = self
            .store
            .get(mode, id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        let session = handle.lock().await;

        let supported = match session.state() {
            StageState::Collecting { stage } => mode
                .definition()
                .stage(stage)
                .is_some_and(|s| s.supports_debrief),
            _ => false,
        };
        if !supported {
            return Err(AppError::Conflict(
                "Tips are only available during the role-play stage".to_string(),
            ));
        }
        if session.log().is_empty() {
            return Err(AppError::Conflict("Nothing to review yet".to_string()));
        }

        let request = assemble_debrief(GLOBAL_PERSONA, DEBRIEF_INSTRUCTIONS, session.log().messages());
        let reply = self.generate(&request).await?;
        if let StageState::Collecting { stage } = session.state() {
            log_usage(mode, id, stage, &reply);
        }
        Ok(reply.text)
    }

    /// The field an uploaded document fills at the session's current stage.
    pub async fn document_field(&self, mode: Mode, id: &str) -> Result<&'static FieldSpec, AppError> {
        let handle = self.store.get_or_create(mode, id).await;
        let session = handle.lock().await;
        let stage = match session.state() {
            StageState::Collecting { stage } => stage_of(mode.definition(), stage)?,
            _ => {
                return Err(AppError::Conflict(
                    "Session is not accepting input".to_string(),
                ))
            }
        };
        stage.document_field().ok_or_else(|| {
            AppError::Conflict(format!("Stage {} does not accept documents", stage.index))
        })
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, LlmError> {
        match tokio::time::timeout(self.timeout, self.model.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

fn log_usage(mode: Mode, id: &str, stage: usize, reply: &ModelReply) {
    if let Some(usage) = &reply.usage {
        info!(
            %mode,
            session = id,
            stage,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Model usage"
        );
    }
}

fn view_of(session: &Session) -> SessionView {
    let def = session.mode().definition();
    let state = session.state();
    SessionView {
        mode: session.mode(),
        mode_title: def.title,
        session_id: session.id().to_string(),
        created_at: session.created_at(),
        state,
        total_stages: def.stage_count(),
        complete: state == StageState::Complete,
        stage: state.stage().and_then(|i| def.stage(i)).map(StageView::from),
        messages: session.log().messages().to_vec(),
    }
}

fn stage_of(def: &'static ModeDefinition, index: usize) -> Result<&'static StageDescriptor, AppError> {
    def.stage(index).ok_or_else(|| {
        AppError::Internal(anyhow!("{} has no stage {index}", def.mode))
    })
}

fn is_exit_command(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    EXIT_COMMANDS.contains(&value.as_str())
}

/// Trimmed, non-empty value for `key`.
fn present<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Items parsed from the source stage's reply, or empty when the stage has no source.
fn stage_items(log: &MessageLog, stage: &StageDescriptor) -> Result<Vec<String>, ExtractionError> {
    let Some(source) = stage.items_from else {
        return Ok(Vec::new());
    };
    let reply = log
        .last_for_stage(Role::Assistant, source.stage)
        .ok_or_else(|| ExtractionError::NoItems {
            heading: source.heading.to_string(),
        })?;
    extract_items(&reply.text, source.heading)
}

/// User message text: the raw value for single-field stages, labelled lines otherwise.
fn compose(stage: &StageDescriptor, fields: &HashMap<String, String>) -> String {
    if let [only] = stage.fields {
        return present(fields, only.key).unwrap_or_default().to_string();
    }

    stage
        .fields
        .iter()
        .filter_map(|f| {
            present(fields, f.key)
                .or(f.fallback)
                .map(|value| format!("{}：{value}", f.label))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
