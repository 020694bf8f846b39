//! Prompt Assembler: the exact request sent to the model for a stage.
//!
//! Ordering contract: persona, then stage instructions, then replayed history,
//! then the newest user input last. Pure functions over borrowed inputs.

use crate::dialogue::message_log::{transcript, Message, Role};
use crate::dialogue::stages::{StageDescriptor, SynthesisSpec};
use crate::llm_client::{ChatTurn, ModelRequest};

/// Everything a stage request is built from.
pub struct PromptParts<'a> {
    pub persona: &'a str,
    pub stage: &'a StageDescriptor,
    pub total_stages: usize,
    /// Items parsed from an earlier stage, if this stage depends on them.
    pub items: &'a [String],
    pub history: &'a [Message],
    pub input: &'a str,
}

pub fn assemble(parts: &PromptParts<'_>) -> ModelRequest {
    let stage = parts.stage;

    let mut instruction = String::new();
    instruction.push_str(parts.persona);
    instruction.push_str("\n\n");
    instruction.push_str(&stage.instructions.join("\n\n"));
    instruction.push_str(&format!(
        "\n\n【当前阶段：第{}阶段（共{}阶段）· {}】\n{}",
        stage.index, parts.total_stages, stage.title, stage.prompt
    ));

    if !parts.items.is_empty() {
        instruction.push_str("\n\n【上一阶段提取的清单】\n");
        instruction.push_str(&numbered(parts.items));
    }

    let mut turns = replay(parts.history);
    turns.push(ChatTurn::user(parts.input));

    ModelRequest { instruction, turns }
}

/// The integration request: the whole log flattened into a single user turn.
pub fn assemble_synthesis(persona: &str, synthesis: &SynthesisSpec, log: &[Message]) -> ModelRequest {
    ModelRequest {
        instruction: format!(
            "{persona}\n\n【{}】\n{}",
            synthesis.title, synthesis.instructions
        ),
        turns: vec![ChatTurn::user(format!(
            "以下是完整的对话记录：\n---\n{}\n---",
            transcript(log)
        ))],
    }
}

/// Out-of-role coaching over the conversation so far.
pub fn assemble_debrief(persona: &str, instructions: &str, log: &[Message]) -> ModelRequest {
    ModelRequest {
        instruction: format!("{persona}\n\n{instructions}"),
        turns: vec![ChatTurn::user(format!("对话记录：\n{}", transcript(log)))],
    }
}

fn replay(history: &[Message]) -> Vec<ChatTurn> {
    history
        .iter()
        .map(|m| match m.role {
            Role::User => ChatTurn::user(m.text.clone()),
            Role::Assistant => ChatTurn::assistant(m.text.clone()),
        })
        .collect()
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::message_log::MessageLog;
    use crate::dialogue::stages::Mode;
    use crate::llm_client::TurnRole;

    const PERSONA: &str = "PERSONA";

    #[test]
    fn test_persona_precedes_instructions_and_stage_prompt() {
        let def = Mode::Exploration.definition();
        let stage = def.stage(2).unwrap();
        let request = assemble(&PromptParts {
            persona: PERSONA,
            stage,
            total_stages: def.stage_count(),
            items: &[],
            history: &[],
            input: "答案",
        });

        let persona_at = request.instruction.find(PERSONA).unwrap();
        let instructions_at = request.instruction.find(stage.instructions[0]).unwrap();
        let prompt_at = request.instruction.find(stage.prompt).unwrap();
        assert_eq!(persona_at, 0);
        assert!(persona_at < instructions_at);
        assert!(instructions_at < prompt_at);
        assert!(request.instruction.contains("第2阶段（共5阶段）"));
    }

    #[test]
    fn test_history_replayed_in_order_then_input_last() {
        let mut log = MessageLog::new();
        log.append(Role::User, 1, "u1");
        log.append(Role::Assistant, 1, "a1");
        let def = Mode::Exploration.definition();

        let request = assemble(&PromptParts {
            persona: PERSONA,
            stage: def.stage(2).unwrap(),
            total_stages: def.stage_count(),
            items: &[],
            history: log.messages(),
            input: "u2",
        });

        let contents: Vec<_> = request.turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["u1", "a1", "u2"]);
        assert_eq!(request.turns[1].role, TurnRole::Assistant);
        assert_eq!(request.turns[2].role, TurnRole::User);
    }

    #[test]
    fn test_items_rendered_as_numbered_list() {
        let def = Mode::Curriculum.definition();
        let items = vec!["数据结构".to_string(), "操作系统".to_string()];
        let request = assemble(&PromptParts {
            persona: PERSONA,
            stage: def.stage(2).unwrap(),
            total_stages: def.stage_count(),
            items: &items,
            history: &[],
            input: "后端开发",
        });
        assert!(request.instruction.contains("1. 数据结构\n2. 操作系统"));
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let def = Mode::Company.definition();
        let parts = PromptParts {
            persona: PERSONA,
            stage: def.stage(1).unwrap(),
            total_stages: 1,
            items: &[],
            history: &[],
            input: "腾讯",
        };
        assert_eq!(assemble(&parts), assemble(&parts));
    }

    #[test]
    fn test_synthesis_flattens_log_into_one_turn() {
        let mut log = MessageLog::new();
        log.append(Role::User, 1, "first");
        log.append(Role::Assistant, 1, "feedback");
        log.append(Role::User, 2, "second");
        let synthesis = Mode::Panoramic.definition().synthesis.as_ref().unwrap();

        let request = assemble_synthesis(PERSONA, synthesis, log.messages());
        assert!(request.instruction.starts_with(PERSONA));
        assert!(request.instruction.ends_with(synthesis.instructions));
        assert!(request.instruction.contains(&format!("【{}】", synthesis.title)));
        assert_eq!(request.turns.len(), 1);
        let body = &request.turns[0].content;
        let first = body.find("first").unwrap();
        let feedback = body.find("feedback").unwrap();
        let second = body.find("second").unwrap();
        assert!(first < feedback && feedback < second);
    }
}
