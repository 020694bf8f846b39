//! Stage Definition Table: the single source of truth for every mode's
//! stages, required fields, and model instructions. Static; never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dialogue::prompts::*;

/// One independent guided-dialogue feature. Each mode has its own session namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Exploration,
    Decision,
    Communication,
    Company,
    Curriculum,
    Panoramic,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Exploration,
        Mode::Decision,
        Mode::Communication,
        Mode::Company,
        Mode::Curriculum,
        Mode::Panoramic,
    ];

    /// Path segment used by the HTTP surface.
    pub fn key(self) -> &'static str {
        match self {
            Mode::Exploration => "exploration",
            Mode::Decision => "decision",
            Mode::Communication => "communication",
            Mode::Company => "company",
            Mode::Curriculum => "curriculum",
            Mode::Panoramic => "panoramic",
        }
    }

    pub fn definition(self) -> &'static ModeDefinition {
        match self {
            Mode::Exploration => &EXPLORATION,
            Mode::Decision => &DECISION,
            Mode::Communication => &COMMUNICATION,
            Mode::Company => &COMPANY,
            Mode::Curriculum => &CURRICULUM,
            Mode::Panoramic => &PANORAMIC,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| format!("Unknown mode '{s}'"))
    }
}

/// An input the user supplies for a stage.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    /// Substituted when an optional field is left blank.
    #[serde(skip)]
    pub fallback: Option<&'static str>,
    /// Suggested values for selection widgets. Free text is still accepted.
    #[serde(skip_serializing_if = "has_no_options")]
    pub options: &'static [&'static str],
    /// The document upload endpoint fills this field with extracted text.
    pub accepts_document: bool,
}

impl FieldSpec {
    const fn required(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            required: true,
            fallback: None,
            options: &[],
            accepts_document: false,
        }
    }

    const fn optional(key: &'static str, label: &'static str) -> Self {
        Self {
            required: false,
            ..Self::required(key, label)
        }
    }
}

fn has_no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

/// Where a stage gets its parsed item list from: the assistant reply of an earlier stage.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ItemSource {
    pub stage: usize,
    pub heading: &'static str,
}

#[derive(Debug)]
pub struct StageDescriptor {
    /// 1-based.
    pub index: usize,
    pub title: &'static str,
    /// Shown to the user.
    pub prompt: &'static str,
    /// Sent to the model after the persona, joined by blank lines.
    pub instructions: &'static [&'static str],
    pub fields: &'static [FieldSpec],
    /// Advancing returns to this same stage instead of moving on.
    pub repeatable: bool,
    pub items_from: Option<ItemSource>,
    pub supports_debrief: bool,
}

impl StageDescriptor {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn document_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.accepts_document)
    }
}

/// Final integration pass run on the last stage's advance.
#[derive(Debug)]
pub struct SynthesisSpec {
    pub title: &'static str,
    pub instructions: &'static str,
}

#[derive(Debug)]
pub struct ModeDefinition {
    pub mode: Mode,
    pub title: &'static str,
    pub description: &'static str,
    pub stages: &'static [StageDescriptor],
    pub synthesis: Option<SynthesisSpec>,
}

impl ModeDefinition {
    pub fn stage(&self, index: usize) -> Option<&StageDescriptor> {
        index.checked_sub(1).and_then(|i| self.stages.get(i))
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_last(&self, index: usize) -> bool {
        index == self.stages.len()
    }
}

const ANSWER_FIELD: &[FieldSpec] = &[FieldSpec::required("answer", "你的回答")];

const fn single_answer_stage(
    index: usize,
    title: &'static str,
    prompt: &'static str,
    instructions: &'static [&'static str],
) -> StageDescriptor {
    StageDescriptor {
        index,
        title,
        prompt,
        instructions,
        fields: ANSWER_FIELD,
        repeatable: false,
        items_from: None,
        supports_debrief: false,
    }
}

static EXPLORATION: ModeDefinition = ModeDefinition {
    mode: Mode::Exploration,
    title: "职业目标探索",
    description: "通过五个阶段的深度对话，进行自我分析与规划，并生成个人职业探索报告。",
    stages: &[
        single_answer_stage(1, "阶段一：我是谁？", EXPLORATION_STAGE_1, &[EXPLORATION_INSTRUCTIONS]),
        single_answer_stage(2, "阶段二：我拥有什么平台和机会？", EXPLORATION_STAGE_2, &[EXPLORATION_INSTRUCTIONS]),
        single_answer_stage(3, "阶段三：我被什么所影响？", EXPLORATION_STAGE_3, &[EXPLORATION_INSTRUCTIONS]),
        single_answer_stage(4, "阶段四：核心三角关系整合与决策模拟", EXPLORATION_STAGE_4, &[EXPLORATION_INSTRUCTIONS]),
        single_answer_stage(5, "阶段五：总结与行动", EXPLORATION_STAGE_5, &[EXPLORATION_INSTRUCTIONS]),
    ],
    synthesis: Some(SynthesisSpec {
        title: "个人职业探索报告",
        instructions: EXPLORATION_REPORT_INSTRUCTIONS,
    }),
};

static DECISION: ModeDefinition = ModeDefinition {
    mode: Mode::Decision,
    title: "Offer决策分析",
    description: "输入两个Offer与个人偏好，获取结构化的对比分析报告。",
    stages: &[StageDescriptor {
        index: 1,
        title: "填写Offer信息与个人偏好",
        prompt: DECISION_STAGE_1,
        instructions: &[DECISION_INSTRUCTIONS],
        fields: &[
            FieldSpec::required("offer_a", "Offer A 关键信息"),
            FieldSpec::required("offer_b", "Offer B 关键信息"),
            FieldSpec {
                fallback: Some(DECISION_NO_PRIORITIES),
                options: DECISION_PRIORITY_OPTIONS,
                ..FieldSpec::optional("priorities", "职业偏好（按重要性排序）")
            },
        ],
        repeatable: false,
        items_from: None,
        supports_debrief: false,
    }],
    synthesis: None,
};

static COMMUNICATION: ModeDefinition = ModeDefinition {
    mode: Mode::Communication,
    title: "家庭沟通模拟",
    description: "AI扮演你的家人，帮助你练习如何沟通职业选择，并可随时请求沟通技巧提示。",
    stages: &[
        StageDescriptor {
            index: 1,
            title: "设定模拟场景",
            prompt: COMMUNICATION_STAGE_1,
            instructions: &[PARENT_ROLE_INSTRUCTIONS, COMMUNICATION_OPENING_INSTRUCTIONS],
            fields: &[
                FieldSpec::required("choice", "想要沟通的职业选择"),
                FieldSpec::required("concern", "家人可能的担忧"),
            ],
            repeatable: false,
            items_from: None,
            supports_debrief: false,
        },
        StageDescriptor {
            index: 2,
            title: "模拟对话",
            prompt: COMMUNICATION_STAGE_2,
            instructions: &[PARENT_ROLE_INSTRUCTIONS, COMMUNICATION_TURN_INSTRUCTIONS],
            fields: &[FieldSpec::required("reply", "你的回应")],
            repeatable: true,
            items_from: None,
            supports_debrief: true,
        },
    ],
    synthesis: None,
};

static COMPANY: ModeDefinition = ModeDefinition {
    mode: Mode::Company,
    title: "企业信息速览",
    description: "输入公司名称，快速了解公司概况、业务、动态与热招方向。",
    stages: &[StageDescriptor {
        index: 1,
        title: "输入公司名称",
        prompt: COMPANY_STAGE_1,
        instructions: &[COMPANY_INSTRUCTIONS],
        fields: &[FieldSpec::required("company_name", "公司名称")],
        repeatable: false,
        items_from: None,
        supports_debrief: false,
    }],
    synthesis: None,
};

static CURRICULUM: ModeDefinition = ModeDefinition {
    mode: Mode::Curriculum,
    title: "培养方案分析",
    description: "上传培养方案或课程表，梳理核心课程并映射到能力与岗位。",
    stages: &[
        StageDescriptor {
            index: 1,
            title: "课程梳理",
            prompt: CURRICULUM_STAGE_1,
            instructions: &[CURRICULUM_STAGE_1_INSTRUCTIONS],
            fields: &[
                FieldSpec {
                    accepts_document: true,
                    ..FieldSpec::required("curriculum_text", "培养方案/课程内容")
                },
                FieldSpec::optional("target_role", "目标岗位"),
            ],
            repeatable: false,
            items_from: None,
            supports_debrief: false,
        },
        StageDescriptor {
            index: 2,
            title: "课程-能力-岗位映射",
            prompt: CURRICULUM_STAGE_2,
            instructions: &[CURRICULUM_STAGE_2_INSTRUCTIONS],
            fields: &[FieldSpec::required("interests", "感兴趣的职业方向")],
            repeatable: false,
            items_from: Some(ItemSource {
                stage: 1,
                heading: CORE_COURSES_HEADING,
            }),
            supports_debrief: false,
        },
    ],
    synthesis: None,
};

static PANORAMIC: ModeDefinition = ModeDefinition {
    mode: Mode::Panoramic,
    title: "职业全景规划",
    description: "从现状、优势到目标方向，生成一份分阶段的职业全景规划报告。",
    stages: &[
        StageDescriptor {
            index: 1,
            title: "现状盘点",
            prompt: PANORAMIC_STAGE_1,
            instructions: &[PANORAMIC_INSTRUCTIONS],
            fields: &[FieldSpec::required("status", "学业与经历现状")],
            repeatable: false,
            items_from: None,
            supports_debrief: false,
        },
        StageDescriptor {
            index: 2,
            title: "优势与兴趣",
            prompt: PANORAMIC_STAGE_2,
            instructions: &[PANORAMIC_INSTRUCTIONS],
            fields: &[FieldSpec::required("strengths", "优势与兴趣")],
            repeatable: false,
            items_from: None,
            supports_debrief: false,
        },
        StageDescriptor {
            index: 3,
            title: "目标方向",
            prompt: PANORAMIC_STAGE_3,
            instructions: &[PANORAMIC_INSTRUCTIONS],
            fields: &[FieldSpec::required("directions", "考虑中的职业方向")],
            repeatable: false,
            items_from: None,
            supports_debrief: false,
        },
    ],
    synthesis: Some(SynthesisSpec {
        title: "职业全景规划报告",
        instructions: PANORAMIC_REPORT_INSTRUCTIONS,
    }),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_keys_round_trip_through_from_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.key().parse::<Mode>().unwrap(), mode);
            assert_eq!(mode.definition().mode, mode);
        }
        assert!("menu".parse::<Mode>().is_err());
    }

    #[test]
    fn test_stage_indices_are_contiguous_from_one() {
        for mode in Mode::ALL {
            let def = mode.definition();
            assert!(def.stage_count() > 0, "{mode} has no stages");
            for (i, stage) in def.stages.iter().enumerate() {
                assert_eq!(stage.index, i + 1, "{mode} stage {} out of order", i + 1);
                assert!(!stage.fields.is_empty(), "{mode} stage {} has no fields", stage.index);
                assert!(!stage.instructions.is_empty());
            }
        }
    }

    #[test]
    fn test_stage_lookup_is_one_based() {
        let def = Mode::Exploration.definition();
        assert!(def.stage(0).is_none());
        assert_eq!(def.stage(1).unwrap().index, 1);
        assert_eq!(def.stage(5).unwrap().index, 5);
        assert!(def.stage(6).is_none());
        assert!(def.is_last(5));
        assert!(!def.is_last(4));
    }

    #[test]
    fn test_item_sources_point_backwards() {
        for mode in Mode::ALL {
            for stage in mode.definition().stages {
                if let Some(src) = stage.items_from {
                    assert!(src.stage < stage.index, "{mode} stage {} reads forward", stage.index);
                }
            }
        }
    }

    #[test]
    fn test_only_repeatable_stage_is_last_and_unsynthesised() {
        for mode in Mode::ALL {
            let def = mode.definition();
            for stage in def.stages {
                if stage.repeatable {
                    assert!(def.is_last(stage.index));
                    assert!(def.synthesis.is_none());
                }
            }
        }
    }

    #[test]
    fn test_decision_priorities_optional_with_fallback() {
        let stage = Mode::Decision.definition().stage(1).unwrap();
        let priorities = stage.field("priorities").unwrap();
        assert!(!priorities.required);
        assert_eq!(priorities.fallback, Some(DECISION_NO_PRIORITIES));
        assert_eq!(priorities.options.len(), 5);
        assert!(stage.field("offer_a").unwrap().required);
    }

    #[test]
    fn test_curriculum_document_field() {
        let def = Mode::Curriculum.definition();
        assert_eq!(def.stage(1).unwrap().document_field().unwrap().key, "curriculum_text");
        assert!(def.stage(2).unwrap().document_field().is_none());
    }
}
