//! Question models.

use serde::{Deserialize, Serialize};

/// Subject a question belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// Mathematics.
    Math,
    /// Chemistry.
    Chemistry,
    /// Physics.
    Physics,
    /// Biology.
    Biology,
    /// Computer science.
    #[serde(rename = "computer science")]
    ComputerScience,
}

/// Difficulty rating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Easy.
    Easy,
    /// Medium.
    Medium,
    /// Hard.
    Hard,
}

/// Type-specific question payload, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionData {
    /// Multiple choice.
    Mcq {
        /// Options shown to the student.
        choices: Vec<String>,
        /// Correct option.
        answer: String,
    },
    /// True or false.
    Tf {
        /// Correct value.
        answer: bool,
    },
    /// Numeric answer.
    Numeric {
        /// Correct value.
        answer: f64,
    },
    /// Fill in the blank.
    Fib {
        /// Correct text.
        answer: String,
    },
    /// Short free-text answer.
    ShortAnswer {
        /// Reference answer.
        answer: String,
    },
    /// Match left items to right items.
    Matching {
        /// Left column.
        left: Vec<String>,
        /// Right column.
        right: Vec<String>,
        /// Correct `(left, right)` index pairs.
        answer: Vec<(u32, u32)>,
    },
    /// Put items in order.
    Ordering {
        /// Items to order.
        choices: Vec<String>,
        /// Correct order.
        answer: Vec<String>,
    },
    /// Free response graded against a rubric.
    Fr {
        /// Reference answer.
        answer: String,
        /// Points available.
        points: u32,
        /// Grading rubric.
        rubric: String,
    },
}

impl QuestionData {
    /// Short wire name of the question type.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mcq { .. } => "mcq",
            Self::Tf { .. } => "tf",
            Self::Numeric { .. } => "numeric",
            Self::Fib { .. } => "fib",
            Self::ShortAnswer { .. } => "short_answer",
            Self::Matching { .. } => "matching",
            Self::Ordering { .. } => "ordering",
            Self::Fr { .. } => "fr",
        }
    }
}

/// Question as produced by the generator agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentGeneratedQuestion {
    /// Type-specific payload.
    pub data: QuestionData,
    /// Question text.
    pub text: String,
    /// Subject.
    pub subject: Subject,
    /// Topic within the subject.
    pub topic: String,
    /// Source the question was derived from.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Difficulty rating.
    pub difficulty: Difficulty,
    /// Illustration, if any.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Stored question with the student's progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    /// Question identifier.
    pub id: String,
    /// Generated question.
    pub question: AgentGeneratedQuestion,
    /// Saved answer, if any.
    #[serde(default)]
    pub student_answer: Option<AnswerValue>,
    /// Whether the question has been graded.
    #[serde(default)]
    pub is_completed: bool,
    /// Points available.
    #[serde(default = "default_points")]
    pub points: u32,
    /// Points earned once graded.
    #[serde(default)]
    pub points_earned: Option<u32>,
}

fn default_points() -> u32 {
    1
}

/// Any of the answer shapes the backend accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AnswerValue {
    /// True/false answers.
    Bool(bool),
    /// Numeric answers.
    Number(f64),
    /// Text answers.
    Text(String),
    /// Matching pairs.
    Pairs(Vec<(u32, u32)>),
    /// Ordering answers.
    List(Vec<String>),
}

/// Body of `POST /questions/{id}/save-answer`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentAnswer {
    /// The answer.
    pub answer: AnswerValue,
}

/// Acknowledgement returned by `save-answer`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveAnswerResponse {
    /// Human-readable confirmation.
    pub message: String,
}
