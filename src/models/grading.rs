//! Grading result models.

use serde::{Deserialize, Serialize};

/// Result of `POST /grade/session/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    /// Score as a percentage.
    pub percentage: f64,
    /// Points available across the session.
    pub total_points: u32,
    /// Points earned across the session.
    pub points_earned: u32,
    /// Narrative summary.
    pub summary: String,
    /// Suggested areas of improvement.
    #[serde(default)]
    pub improvements: Vec<String>,
}

/// Result of `POST /grade/question/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoGradeResponse {
    /// Whether the saved answer is correct.
    pub is_correct: bool,
    /// Points earned.
    pub points_earned: u32,
    /// Points available.
    pub max_points: u32,
    /// Explanation of the grade.
    pub explanation: String,
    /// The correct answer, rendered as text.
    pub correct_answer: String,
}
