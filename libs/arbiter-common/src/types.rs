use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Sentinel written into `CaseResult::expected_output` for hidden cases.
/// Hidden expected outputs must never reach the party being graded.
pub const HIDDEN_OUTPUT: &str = "HIDDEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Java,
    Python,
    Javascript,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Python => "python",
            Language::Javascript => "javascript",
        };
        f.write_str(name)
    }
}

impl FromStr for Language {
    type Err = crate::error::GraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" => Ok(Language::C),
            "cpp" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "python" => Ok(Language::Python),
            "javascript" => Ok(Language::Javascript),
            other => Err(crate::error::GraderError::UnsupportedLanguage(
                other.to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Easy
    }
}

/// One acceptance test of a question. Order within the question is
/// significant and stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    pub expected_output: String,
    #[serde(default = "default_hidden")]
    pub is_hidden: bool,
}

fn default_hidden() -> bool {
    true
}

/// Immutable question definition. The grader only reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub statement: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<Language>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

fn default_supported_languages() -> Vec<Language> {
    vec![
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::Python,
        Language::Javascript,
    ]
}

/// Assessment container a candidate submits against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Test {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub questions: Vec<Uuid>,
}

fn default_duration() -> u32 {
    60
}

/// Submission lifecycle. `Running` is entered exactly once, at creation;
/// `Completed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Running,
    Completed,
    Error,
}

/// Outcome of one test case, in the question's stored case order.
/// `expected_output` is already redacted for hidden cases; `time` is in
/// seconds and `memory` in kilobytes, both as reported by the sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    pub status: String,
    pub time: Option<f64>,
    pub memory: Option<f64>,
    pub is_hidden: bool,
}

/// Durable record of one grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub test_id: Uuid,
    pub question_id: Uuid,
    pub language: Language,
    pub source_code: String,
    pub status: SubmissionStatus,
    pub total_cases: u32,
    pub passed_cases: u32,
    pub score: u32,
    #[serde(default)]
    pub results: Vec<CaseResult>,
    pub created_at: DateTime<Utc>,
}

/// Client-safe view returned after grading. Results are redacted per case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub submission_id: Uuid,
    pub score: u32,
    pub passed_cases: u32,
    pub total_cases: u32,
    pub results: Vec<CaseResult>,
}

/// Queue payload produced by the (out of scope) API layer and consumed by
/// the grading worker. The language arrives as the caller's raw key and is
/// validated by the registry, never trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeJob {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub test_id: Uuid,
    pub question_id: Uuid,
    pub language: String,
    pub source_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_round_trip() {
        for name in ["c", "cpp", "java", "python", "javascript"] {
            let lang: Language = name.parse().unwrap();
            assert_eq!(lang.to_string(), name);
        }
    }

    #[test]
    fn test_language_rejects_unknown() {
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_test_case_defaults() {
        let tc: TestCase = serde_json::from_str(r#"{"expected_output":"42"}"#).unwrap();
        assert_eq!(tc.input, "");
        assert!(tc.is_hidden);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Running).unwrap(),
            "\"RUNNING\""
        );
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
    }
}
