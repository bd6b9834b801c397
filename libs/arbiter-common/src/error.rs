use thiserror::Error;
use uuid::Uuid;

/// What could not be found when resolving a submission's references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Test,
    Question,
    Submission,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Test => "test",
            ResourceKind::Question => "question",
            ResourceKind::Submission => "submission",
        };
        f.write_str(name)
    }
}

/// Failure taxonomy for the grading core.
///
/// Validation errors (`UnsupportedLanguage`, `NotFound`) abort before any
/// submission record exists. Sandbox-level errors (`Transport`,
/// `ExecutionTimeout`, `MalformedResponse`) are recovered per case by the
/// evaluator. `Persistence` is fatal and distinct from a graded-but-zero
/// outcome.
#[derive(Error, Debug)]
pub enum GraderError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: Uuid },

    #[error("sandbox transport failure: {0}")]
    Transport(String),

    #[error("sandbox execution timed out")]
    ExecutionTimeout,

    #[error("malformed sandbox response: {0}")]
    MalformedResponse(String),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl GraderError {
    pub fn not_found(kind: ResourceKind, id: Uuid) -> Self {
        GraderError::NotFound { kind, id }
    }

    /// Short classification used as a `CaseResult::status` when a sandbox
    /// call fails and the case is degraded instead of aborting the batch.
    pub fn case_status(&self) -> &'static str {
        match self {
            GraderError::Transport(_) => "Sandbox Unreachable",
            GraderError::ExecutionTimeout => "Sandbox Timeout",
            GraderError::MalformedResponse(_) => "Sandbox Malformed Response",
            _ => "Internal Error",
        }
    }
}

impl From<redis::RedisError> for GraderError {
    fn from(err: redis::RedisError) -> Self {
        GraderError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for GraderError {
    fn from(err: serde_json::Error) -> Self {
        GraderError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_status_classification() {
        assert_eq!(
            GraderError::Transport("connection refused".into()).case_status(),
            "Sandbox Unreachable"
        );
        assert_eq!(
            GraderError::ExecutionTimeout.case_status(),
            "Sandbox Timeout"
        );
    }

    #[test]
    fn test_not_found_display() {
        let id = Uuid::nil();
        let err = GraderError::not_found(ResourceKind::Question, id);
        assert!(err.to_string().contains("question not found"));
    }
}
