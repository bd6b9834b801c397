/// Case Evaluator - Language-Agnostic Pass/Fail Logic
///
/// **Core Responsibility:**
/// Run one test case through the sandbox and decide whether it passed.
///
/// **Critical Properties:**
/// - Knows nothing about HTTP or the sandbox wire format
/// - Knows nothing about submission records or Redis
/// - A case passes iff normalized stdout equals normalized expected output
///   AND the sandbox status is Accepted. Status dominates: a crashed or
///   timed-out run never passes, even with matching partial stdout.
///
/// Redaction is part of this module's output contract: the `CaseResult` of
/// a hidden case leaves here with its expected output already replaced by
/// the sentinel, so no response path can forget it.

use crate::normalize::normalize;
use crate::sandbox::{ExecutionRequest, Sandbox};
use arbiter_common::types::{CaseResult, TestCase, HIDDEN_OUTPUT};
use tracing::warn;

fn redact(test_case: &TestCase) -> String {
    if test_case.is_hidden {
        HIDDEN_OUTPUT.to_string()
    } else {
        test_case.expected_output.clone()
    }
}

/// Evaluate one test case. Sandbox failures never propagate: they degrade
/// the case to a failed `CaseResult` carrying the error classification, so
/// one broken call cannot erase credit for the rest of the batch.
pub async fn evaluate_case(
    sandbox: &dyn Sandbox,
    source_code: &str,
    language_id: u32,
    test_case: &TestCase,
) -> CaseResult {
    let request = ExecutionRequest {
        source_code: source_code.to_string(),
        language_id,
        stdin: test_case.input.clone(),
    };

    let result = match sandbox.execute(request).await {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "Sandbox call failed; case degraded to failure");
            return CaseResult {
                input: test_case.input.clone(),
                expected_output: redact(test_case),
                actual_output: String::new(),
                passed: false,
                status: err.case_status().to_string(),
                time: None,
                memory: None,
                is_hidden: test_case.is_hidden,
            };
        }
    };

    let actual = normalize(&result.stdout);
    let expected = normalize(&test_case.expected_output);
    let passed = actual == expected && result.is_accepted();

    CaseResult {
        input: test_case.input.clone(),
        expected_output: redact(test_case),
        actual_output: result.stdout,
        passed,
        status: result.status_description,
        time: result.time,
        memory: result.memory,
        is_hidden: test_case.is_hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::testing::{Script, ScriptedFailure, ScriptedSandbox};

    fn make_case(input: &str, expected: &str, hidden: bool) -> TestCase {
        TestCase {
            input: input.to_string(),
            expected_output: expected.to_string(),
            is_hidden: hidden,
        }
    }

    #[tokio::test]
    async fn test_matching_accepted_output_passes() {
        let sandbox = ScriptedSandbox::new(Script::accepted("120\n"));
        let case = make_case("5", "120", false);

        let result = evaluate_case(&sandbox, "print(120)", 71, &case).await;

        assert!(result.passed);
        assert_eq!(result.status, "Accepted");
        // Raw stdout is preserved for display; only the comparison trims.
        assert_eq!(result.actual_output, "120\n");
        assert_eq!(result.expected_output, "120");
    }

    #[tokio::test]
    async fn test_crlf_output_matches() {
        let sandbox = ScriptedSandbox::new(Script::accepted("a\r\nb\r\n"));
        let case = make_case("", "a\nb", false);

        let result = evaluate_case(&sandbox, "src", 50, &case).await;
        assert!(result.passed);
    }

    #[tokio::test]
    async fn test_mismatch_fails() {
        let sandbox = ScriptedSandbox::new(Script::accepted("121"));
        let case = make_case("5", "120", false);

        let result = evaluate_case(&sandbox, "src", 71, &case).await;
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn test_status_dominates_matching_output() {
        let sandbox = ScriptedSandbox::new(Script::rejected(5, "Time Limit Exceeded", "120"));
        let case = make_case("5", "120", false);

        let result = evaluate_case(&sandbox, "src", 71, &case).await;

        assert!(!result.passed);
        assert_eq!(result.status, "Time Limit Exceeded");
    }

    #[tokio::test]
    async fn test_hidden_case_is_redacted() {
        let sandbox = ScriptedSandbox::new(Script::accepted("secret"));
        let case = make_case("in", "secret", true);

        let result = evaluate_case(&sandbox, "src", 62, &case).await;

        assert!(result.passed);
        assert_eq!(result.expected_output, HIDDEN_OUTPUT);
        assert!(result.is_hidden);
        // Actual output and resource usage stay visible for hidden cases.
        assert_eq!(result.actual_output, "secret");
        assert!(result.time.is_some());
    }

    #[tokio::test]
    async fn test_hidden_case_redacted_on_sandbox_failure() {
        let sandbox = ScriptedSandbox::new(Script::failing(ScriptedFailure::Transport));
        let case = make_case("in", "secret", true);

        let result = evaluate_case(&sandbox, "src", 62, &case).await;

        assert!(!result.passed);
        assert_eq!(result.expected_output, HIDDEN_OUTPUT);
        assert_eq!(result.actual_output, "");
        assert_eq!(result.status, "Sandbox Unreachable");
        assert_eq!(result.time, None);
    }

    #[tokio::test]
    async fn test_timeout_classification() {
        let sandbox = ScriptedSandbox::new(Script::failing(ScriptedFailure::Timeout));
        let case = make_case("", "x", false);

        let result = evaluate_case(&sandbox, "src", 71, &case).await;

        assert!(!result.passed);
        assert_eq!(result.status, "Sandbox Timeout");
    }
}
