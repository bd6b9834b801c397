/// Submission Orchestrator - High-Level Grading Lifecycle
///
/// **Responsibility:**
/// Own the full evaluation of one submission: validate, create the durable
/// record, fan test cases out to the Case Evaluator, fold the tally, apply
/// the score policy, finalize the record, return a redacted summary.
///
/// **State machine:**
/// `Running -> Completed` once all cases were evaluated (individual case
/// failures included), or `Running -> Error` when finalizing fails. Both
/// are terminal; only this module ever transitions a submission's status,
/// and only once. Validation failures abort before any record exists.
///
/// This module is the glue layer - it knows nothing about:
/// - How code executes (sandbox client's job)
/// - How a single case is judged (evaluator's job)
/// - How records are serialized (store's job)

use crate::evaluator::evaluate_case;
use crate::languages;
use crate::sandbox::{ExecutionRequest, ExecutionResult, Sandbox};
use crate::score::score;
use crate::store::{ContentStore, SubmissionStore};
use arbiter_common::error::{GraderError, ResourceKind};
use arbiter_common::types::{Submission, SubmissionStatus, SubmissionSummary};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Upper bound on concurrent sandbox calls for one submission, so a large
/// question cannot overwhelm the external service.
pub const DEFAULT_CASE_CONCURRENCY: usize = 4;

pub struct Grader {
    sandbox: Arc<dyn Sandbox>,
    content: Arc<dyn ContentStore>,
    submissions: Arc<dyn SubmissionStore>,
    case_concurrency: usize,
}

impl Grader {
    pub fn new(
        sandbox: Arc<dyn Sandbox>,
        content: Arc<dyn ContentStore>,
        submissions: Arc<dyn SubmissionStore>,
        case_concurrency: usize,
    ) -> Self {
        Grader {
            sandbox,
            content,
            submissions,
            case_concurrency: case_concurrency.max(1),
        }
    }

    /// Grade one submission end to end.
    ///
    /// The returned summary (and the persisted record) carry per-case
    /// results in the question's stored case order, already redacted.
    #[instrument(skip(self, source_code), fields(candidate = %candidate_id))]
    pub async fn submit(
        &self,
        candidate_id: Uuid,
        test_id: Uuid,
        question_id: Uuid,
        language: &str,
        source_code: &str,
    ) -> Result<SubmissionSummary, GraderError> {
        // Validate before anything durable exists. A failure here means no
        // submission record was ever created.
        let (language, language_id) = languages::resolve_key(language)?;

        let test = self
            .content
            .get_test(&test_id)
            .await?
            .ok_or_else(|| GraderError::not_found(ResourceKind::Test, test_id))?;
        let question = self
            .content
            .get_question(&question_id)
            .await?
            .ok_or_else(|| GraderError::not_found(ResourceKind::Question, question_id))?;

        // Snapshot the denominator now: later edits to the question must
        // not change this submission's total.
        let total_cases = question.test_cases.len() as u32;

        let submission = Submission {
            id: Uuid::new_v4(),
            candidate_id,
            test_id,
            question_id,
            language,
            source_code: source_code.to_string(),
            status: SubmissionStatus::Running,
            total_cases,
            passed_cases: 0,
            score: 0,
            results: Vec::new(),
            created_at: Utc::now(),
        };
        self.submissions.create(&submission).await?;

        info!(
            submission_id = %submission.id,
            test_id = %test.id,
            question_id = %question.id,
            language = %language,
            total_cases,
            "Submission created, grading"
        );

        // Fan out with bounded concurrency. `buffered` keeps input order,
        // so results land in the question's case order no matter which
        // sandbox call finishes first, and the tally is summed afterwards
        // instead of racing on a shared counter.
        let concurrency = self.case_concurrency.min(question.test_cases.len().max(1));
        let results: Vec<_> = stream::iter(question.test_cases.iter())
            .map(|case| evaluate_case(self.sandbox.as_ref(), source_code, language_id, case))
            .buffered(concurrency)
            .collect()
            .await;

        let passed_cases = results.iter().filter(|r| r.passed).count() as u32;
        let final_score = score(passed_cases, total_cases);

        if let Err(err) = self
            .submissions
            .finalize(&submission.id, passed_cases, final_score, results.clone())
            .await
        {
            // Evaluation succeeded but the record could not be written.
            // Surface that distinctly; best effort to not leave the record
            // stuck in Running.
            error!(submission_id = %submission.id, error = %err, "Failed to finalize submission");
            if let Err(mark_err) = self.submissions.mark_error(&submission.id).await {
                error!(submission_id = %submission.id, error = %mark_err, "Failed to mark submission as errored");
            }
            return Err(err);
        }

        info!(
            submission_id = %submission.id,
            score = final_score,
            passed_cases,
            total_cases,
            "Submission graded"
        );

        Ok(SubmissionSummary {
            submission_id: submission.id,
            score: final_score,
            passed_cases,
            total_cases,
            results,
        })
    }

    /// Ungraded "Run" mode: one sandbox call with free-form input. No
    /// persistence, no scoring, no hidden-case logic.
    pub async fn run_ad_hoc(
        &self,
        language: &str,
        source_code: &str,
        custom_input: &str,
    ) -> Result<ExecutionResult, GraderError> {
        let (_, language_id) = languages::resolve_key(language)?;

        self.sandbox
            .execute(ExecutionRequest {
                source_code: source_code.to_string(),
                language_id,
                stdin: custom_input.to_string(),
            })
            .await
    }

    /// All submissions of one candidate, newest first.
    pub async fn submissions_by_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<Submission>, GraderError> {
        self.submissions.by_candidate(&candidate_id).await
    }

    /// All submissions against one test, newest first.
    pub async fn submissions_by_test(
        &self,
        test_id: Uuid,
    ) -> Result<Vec<Submission>, GraderError> {
        self.submissions.by_test(&test_id).await
    }
}
