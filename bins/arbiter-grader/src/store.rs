// Collaborator seams for the content store and the submission store.
//
// The orchestrator only sees these traits; production wires the Redis
// implementations below, tests script in-memory fakes.

use arbiter_common::error::{GraderError, ResourceKind};
use arbiter_common::redis as keys;
use arbiter_common::types::{CaseResult, Question, Submission, SubmissionStatus, Test};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use uuid::Uuid;

/// Read-only access to immutable question/test definitions.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_question(&self, id: &Uuid) -> Result<Option<Question>, GraderError>;
    async fn get_test(&self, id: &Uuid) -> Result<Option<Test>, GraderError>;
}

/// Durable store for submission records. `create` is called exactly once
/// per graded submission, `finalize` exactly once afterwards; `mark_error`
/// is the best-effort escape hatch so no record stays `Running`.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn create(&self, submission: &Submission) -> Result<(), GraderError>;
    async fn finalize(
        &self,
        id: &Uuid,
        passed_cases: u32,
        score: u32,
        results: Vec<CaseResult>,
    ) -> Result<(), GraderError>;
    async fn mark_error(&self, id: &Uuid) -> Result<(), GraderError>;
    async fn get(&self, id: &Uuid) -> Result<Option<Submission>, GraderError>;
    async fn by_candidate(&self, candidate_id: &Uuid) -> Result<Vec<Submission>, GraderError>;
    async fn by_test(&self, test_id: &Uuid) -> Result<Vec<Submission>, GraderError>;
}

#[derive(Clone)]
pub struct RedisContentStore {
    conn: ConnectionManager,
}

impl RedisContentStore {
    pub fn new(conn: ConnectionManager) -> Self {
        RedisContentStore { conn }
    }
}

#[async_trait]
impl ContentStore for RedisContentStore {
    async fn get_question(&self, id: &Uuid) -> Result<Option<Question>, GraderError> {
        let mut conn = self.conn.clone();
        Ok(keys::get_question(&mut conn, id).await?)
    }

    async fn get_test(&self, id: &Uuid) -> Result<Option<Test>, GraderError> {
        let mut conn = self.conn.clone();
        Ok(keys::get_test(&mut conn, id).await?)
    }
}

#[derive(Clone)]
pub struct RedisSubmissionStore {
    conn: ConnectionManager,
}

impl RedisSubmissionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        RedisSubmissionStore { conn }
    }

    async fn update_terminal(
        &self,
        id: &Uuid,
        apply: impl FnOnce(&mut Submission),
    ) -> Result<(), GraderError> {
        let mut conn = self.conn.clone();
        let mut submission = keys::get_submission(&mut conn, id)
            .await?
            .ok_or_else(|| GraderError::not_found(ResourceKind::Submission, *id))?;
        apply(&mut submission);
        keys::store_submission(&mut conn, &submission, false).await?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for RedisSubmissionStore {
    async fn create(&self, submission: &Submission) -> Result<(), GraderError> {
        let mut conn = self.conn.clone();
        keys::store_submission(&mut conn, submission, true).await?;
        Ok(())
    }

    async fn finalize(
        &self,
        id: &Uuid,
        passed_cases: u32,
        score: u32,
        results: Vec<CaseResult>,
    ) -> Result<(), GraderError> {
        self.update_terminal(id, |submission| {
            submission.status = SubmissionStatus::Completed;
            submission.passed_cases = passed_cases;
            submission.score = score;
            submission.results = results;
        })
        .await
    }

    async fn mark_error(&self, id: &Uuid) -> Result<(), GraderError> {
        self.update_terminal(id, |submission| {
            submission.status = SubmissionStatus::Error;
        })
        .await
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Submission>, GraderError> {
        let mut conn = self.conn.clone();
        Ok(keys::get_submission(&mut conn, id).await?)
    }

    async fn by_candidate(&self, candidate_id: &Uuid) -> Result<Vec<Submission>, GraderError> {
        let mut conn = self.conn.clone();
        let key = keys::candidate_index_key(candidate_id);
        Ok(keys::get_submissions_by_index(&mut conn, &key).await?)
    }

    async fn by_test(&self, test_id: &Uuid) -> Result<Vec<Submission>, GraderError> {
        let mut conn = self.conn.clone();
        let key = keys::test_index_key(test_id);
        Ok(keys::get_submissions_by_index(&mut conn, &key).await?)
    }
}
