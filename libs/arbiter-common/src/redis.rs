use crate::types::{GradeJob, Question, Submission, Test};
use ::redis::{AsyncCommands, RedisResult};
use uuid::Uuid;

/// Redis key semantics - defines only semantics, not runtime logic.
/// Keeps the (out of scope) API layer and the grading worker from drifting
/// and makes every key deterministic.

pub const QUEUE_KEY: &str = "arbiter:queue:grading";
pub const SUBMISSION_PREFIX: &str = "arbiter:submission";
pub const QUESTION_PREFIX: &str = "arbiter:question";
pub const TEST_PREFIX: &str = "arbiter:test";
pub const CANDIDATE_INDEX_PREFIX: &str = "arbiter:candidate-subs";
pub const TEST_INDEX_PREFIX: &str = "arbiter:test-subs";

pub fn submission_key(id: &Uuid) -> String {
    format!("{}:{}", SUBMISSION_PREFIX, id)
}

pub fn question_key(id: &Uuid) -> String {
    format!("{}:{}", QUESTION_PREFIX, id)
}

pub fn test_key(id: &Uuid) -> String {
    format!("{}:{}", TEST_PREFIX, id)
}

pub fn candidate_index_key(candidate_id: &Uuid) -> String {
    format!("{}:{}", CANDIDATE_INDEX_PREFIX, candidate_id)
}

pub fn test_index_key(test_id: &Uuid) -> String {
    format!("{}:{}", TEST_INDEX_PREFIX, test_id)
}

fn to_json<T: serde::Serialize>(value: &T) -> RedisResult<String> {
    serde_json::to_string(value).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "serialization error",
            e.to_string(),
        ))
    })
}

fn from_json<T: serde::de::DeserializeOwned>(payload: &str) -> RedisResult<T> {
    serde_json::from_str(payload).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "deserialization error",
            e.to_string(),
        ))
    })
}

/// Push a grading job onto the queue. RPUSH for FIFO semantics.
pub async fn push_job(
    conn: &mut redis::aio::ConnectionManager,
    job: &GradeJob,
) -> RedisResult<()> {
    let payload = to_json(job)?;
    conn.rpush(QUEUE_KEY, payload).await
}

/// Pop a grading job. BLPOP with timeout so shutdown stays responsive.
pub async fn pop_job(
    conn: &mut redis::aio::ConnectionManager,
    timeout_seconds: f64,
) -> RedisResult<Option<GradeJob>> {
    let result: Option<(String, String)> = conn.blpop(QUEUE_KEY, timeout_seconds).await?;

    match result {
        Some((_key, payload)) => Ok(Some(from_json(&payload)?)),
        None => Ok(None),
    }
}

/// Store a submission record and index it under its candidate and test so
/// listings stay O(1) lookups. Newest submissions land at the head of each
/// index (LPUSH).
pub async fn store_submission(
    conn: &mut redis::aio::ConnectionManager,
    submission: &Submission,
    index: bool,
) -> RedisResult<()> {
    let payload = to_json(submission)?;
    let _: () = conn.set(submission_key(&submission.id), payload).await?;

    if index {
        let id = submission.id.to_string();
        let _: () = conn
            .lpush(candidate_index_key(&submission.candidate_id), &id)
            .await?;
        let _: () = conn.lpush(test_index_key(&submission.test_id), &id).await?;
    }

    Ok(())
}

pub async fn get_submission(
    conn: &mut redis::aio::ConnectionManager,
    id: &Uuid,
) -> RedisResult<Option<Submission>> {
    let payload: Option<String> = conn.get(submission_key(id)).await?;
    match payload {
        Some(data) => Ok(Some(from_json(&data)?)),
        None => Ok(None),
    }
}

/// Resolve a list of submission ids (one index) into full records.
/// Ids whose records have expired are skipped rather than failing the list.
pub async fn get_submissions_by_index(
    conn: &mut redis::aio::ConnectionManager,
    index_key: &str,
) -> RedisResult<Vec<Submission>> {
    let ids: Vec<String> = conn.lrange(index_key, 0, -1).await?;
    let mut submissions = Vec::with_capacity(ids.len());
    for id in ids {
        let payload: Option<String> = conn.get(format!("{}:{}", SUBMISSION_PREFIX, id)).await?;
        if let Some(data) = payload {
            submissions.push(from_json(&data)?);
        }
    }
    Ok(submissions)
}

pub async fn store_question(
    conn: &mut redis::aio::ConnectionManager,
    question: &Question,
) -> RedisResult<()> {
    let payload = to_json(question)?;
    conn.set(question_key(&question.id), payload).await
}

pub async fn get_question(
    conn: &mut redis::aio::ConnectionManager,
    id: &Uuid,
) -> RedisResult<Option<Question>> {
    let payload: Option<String> = conn.get(question_key(id)).await?;
    match payload {
        Some(data) => Ok(Some(from_json(&data)?)),
        None => Ok(None),
    }
}

pub async fn store_test(
    conn: &mut redis::aio::ConnectionManager,
    test: &Test,
) -> RedisResult<()> {
    let payload = to_json(test)?;
    conn.set(test_key(&test.id), payload).await
}

pub async fn get_test(
    conn: &mut redis::aio::ConnectionManager,
    id: &Uuid,
) -> RedisResult<Option<Test>> {
    let payload: Option<String> = conn.get(test_key(id)).await?;
    match payload {
        Some(data) => Ok(Some(from_json(&data)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_key_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(submission_key(&id), submission_key(&id));
        assert!(submission_key(&id).starts_with("arbiter:submission:"));
    }

    #[test]
    fn test_index_keys_contain_owner() {
        let id = Uuid::new_v4();
        assert!(candidate_index_key(&id).contains(&id.to_string()));
        assert!(test_index_key(&id).contains(&id.to_string()));
        assert_ne!(candidate_index_key(&id), test_index_key(&id));
    }

    #[test]
    fn test_content_keys_distinct() {
        let id = Uuid::new_v4();
        assert_ne!(question_key(&id), test_key(&id));
    }
}
