/// Execution Client - one call to the external untrusted-code sandbox
///
/// **Critical Architectural Boundary:**
/// - The client knows HOW to reach the sandbox (HTTP, wait-for-completion)
/// - The client does NOT know scoring rules
/// - The client does NOT evaluate correctness
/// - The client returns raw outputs for the Evaluator to judge
///
/// One request per call, no caching, no automatic retries: retry policy is
/// a caller concern, and here a single network blip becomes a single failed
/// case with bounded latency.

use arbiter_common::error::GraderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Sandbox status id meaning the run finished successfully ("Accepted").
/// Every other terminal status (compile error, runtime error, time limit)
/// fails the case regardless of output.
pub const ACCEPTED_STATUS_ID: u32 = 3;

/// One execution: source + stdin in. Lives for a single call.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language_id: u32,
    pub stdin: String,
}

/// Terminal result of one execution, as reported by the sandbox.
/// `time` is in seconds, `memory` in kilobytes.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub compile_output: String,
    pub status_id: u32,
    pub status_description: String,
    pub time: Option<f64>,
    pub memory: Option<f64>,
}

impl ExecutionResult {
    pub fn is_accepted(&self) -> bool {
        self.status_id == ACCEPTED_STATUS_ID
    }
}

/// Request/response seam to the external execution service. Production uses
/// [`Judge0Client`]; tests script this trait directly.
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, GraderError>;
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    source_code: &'a str,
    language_id: u32,
    stdin: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    id: u32,
    description: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    stdout: Option<String>,
    stderr: Option<String>,
    compile_output: Option<String>,
    status: Option<WireStatus>,
    // The sandbox reports wall time as a decimal string of seconds.
    time: Option<String>,
    memory: Option<f64>,
}

impl WireResponse {
    fn into_result(self) -> Result<ExecutionResult, GraderError> {
        let status = self.status.ok_or_else(|| {
            GraderError::MalformedResponse("response carries no status".to_string())
        })?;

        Ok(ExecutionResult {
            stdout: self.stdout.unwrap_or_default(),
            stderr: self.stderr.unwrap_or_default(),
            compile_output: self.compile_output.unwrap_or_default(),
            status_id: status.id,
            status_description: status.description,
            time: self.time.and_then(|t| t.parse().ok()),
            memory: self.memory,
        })
    }
}

/// HTTP client for a Judge0-compatible execution service, using its
/// synchronous wait-for-completion mode.
#[derive(Debug, Clone)]
pub struct Judge0Client {
    http: Client,
    base_url: String,
}

impl Judge0Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GraderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GraderError::Transport(e.to_string()))?;

        Ok(Judge0Client {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn submissions_url(&self) -> String {
        format!(
            "{}/submissions?base64_encoded=false&wait=true\
             &fields=stdout,stderr,compile_output,message,status,time,memory",
            self.base_url
        )
    }
}

#[async_trait]
impl Sandbox for Judge0Client {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, GraderError> {
        let body = WireRequest {
            source_code: &request.source_code,
            language_id: request.language_id,
            stdin: &request.stdin,
        };

        let response = self
            .http
            .post(self.submissions_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GraderError::ExecutionTimeout
                } else {
                    GraderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GraderError::Transport(format!(
                "sandbox returned HTTP {}",
                status
            )));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| GraderError::MalformedResponse(e.to_string()))?;

        let result = wire.into_result()?;
        debug!(
            status_id = result.status_id,
            status = %result.status_description,
            time = ?result.time,
            memory = ?result.memory,
            "Sandbox execution finished"
        );

        Ok(result)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_response_parses_time_string() {
        let wire: WireResponse = serde_json::from_str(
            r#"{
                "stdout": "42\n",
                "stderr": null,
                "compile_output": null,
                "status": {"id": 3, "description": "Accepted"},
                "time": "0.012",
                "memory": 3456
            }"#,
        )
        .unwrap();

        let result = wire.into_result().unwrap();
        assert_eq!(result.stdout, "42\n");
        assert_eq!(result.stderr, "");
        assert!(result.is_accepted());
        assert_eq!(result.time, Some(0.012));
        assert_eq!(result.memory, Some(3456.0));
    }

    #[test]
    fn test_wire_response_without_status_is_malformed() {
        let wire: WireResponse =
            serde_json::from_str(r#"{"stdout": "x", "time": null, "memory": null}"#).unwrap();
        let err = wire.into_result().unwrap_err();
        assert!(matches!(err, GraderError::MalformedResponse(_)));
    }

    #[test]
    fn test_non_accepted_status() {
        let wire: WireResponse = serde_json::from_str(
            r#"{
                "stdout": null,
                "stderr": null,
                "compile_output": "main.c:1: error: expected ';'",
                "status": {"id": 6, "description": "Compilation Error"},
                "time": null,
                "memory": null
            }"#,
        )
        .unwrap();

        let result = wire.into_result().unwrap();
        assert!(!result.is_accepted());
        assert_eq!(result.status_description, "Compilation Error");
        assert_eq!(result.time, None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            Judge0Client::new("http://judge.local/", Duration::from_secs(30)).unwrap();
        assert!(client
            .submissions_url()
            .starts_with("http://judge.local/submissions?"));
    }
}
