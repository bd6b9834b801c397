mod config;
mod evaluator;
mod languages;
mod normalize;
mod orchestrator;
mod sandbox;
mod score;
mod store;

use arbiter_common::redis;
use config::GraderConfig;
use orchestrator::Grader;
use sandbox::Judge0Client;
use std::sync::Arc;
use store::{RedisContentStore, RedisSubmissionStore};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    info!("Arbiter grader booting...");

    let config = GraderConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!("Sandbox: {}", config.sandbox_base_url);
    info!(
        "Per-case timeout: {}ms, case concurrency: {}",
        config.sandbox_timeout.as_millis(),
        config.case_concurrency
    );

    // Connect to Redis
    let client = ::redis::Client::open(config.redis_url.as_str())?;
    let redis_conn = ::redis::aio::ConnectionManager::new(client).await?;

    info!("Connected to Redis: {}", config.redis_url);

    let judge = Judge0Client::new(&config.sandbox_base_url, config.sandbox_timeout)?;

    let grader = Grader::new(
        Arc::new(judge),
        Arc::new(RedisContentStore::new(redis_conn.clone())),
        Arc::new(RedisSubmissionStore::new(redis_conn.clone())),
        config.case_concurrency,
    );

    // Setup graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        warn!("Received shutdown signal, draining queue...");
    };

    let mut queue_conn = redis_conn;
    tokio::select! {
        _ = worker_loop(&mut queue_conn, &grader) => {},
        _ = shutdown => {},
    }

    info!("Grader shutdown complete");
    Ok(())
}

async fn worker_loop(
    queue_conn: &mut ::redis::aio::ConnectionManager,
    grader: &Grader,
) -> anyhow::Result<()> {
    loop {
        // BLPOP with 5 second timeout for graceful shutdown
        match redis::pop_job(queue_conn, 5.0).await {
            Ok(Some(job)) => {
                info!(
                    job_id = %job.id,
                    candidate = %job.candidate_id,
                    language = %job.language,
                    source_size = job.source_code.len(),
                    "Received grading job"
                );

                let start = std::time::Instant::now();
                match grader
                    .submit(
                        job.candidate_id,
                        job.test_id,
                        job.question_id,
                        &job.language,
                        &job.source_code,
                    )
                    .await
                {
                    Ok(summary) => {
                        info!(
                            job_id = %job.id,
                            submission_id = %summary.submission_id,
                            score = summary.score,
                            passed = summary.passed_cases,
                            total = summary.total_cases,
                            elapsed_ms = start.elapsed().as_millis(),
                            "Grading completed"
                        );
                    }
                    Err(e) => {
                        // Validation and persistence failures are job-level;
                        // the worker keeps serving the queue.
                        error!(job_id = %job.id, error = %e, "Grading failed");
                    }
                }
            }
            Ok(None) => {
                // Timeout - check for shutdown
                continue;
            }
            Err(e) => {
                error!(error = %e, "Redis error");
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            }
        }
    }
}
