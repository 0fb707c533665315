// ==============================================================================
// main.rs - Health Recommender Entry Point
// ==============================================================================
// Description: CLI for single-document and JSON Lines batch recommendation runs
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Semaphore;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use health_recommender::audit::{self, AuditEventType};
use health_recommender::report::{build_report, BatchEntry};
use health_recommender::{EngineConfig, EngineError, MarkerKnowledgeBase, OutputFormat, RecommendationEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input JSON document (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// CSV file of additional genetic markers
    #[arg(long, env = "HEALTH_RECOMMENDER_MARKERS")]
    markers: Option<PathBuf>,

    /// Treat input as JSON Lines, one person per line
    #[arg(long)]
    batch: bool,

    /// Request ID for single-document runs (generated when omitted)
    #[arg(long)]
    request_id: Option<Uuid>,

    /// Maximum number of genes accepted per input
    #[arg(long, env = "HEALTH_RECOMMENDER_MAX_GENETIC_ENTRIES")]
    max_genetic_entries: Option<usize>,

    /// Drop repeated recommendation text within a category
    #[arg(long, env = "HEALTH_RECOMMENDER_DEDUPLICATE")]
    deduplicate: bool,

    /// Maximum batch lines evaluated at once (defaults to available cores)
    #[arg(long, env = "HEALTH_RECOMMENDER_BATCH_JOBS", value_parser = clap::value_parser!(u16).range(1..))]
    jobs: Option<u16>,

    /// Log output format (logs are written to stderr)
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let json_logs = args.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "health_recommender=info,audit=info".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    info!("Health Recommender starting...");

    let engine = Arc::new(build_engine(&args)?);

    let text = read_input(args.input.as_ref()).await?;

    let rendered = if args.batch {
        let jobs = args
            .jobs
            .map(usize::from)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1);
        run_batch(engine, &text, jobs).await?
    } else {
        run_single(&engine, &text, args.request_id, args.format)?
    };

    write_output(args.output.as_ref(), &rendered).await?;

    Ok(())
}

fn build_engine(args: &Args) -> Result<RecommendationEngine> {
    let knowledge_base = match &args.markers {
        Some(path) => Arc::new(
            MarkerKnowledgeBase::with_extensions(path)
                .with_context(|| format!("Failed to load marker file {}", path.display()))?,
        ),
        None => MarkerKnowledgeBase::builtin(),
    };

    audit::log_event(
        AuditEventType::KnowledgeBaseLoaded,
        None,
        serde_json::json!({
            "markers": knowledge_base.len(),
            "extensions": args.markers.as_ref().map(|p| p.display().to_string()),
        }),
    );

    let mut config = EngineConfig {
        deduplicate: args.deduplicate,
        ..Default::default()
    };
    if let Some(max) = args.max_genetic_entries {
        config.max_genetic_entries = max;
    }

    Ok(RecommendationEngine::new()
        .with_knowledge_base(knowledge_base)
        .with_config(config))
}

async fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read input from stdin")?;
            Ok(text)
        }
    }
}

async fn write_output(path: Option<&PathBuf>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => tokio::fs::write(path, rendered)
            .await
            .with_context(|| format!("Failed to write output {}", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(rendered.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}

fn run_single(
    engine: &RecommendationEngine,
    text: &str,
    request_id: Option<Uuid>,
    format: OutputFormat,
) -> Result<String> {
    let request_id = request_id.unwrap_or_else(Uuid::new_v4);
    let value: serde_json::Value = serde_json::from_str(text).context("Input is not valid JSON")?;

    audit::log_event(AuditEventType::AnalysisStarted, Some(request_id), serde_json::json!({}));

    let report = match build_report(engine, request_id, &value) {
        Ok(report) => report,
        Err(EngineError::Validation(e)) => {
            // Field path only; the offending value stays out of the trail
            audit::log_event(
                AuditEventType::InputRejected,
                Some(request_id),
                serde_json::json!({ "field": e.field() }),
            );
            return Err(e).context("Input rejected");
        }
        Err(e) => return Err(e.into()),
    };

    audit::log_event(
        AuditEventType::AnalysisCompleted,
        Some(request_id),
        serde_json::json!({
            "recommendations": report.recommendations.len(),
            "genetic_findings": report.genetic_findings.len(),
            "input_sha256": report.metadata.input_sha256,
        }),
    );

    report.render(format).context("Failed to render report")
}

/// Evaluate JSON Lines with at most `jobs` lines in flight; output lines
/// follow input order
async fn run_batch(engine: Arc<RecommendationEngine>, text: &str, jobs: usize) -> Result<String> {
    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;
        let line = line.to_string();
        let engine = Arc::clone(&engine);
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .context("Batch semaphore closed")?;

        tasks.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            evaluate_line(&engine, line_no, &line)
        }));
    }

    let mut output = Vec::with_capacity(tasks.len());
    let mut rejected = 0usize;

    for task in tasks {
        let entry = task.await.context("Batch worker panicked")?;
        if entry.error.is_some() {
            rejected += 1;
        }
        output.push(serde_json::to_string(&entry).context("Failed to serialize batch entry")?);
    }

    audit::log_event(
        AuditEventType::BatchCompleted,
        None,
        serde_json::json!({
            "lines": output.len(),
            "rejected": rejected,
        }),
    );

    Ok(output.join("\n"))
}

fn evaluate_line(engine: &RecommendationEngine, line_no: usize, line: &str) -> BatchEntry {
    let request_id = Uuid::new_v4();

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!("Batch line {} is not valid JSON: {}", line_no, e);
            return BatchEntry::failure(line_no, "", format!("Invalid JSON: {}", e));
        }
    };

    let entry = BatchEntry::from_result(line_no, build_report(engine, request_id, &value));
    if let Some(error) = &entry.error {
        audit::log_event(
            AuditEventType::InputRejected,
            Some(request_id),
            serde_json::json!({ "line": line_no, "field": error.field }),
        );
    }

    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_keeps_input_order_and_isolates_errors() {
        let engine = Arc::new(RecommendationEngine::new());
        let text = concat!(
            r#"{"lifestyle_data": {"smoking": true}}"#, "\n",
            "\n",
            r#"{"lifestyle_data": {"exercise": "lots"}}"#, "\n",
            "not json\n",
            r#"{"genetic_data": {"BRCA1": {"variant": "pathogenic"}}}"#, "\n",
        );

        let rendered = run_batch(engine, text, 2).await.unwrap();
        let lines: Vec<serde_json::Value> = rendered
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["line"], 1);
        assert_eq!(lines[0]["report"]["recommendations"]["lifestyle"].as_array().unwrap().len(), 1);
        assert_eq!(lines[1]["line"], 3);
        assert_eq!(lines[1]["error"]["field"], "lifestyle_data.exercise");
        assert_eq!(lines[2]["line"], 4);
        assert!(lines[2]["error"]["message"].as_str().unwrap().starts_with("Invalid JSON"));
        assert_eq!(lines[3]["line"], 5);
        assert_eq!(lines[3]["report"]["overall_genetic_risk"], "very_high");
    }

    #[tokio::test]
    async fn test_batch_single_job_matches_parallel() {
        let engine = Arc::new(RecommendationEngine::new());
        let text: String = (0..20)
            .map(|i| format!("{{\"lifestyle_data\": {{\"exercise\": {}}}}}\n", i * 10))
            .collect();

        let serial = run_batch(Arc::clone(&engine), &text, 1).await.unwrap();
        let parallel = run_batch(engine, &text, 8).await.unwrap();

        let lifestyle = |rendered: &str| -> Vec<(u64, usize)> {
            rendered
                .lines()
                .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
                .map(|v| {
                    (
                        v["line"].as_u64().unwrap(),
                        v["report"]["recommendations"]["lifestyle"].as_array().unwrap().len(),
                    )
                })
                .collect()
        };
        assert_eq!(lifestyle(&serial), lifestyle(&parallel));
        assert_eq!(lifestyle(&serial).len(), 20);
        assert_eq!(lifestyle(&serial)[0], (1, 1));
        assert_eq!(lifestyle(&serial)[19], (20, 0));
    }

    #[test]
    fn test_single_uses_given_request_id() {
        let engine = RecommendationEngine::new();
        let request_id = Uuid::new_v4();

        let rendered = run_single(&engine, "{}", Some(request_id), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["request_id"], request_id.to_string());
        assert_eq!(value["recommendations"]["critical"], serde_json::json!([]));
    }

    #[test]
    fn test_single_rejects_invalid_input() {
        let engine = RecommendationEngine::new();
        assert!(run_single(&engine, "[1, 2]", None, OutputFormat::Text).is_err());
        assert!(run_single(&engine, "{", None, OutputFormat::Text).is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "health-recommender",
            "--batch",
            "--format",
            "text",
            "--max-genetic-entries",
            "10",
            "--log-format",
            "json",
            "--jobs",
            "4",
        ]);
        assert!(args.batch);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.max_genetic_entries, Some(10));
        assert_eq!(args.log_format, LogFormat::Json);
        assert_eq!(args.jobs, Some(4));
        assert!(Args::try_parse_from(["health-recommender", "--jobs", "0"]).is_err());
    }
}
