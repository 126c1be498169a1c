use std::collections::HashMap;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use gate::{
    Article, ArticleBrief, CollaboratorName, Feedback, Keyword, QualityGate, QuickCheck,
    ScoreReport, TargetWordCount, Topic,
};
use serde_json::json;
use tracing::info;
use workflow::testing::{RecordingPublisher, StaticResearch};
use workflow::{run_batch, ArticleWorkflow, BatchSummary, CancellationFlag, Settings, WorkflowOutcome};

use crate::cli::{Cli, Commands, DryRunArgs, ScoreArgs};
use crate::drafts::DraftGenerator;

/// Exit code for an article that failed the gate or went to review.
const EXIT_NOT_PUBLISHABLE: u8 = 1;

pub async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::from_lookup_with_rubric(
        |key| std::env::var(key).ok(),
        cli.rubric.as_deref(),
    )?;

    match cli.command {
        Commands::Score(args) => score(&settings, &args, cli.json),
        Commands::Rubric => {
            println!("{}", serde_json::to_string_pretty(&settings.rubric)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::DryRun(args) => dry_run(settings, &args, cli.json).await,
    }
}

fn score(settings: &Settings, args: &ScoreArgs, json: bool) -> Result<ExitCode> {
    let markdown = read_draft(&args.file)?;
    let target = target_word_count(args.target_words)?;
    let article = Article::from_markdown(markdown, target).with_main_keyword(keyword(&args.keyword)?);

    let gate = QualityGate::new(settings.rubric.clone())?;
    if args.quick {
        return quick_check(&gate, &article, json);
    }

    let report = gate.evaluate(&article)?;
    let feedback = Feedback::from_report(&report, 1);

    if json {
        let body = json!({ "report": &report, "feedback": &feedback });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_report(&report);
        if !feedback.is_empty() {
            println!();
            println!("{}", feedback.summary());
        }
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_PUBLISHABLE)
    })
}

fn quick_check(gate: &QualityGate, article: &Article, json: bool) -> Result<ExitCode> {
    let check = gate.quick_check(article)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&check)?);
    } else {
        print_quick_check(&check);
    }

    Ok(if check.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_PUBLISHABLE)
    })
}

async fn dry_run(settings: Settings, args: &DryRunArgs, json: bool) -> Result<ExitCode> {
    let target = target_word_count(args.target_words)?;
    let keyword = keyword(&args.keyword)?;

    let mut drafts = HashMap::new();
    let mut briefs = Vec::new();
    for path in &args.files {
        let topic = path
            .file_stem()
            .and_then(|stem| Topic::new(stem.to_string_lossy()))
            .ok_or_else(|| anyhow!("cannot derive a topic from {}", path.display()))?;
        drafts.insert(topic.clone(), read_draft(path)?);

        let mut brief = ArticleBrief::new(topic, target);
        if let Some(keyword) = &keyword {
            brief = brief.with_main_keyword(keyword.clone());
        }
        briefs.push(brief);
    }

    let generator = DraftGenerator::new(collaborator("drafts")?, drafts);
    let publisher = Arc::new(RecordingPublisher::new(collaborator("dry-run-publisher")?));
    let workflow = ArticleWorkflow::new(
        Arc::new(StaticResearch::sample()),
        Arc::new(generator),
        publisher,
        QualityGate::new(settings.rubric)?,
        settings.retry,
    )?;

    let max_concurrent = args.max_concurrent.unwrap_or(settings.batch_max_concurrent);
    info!(drafts = briefs.len(), max_concurrent, "Starting dry run");
    let summary = run_batch(
        Arc::new(workflow),
        briefs,
        max_concurrent,
        &CancellationFlag::new(),
    )
    .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&summary))?);
    } else {
        print_summary(&summary);
    }

    Ok(if summary.succeeded() == summary.total() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_PUBLISHABLE)
    })
}

fn read_draft(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn target_word_count(words: u32) -> Result<TargetWordCount> {
    TargetWordCount::new(words).ok_or_else(|| anyhow!("--target-words must be at least 1"))
}

fn keyword(raw: &Option<String>) -> Result<Option<Keyword>> {
    raw.as_deref()
        .map(|k| Keyword::new(k).ok_or_else(|| anyhow!("--keyword must not be blank")))
        .transpose()
}

fn collaborator(name: &str) -> Result<CollaboratorName> {
    CollaboratorName::new(name).ok_or_else(|| anyhow!("blank collaborator name"))
}

fn print_report(report: &ScoreReport) {
    let verdict = if report.passed() { "PASS" } else { "FAIL" };
    println!(
        "{verdict}: {}/{} (threshold {}), {} words",
        report.total(),
        report.scores().iter().map(|s| s.ceiling).sum::<u32>(),
        report.threshold(),
        report.word_count().actual,
    );
    println!("  deviation        {:+.1}%", report.word_count().ratio().deviation_percent());
    for score in report.scores().iter() {
        println!("  {:<16} {:>3}/{}", score.category.label(), score.points, score.ceiling);
    }
}

fn print_quick_check(check: &QuickCheck) {
    let verdict = if check.passed() { "PASS" } else { "FAIL" };
    println!(
        "{verdict}: quick score {}/100, {} of {} words ({:+.1}%), {} sections, {} paragraphs",
        check.score,
        check.word_count,
        check.target,
        check.deviation_percent,
        check.h2_count,
        check.paragraph_count,
    );
    for issue in &check.issues {
        println!("  issue:   {issue}");
    }
    for warning in &check.warnings {
        println!("  warning: {warning}");
    }
}

fn outcome_json(outcome: &WorkflowOutcome) -> serde_json::Value {
    match outcome {
        WorkflowOutcome::Published {
            run_id,
            receipt,
            report,
            attempts,
            ..
        } => json!({
            "status": "published",
            "run_id": run_id.to_string(),
            "document_id": receipt.document_id.as_str(),
            "location": receipt.location,
            "attempts": attempts,
            "total": report.total(),
        }),
        WorkflowOutcome::NeedsHumanReview {
            run_id,
            receipt,
            exhaustion,
            trend,
        } => json!({
            "status": "needs_review",
            "run_id": run_id.to_string(),
            "document_id": receipt.document_id.as_str(),
            "location": receipt.location,
            "attempts": exhaustion.attempts,
            "total": exhaustion.last_report.total(),
            "issues": exhaustion.feedback.issues,
            "recommendation": trend.as_ref().map(|t| t.recommendation.as_str()),
        }),
    }
}

fn summary_json(summary: &BatchSummary) -> serde_json::Value {
    let entries: Vec<_> = summary
        .entries
        .iter()
        .map(|entry| match &entry.result {
            Ok(outcome) => {
                let mut value = outcome_json(outcome);
                value["topic"] = json!(entry.topic.as_str());
                value
            }
            Err(err) => json!({
                "topic": entry.topic.as_str(),
                "status": "failed",
                "error": err.to_string(),
            }),
        })
        .collect();
    json!({
        "total": summary.total(),
        "succeeded": summary.succeeded(),
        "needs_review": summary.needs_review(),
        "failed": summary.failed(),
        "success_rate": summary.success_rate(),
        "entries": entries,
    })
}

fn print_summary(summary: &BatchSummary) {
    for entry in &summary.entries {
        match &entry.result {
            Ok(WorkflowOutcome::Published {
                receipt,
                report,
                attempts,
                ..
            }) => println!(
                "{}: published as {} after {attempts} attempt(s), score {}",
                entry.topic,
                receipt.document_id,
                report.total()
            ),
            Ok(WorkflowOutcome::NeedsHumanReview {
                exhaustion, trend, ..
            }) => {
                println!(
                    "{}: needs review after {} attempts, last score {}",
                    entry.topic,
                    exhaustion.attempts,
                    exhaustion.last_report.total()
                );
                for issue in &exhaustion.feedback.issues {
                    println!("  - {issue}");
                }
                if let Some(trend) = trend {
                    println!("  {}", trend.recommendation);
                }
            }
            Err(err) => println!("{}: failed: {err}", entry.topic),
        }
    }
    println!(
        "{} of {} published, {} need review, {} failed ({:.0}%)",
        summary.succeeded(),
        summary.total(),
        summary.needs_review(),
        summary.failed(),
        summary.success_rate() * 100.0
    );
}
