//! Risk assessment group chat
//!
//! Runs one interactive session: the risk manager kicks off the annual risk
//! assessment, the coordinator drives the specialists through the workflow, and
//! the session ends when the risk manager types TERMINATE.

use anyhow::{Context, Result};
use colored::Colorize;
use console::Term;
use group_chat::{ConsoleTranscript, StopReason};
use llm_client::LlmRouter;
use risk_workflow::{extract_final_report, AppConfig, RiskWorkflow, COORDINATOR_NAME};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the transcript on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,risk_workflow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let term = Term::stdout();
    print_banner(&term)?;

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let router = LlmRouter::new(config.llm.clone());
    info!(
        models = ?router.models(),
        cache_seed = ?config.llm.cache_seed,
        selection = config.session.speaker_selection.as_str(),
        max_round = config.session.max_round,
        "Configuration loaded"
    );

    let workflow = RiskWorkflow::builder(Arc::new(router))
        .policy(config.policy.clone())
        .speaker_selection(config.session.speaker_selection)
        .human_input_mode(config.session.human_input_mode)
        .max_round(config.session.max_round)
        .observer(Box::new(ConsoleTranscript))
        .build()
        .context("Failed to assemble the risk assessment team")?;

    let outcome = workflow.run().await.context("Risk assessment session failed")?;

    println!();
    match &outcome.reason {
        StopReason::Terminated { by } => {
            println!("{}", format!("Session ended by {}", by).bright_green().bold())
        }
        StopReason::MaxRounds => println!(
            "{}",
            format!("Session stopped after {} messages", outcome.transcript.len())
                .yellow()
                .bold()
        ),
    }

    println!();
    match extract_final_report(&outcome.transcript, COORDINATOR_NAME) {
        Some(report) => {
            println!("{}", "--- Final Generated Report ---".bright_cyan().bold());
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => println!(
            "{}",
            "--- Could not extract final report from chat history ---".yellow()
        ),
    }

    // One monitoring pass over whatever the session registered
    let monitoring = workflow.monitoring();
    if !monitoring.snapshot().monitored_risks.is_empty() {
        println!();
        println!("{}", "--- Sample monitoring cycle ---".bright_cyan().bold());
        println!("{}", serde_json::to_string_pretty(&monitoring.run_cycle())?);

        println!();
        println!("{}", "--- Periodic monitoring report ---".bright_cyan().bold());
        println!("{}", serde_json::to_string_pretty(&monitoring.report("periodic"))?);
    }

    Ok(())
}

fn print_banner(term: &Term) -> Result<()> {
    term.clear_screen()?;
    println!("{}", "╔════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║      Risk Assessment Group Chat        ║".bright_cyan());
    println!("{}", "╚════════════════════════════════════════╝".bright_cyan());
    println!();
    Ok(())
}
