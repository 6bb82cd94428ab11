//! Human Judge CLI
//!
//! A terminal front end over the evaluation session: browse scenarios, fetch
//! model responses, record judgments and print summaries.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use human_judge::{
    config::Config,
    judgment::{Dimension, JudgmentDraft},
    session::EvaluationSession,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Human Judge - score LLM responses on fixed scenarios
#[derive(Parser)]
#[command(name = "human-judge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List test cases in selection order
    Scenarios,

    /// Show one test case in full
    Show {
        /// Test case id (e.g. tc_001)
        id: String,
    },

    /// List configured models
    Models,

    /// Send a test case to a model and print its response
    Run {
        /// Test case id
        id: String,

        /// Model identifier
        #[arg(short, long)]
        model: String,

        /// Timeout in seconds (defaults to the configured timeout)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Record a judgment of a model response
    Judge(JudgeArgs),

    /// Print aggregate statistics over all judgments
    Summary {
        /// Output as JSON instead of a formatted report
        #[arg(long)]
        json: bool,
    },

    /// Test backend connection
    Test {
        /// Model to probe (defaults to the first configured model)
        #[arg(short, long)]
        model: Option<String>,
    },
}

#[derive(Args)]
struct JudgeArgs {
    /// Test case id
    id: String,

    /// Model identifier that produced the response
    #[arg(short, long)]
    model: String,

    /// Judge identifier
    #[arg(short, long)]
    judge: String,

    #[arg(long, default_value_t = 3)]
    professionalism: i32,

    #[arg(long, default_value_t = 3)]
    empathy: i32,

    #[arg(long, default_value_t = 3)]
    usefulness: i32,

    #[arg(long, default_value_t = 3)]
    safety: i32,

    #[arg(long, default_value_t = 3)]
    overall_quality: i32,

    /// Confidence in these scores
    #[arg(long, default_value_t = 3)]
    confidence: i32,

    #[arg(long, default_value = "")]
    strengths: String,

    #[arg(long, default_value = "")]
    weaknesses: String,

    #[arg(long, default_value = "")]
    suggestions: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Scenarios => cmd_scenarios(&config),
        Commands::Show { id } => cmd_show(&config, &id),
        Commands::Models => cmd_models(&config),
        Commands::Run { id, model, timeout } => cmd_run(&config, &id, &model, timeout).await,
        Commands::Judge(args) => cmd_judge(&config, args).await,
        Commands::Summary { json } => cmd_summary(&config, json).await,
        Commands::Test { model } => cmd_test(&config, model).await,
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = Config::load_with(path.map(PathBuf::as_path))
        .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn cmd_scenarios(config: &Config) -> Result<()> {
    let session = EvaluationSession::from_config(config).context("Failed to open session")?;

    println!("{:<10} {:<8} {:<14} Scenario", "ID", "Level", "Category");
    println!("{}", "─".repeat(60));
    for tc in session.list_scenarios() {
        println!(
            "{:<10} {:<8} {:<14} {}",
            tc.id, tc.difficulty, tc.category, tc.scenario
        );
    }

    Ok(())
}

fn cmd_show(config: &Config, id: &str) -> Result<()> {
    let session = EvaluationSession::from_config(config).context("Failed to open session")?;
    let tc = session.scenario(id)?;

    println!("Test Case {}", tc.id);
    println!("{}", "─".repeat(40));
    println!("  Scenario:    {}", tc.scenario);
    println!("  Category:    {}", tc.category);
    println!("  Difficulty:  {}", tc.difficulty);
    println!("\nUser input:\n  {}", tc.user_input);
    println!("\nExpected response:\n  {}", tc.expected_response);

    println!("\nScoring dimensions (1-5):");
    for dim in Dimension::ALL {
        println!("  {:<16} {}", dim.as_str(), dim.description());
    }

    Ok(())
}

fn cmd_models(config: &Config) -> Result<()> {
    let session = EvaluationSession::from_config(config).context("Failed to open session")?;
    if session.models().is_empty() {
        println!("No models configured; any model name is accepted.");
    }
    for model in session.models() {
        println!("{}", model);
    }
    Ok(())
}

async fn cmd_run(config: &Config, id: &str, model: &str, timeout: Option<u64>) -> Result<()> {
    let session = EvaluationSession::from_config(config).context("Failed to open session")?;
    let timeout = timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| session.default_timeout());

    println!("Running {} against {}...\n", id, model);

    let response = session
        .run_trial(id, model, timeout)
        .await
        .context("No response available")?;

    println!("{}", "─".repeat(60));
    println!("{}", response.response_text);
    println!("{}", "─".repeat(60));
    println!("Response time: {:.2}s", response.latency_seconds);

    Ok(())
}

async fn cmd_judge(config: &Config, args: JudgeArgs) -> Result<()> {
    let session = EvaluationSession::from_config(config).context("Failed to open session")?;
    session
        .recover()
        .await
        .context("Failed to restore previous judgments")?;

    let draft = JudgmentDraft::new(args.id, args.model, args.judge)
        .with_scores(
            args.professionalism,
            args.empathy,
            args.usefulness,
            args.safety,
            args.overall_quality,
        )
        .with_confidence(args.confidence)
        .with_comments(args.strengths, args.weaknesses, args.suggestions);

    let judgment = session
        .submit_judgment(draft)
        .await
        .context("Failed to record judgment")?;

    println!("Judgment saved (recorded at {})", judgment.timestamp);
    println!("Total judgments: {}", session.judgments().await.len());

    Ok(())
}

async fn cmd_summary(config: &Config, json: bool) -> Result<()> {
    let session = EvaluationSession::from_config(config).context("Failed to open session")?;
    session
        .recover()
        .await
        .context("Failed to restore previous judgments")?;

    let summary = session.get_summary().await;
    if json {
        let json_str =
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", json_str);
    } else {
        print!("{}", summary.format_report());
    }

    Ok(())
}

async fn cmd_test(config: &Config, model: Option<String>) -> Result<()> {
    println!("Testing backend connection...\n");

    let Some(model) = model.or_else(|| config.backend.models.first().cloned()) else {
        anyhow::bail!("No model given and none configured; pass --model");
    };

    println!("Configuration:");
    println!("  API Base:  {}", config.backend.api_base);
    println!("  Model:     {}", model);
    println!("  Timeout:   {}s", config.backend.timeout_secs);
    println!();

    let session = EvaluationSession::from_config(config).context("Failed to open session")?;

    println!("Sending test request...");
    match session.test_connection(&model).await {
        Ok(response) => {
            println!(
                "Connection successful! ({:.2}s) {}",
                response.latency_seconds, response.response_text
            );
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
