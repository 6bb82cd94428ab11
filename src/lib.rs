//! Human Judge - a human-in-the-loop evaluation harness for language models.
//!
//! The harness presents fixed scenario prompts to several candidate models,
//! collects each response under a bounded-latency call, and records
//! structured multi-dimensional human judgments of those responses.
//!
//! # Overview
//!
//! 1. Pick a test case from the [`ScenarioCatalog`]
//! 2. Ask a model for a response via [`ModelClient`] (timeout-bound, no retries)
//! 3. A human judge scores the response on five 1-5 dimensions
//! 4. The [`JudgmentStore`] appends the judgment and writes a new JSON snapshot
//! 5. [`summarize`] reduces the log to per-dimension, per-model statistics
//!
//! # Quick Start
//!
//! ```no_run
//! use human_judge::{
//!     config::Config,
//!     judgment::JudgmentDraft,
//!     session::EvaluationSession,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let session = EvaluationSession::from_config(&config)?;
//!     session.recover().await?;
//!
//!     let response = session
//!         .run_trial("tc_001", "qwen2.5-7b-sft", session.default_timeout())
//!         .await?;
//!     println!("{}", response.response_text);
//!
//!     let draft = JudgmentDraft::new("tc_001", "qwen2.5-7b-sft", "judge-7")
//!         .with_scores(4, 5, 4, 5, 4)
//!         .with_confidence(4);
//!     session.submit_judgment(draft).await?;
//!
//!     print!("{}", session.get_summary().await.format_report());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **ScenarioCatalog**: Immutable, ordered registry of test cases
//! - **ModelClient**: OpenAI-compatible completion client with typed failures
//! - **JudgmentStore**: Validated append-only log with timestamped snapshots
//! - **stats**: Pure mean / sample-stddev aggregation
//! - **EvaluationSession**: The façade every UI or CLI goes through

pub mod catalog;
pub mod config;
pub mod error;
pub mod judgment;
pub mod llm;
pub mod persistence;
pub mod session;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use catalog::{Difficulty, ScenarioCatalog, TestCase};
pub use config::Config;
pub use error::{ErrorKind, EvalError, Result};
pub use judgment::{Dimension, HumanJudgment, JudgmentDraft};
pub use llm::{ModelClient, ModelResponse};
pub use session::EvaluationSession;
pub use stats::{Stat, Summary, summarize};
pub use store::JudgmentStore;
