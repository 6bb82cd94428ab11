//! Evaluation session: the single façade UIs and CLIs talk to.
//!
//! A session owns its catalog, client and judgment store; independent
//! sessions never share state.

use crate::catalog::{ScenarioCatalog, TestCase};
use crate::config::Config;
use crate::error::{EvalError, Result};
use crate::judgment::{HumanJudgment, JudgmentDraft};
use crate::llm::{ModelClient, ModelResponse};
use crate::stats::{Summary, summarize};
use crate::store::JudgmentStore;
use chrono::{Local, SecondsFormat};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Orchestrates scenario lookup, model calls, judgment capture and summaries.
#[derive(Debug)]
pub struct EvaluationSession {
    catalog: ScenarioCatalog,
    client: ModelClient,
    store: JudgmentStore,
    /// Valid model identifiers; empty accepts any model.
    models: Vec<String>,
    /// Keeps append-then-persist pairs from interleaving.
    submit_lock: Mutex<()>,
}

impl EvaluationSession {
    /// Build a session from configuration, loading the scenario file if set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = match &config.scenarios.path {
            Some(path) => ScenarioCatalog::from_file(path)?,
            None => ScenarioCatalog::builtin(),
        };
        Ok(Self::new(
            catalog,
            ModelClient::new(config.backend.clone()),
            JudgmentStore::new(config.store.output_dir.clone()),
        ))
    }

    /// Assemble a session from its parts; valid models come from the client config.
    pub fn new(catalog: ScenarioCatalog, client: ModelClient, store: JudgmentStore) -> Self {
        let models = client.config().models.clone();
        Self {
            catalog,
            client,
            store,
            models,
            submit_lock: Mutex::new(()),
        }
    }

    /// Restore the judgment log from the latest snapshot.
    ///
    /// A missing snapshot is a fresh start, not an error; returns how many
    /// judgments were restored.
    pub async fn recover(&self) -> Result<usize> {
        match self.store.reload().await {
            Ok(judgments) => Ok(judgments.len()),
            Err(EvalError::SnapshotNotFound(dir)) => {
                warn!(dir = %dir.display(), "no judgment snapshot found, starting empty");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Test cases in declaration order.
    pub fn list_scenarios(&self) -> &[TestCase] {
        self.catalog.load()
    }

    pub fn scenario(&self, test_case_id: &str) -> Result<&TestCase> {
        self.catalog.get(test_case_id)
    }

    /// Configured model identifiers.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Default timeout from configuration.
    pub fn default_timeout(&self) -> Duration {
        self.client.config().timeout()
    }

    fn check_model(&self, model_name: &str) -> Result<()> {
        if model_name.trim().is_empty() {
            return Err(EvalError::validation("model_name", "must not be empty"));
        }
        if !self.models.is_empty() && !self.models.iter().any(|m| m == model_name) {
            return Err(EvalError::validation(
                "model_name",
                format!("'{}' is not a configured model", model_name),
            ));
        }
        Ok(())
    }

    /// Send a test case's prompt to a model and return its response untouched.
    ///
    /// Unknown test cases and models fail before any request is made.
    pub async fn run_trial(
        &self,
        test_case_id: &str,
        model_name: &str,
        timeout: Duration,
    ) -> Result<ModelResponse> {
        let case = self.catalog.get(test_case_id)?;
        self.check_model(model_name)?;

        info!(test_case = test_case_id, model = model_name, "running trial");
        self.client
            .complete(model_name, &case.user_input, timeout)
            .await
    }

    /// Probe the backend with a trivial prompt for `model_name`.
    pub async fn test_connection(&self, model_name: &str) -> Result<ModelResponse> {
        self.check_model(model_name)?;
        self.client.test_connection(model_name).await
    }

    /// Record a judgment and immediately persist the full log.
    ///
    /// If persisting fails the judgment is still held in memory and the
    /// persistence error is returned, so the caller knows saving is behind.
    pub async fn submit_judgment(&self, draft: JudgmentDraft) -> Result<HumanJudgment> {
        draft.check_required()?;
        if !self.catalog.contains(&draft.test_case_id) {
            return Err(EvalError::NotFound(draft.test_case_id));
        }

        let judgment =
            draft.into_judgment(Local::now().to_rfc3339_opts(SecondsFormat::Micros, false));

        let _guard = self.submit_lock.lock().await;
        self.store.append(judgment.clone()).await?;
        info!(
            test_case = %judgment.test_case_id,
            model = %judgment.model_name,
            judge = %judgment.judge_id,
            overall_quality = judgment.overall_quality,
            "judgment recorded"
        );
        self.store.persist().await?;

        Ok(judgment)
    }

    /// All recorded judgments in submission order.
    pub async fn judgments(&self) -> Vec<HumanJudgment> {
        self.store.all().await
    }

    /// Statistics over every recorded judgment.
    pub async fn get_summary(&self) -> Summary {
        summarize(&self.store.all().await)
    }
}
