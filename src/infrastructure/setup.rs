//! Wires configuration into a runnable pipeline.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::analyzers::{CppAnalyzer, PythonAnalyzer};
use crate::adapters::git::GitPatcher;
use crate::adapters::model::{HttpModelClient, MockModelClient};
use crate::adapters::storage::FsJobRepository;
use crate::adapters::test_runners::{CppTestRunner, PythonTestRunner};
use crate::domain::models::Config;
use crate::domain::ports::{JobRepository, ModelClient};
use crate::infrastructure::process::CommandRunner;
use crate::services::{EvalHarness, RepairLoop, WorkspaceService};

/// Everything a command needs to run jobs.
pub struct Pipeline {
    pub config: Config,
    pub workspaces: WorkspaceService,
    pub jobs: Arc<dyn JobRepository>,
    pub repair: Arc<RepairLoop>,
}

impl Pipeline {
    /// Build the full adapter stack from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let runner = CommandRunner::new(config.repair.tool_timeout_secs);
        let jobs: Arc<dyn JobRepository> =
            Arc::new(FsJobRepository::new(&config.workspaces.root));
        let workspaces = WorkspaceService::new(&config.workspaces.root);

        let model: Arc<dyn ModelClient> = match config.model.provider.as_str() {
            "mock" => Arc::new(MockModelClient::new()),
            _ => Arc::new(
                HttpModelClient::from_config(&config.model)
                    .context("Failed to build model client")?,
            ),
        };
        info!(provider = model.name(), model = %config.model.model, "Model backend ready");

        let mut repair = RepairLoop::new(
            model,
            Arc::new(GitPatcher::new(runner.clone())),
            jobs.clone(),
        );
        repair.register_analyzer(Arc::new(PythonAnalyzer::new(
            runner.clone(),
            config.python.interpreter.clone(),
            config.repair.max_findings,
        )));
        repair.register_analyzer(Arc::new(CppAnalyzer::new(
            runner.clone(),
            config.repair.max_findings,
        )));
        repair.register_runner(Arc::new(PythonTestRunner::new(
            runner.clone(),
            config.python.clone(),
        )));
        repair.register_runner(Arc::new(CppTestRunner::new(runner, config.cpp.clone())));

        Ok(Self {
            workspaces,
            jobs,
            repair: Arc::new(repair),
            config,
        })
    }

    /// Evaluation harness sharing this pipeline's adapters.
    pub fn eval_harness(&self) -> EvalHarness {
        EvalHarness::new(
            self.repair.clone(),
            &self.config.workspaces.root,
            &self.config.workspaces.reports_dir,
        )
    }
}
