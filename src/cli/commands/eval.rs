//! `fixpoint eval` - run the evaluation harness over a dataset.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::output::format_eval_table;
use crate::domain::models::Config;
use crate::infrastructure::Pipeline;
use crate::services::EvalHarness;

pub async fn execute(config: Config, dataset: PathBuf, json: bool) -> Result<()> {
    let reports_dir = config.workspaces.reports_dir.clone();
    let pipeline = Pipeline::from_config(config).context("Failed to build pipeline")?;
    let harness = pipeline.eval_harness();

    let cases = EvalHarness::load_dataset(&dataset).context("Failed to load dataset")?;
    let results = harness
        .run(&cases)
        .await
        .context("Evaluation run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("{}", format_eval_table(&results));
    let detected = results.iter().filter(|r| r.detected).count();
    let repaired = results.iter().filter(|r| r.repair_success).count();
    let errored = results.iter().filter(|r| r.error.is_some()).count();
    println!();
    println!(
        "Cases: {}  Detected: {}  Repaired: {}  Errored: {}",
        results.len(),
        detected,
        repaired,
        errored
    );
    println!(
        "Results written to {}",
        reports_dir.join("eval_results.json").display()
    );
    Ok(())
}
